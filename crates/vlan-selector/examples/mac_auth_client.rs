use radius_proto::{
    Attribute, AttributeType, Code, Packet, auth::generate_request_authenticator,
    auth::verify_response_authenticator,
};
use std::net::UdpSocket;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <mac> <secret> [server_addr]", args[0]);
        eprintln!("Example: {} AA:BB:CC:DD:EE:FF testing123 127.0.0.1:1812", args[0]);
        std::process::exit(1);
    }

    let mac = &args[1];
    let secret = args[2].as_bytes();
    let server_addr = args.get(3).map(|s| s.as_str()).unwrap_or("127.0.0.1:1812");

    println!("MAC Authentication Test");
    println!("=======================");
    println!("Server: {}", server_addr);
    println!("MAC: {}", mac);
    println!();

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(server_addr)?;

    let request_auth = generate_request_authenticator();
    let mut packet = Packet::new(Code::AccessRequest, 1, request_auth);

    // Access points doing MAB send the MAC in both attributes
    packet.add_attribute(Attribute::string(AttributeType::UserName as u8, mac.as_str())?);
    packet.add_attribute(Attribute::string(
        AttributeType::CallingStationId as u8,
        mac.as_str(),
    )?);
    packet.add_attribute(Attribute::ipv4(AttributeType::NasIpAddress as u8, [127, 0, 0, 1])?);

    let request_data = packet.encode()?;
    println!("Sending Access-Request ({} bytes)...", request_data.len());
    socket.send(&request_data)?;

    let mut buffer = vec![0u8; Packet::MAX_PACKET_SIZE];
    socket.set_read_timeout(Some(std::time::Duration::from_secs(5)))?;

    let len = match socket.recv(&mut buffer) {
        Ok(len) => len,
        Err(e) => {
            eprintln!("\n✗ No response from server: {}", e);
            eprintln!("  Make sure the server is running on {}", server_addr);
            return Err(e.into());
        }
    };

    let response = Packet::decode(&buffer[..len])?;
    if !verify_response_authenticator(&response, &request_auth, secret) {
        println!("\n⚠️  Response Authenticator does not match, check the shared secret");
    }

    match response.code {
        Code::AccessAccept => {
            println!("\n✓ Device ACCEPTED");
            for attr in &response.attributes {
                match attr.known_type() {
                    Some(AttributeType::TunnelPrivateGroupId) => {
                        let (tag, vlan) = attr.as_tagged_string()?;
                        println!("  Tunnel-Private-Group-Id:{} = {}", tag, vlan);
                    }
                    Some(t @ (AttributeType::TunnelType | AttributeType::TunnelMediumType)) => {
                        let (tag, value) = attr.as_tagged_integer()?;
                        println!("  {}:{} = {}", t.name(), tag, value);
                    }
                    _ => {}
                }
            }
        }
        Code::AccessReject => println!("\n✗ Device REJECTED"),
        other => println!("\n? Unexpected response: {}", other),
    }

    println!("\nResponse Details:");
    println!("  Identifier: {}", response.identifier);
    println!("  Attributes: {}", response.attributes.len());

    Ok(())
}
