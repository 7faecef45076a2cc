use crate::packet::{Packet, PacketError};
use rand::Rng;

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut authenticator = [0u8; 16];
    rand::rng().fill(&mut authenticator);
    authenticator
}

/// Calculate Response Authenticator per RFC 2865 Section 3
///
/// Response Authenticator = MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
///
/// Used for Access-Accept, Access-Reject and Access-Challenge packets.
pub fn calculate_response_authenticator(
    packet: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let length = packet.length();
    let mut data = Vec::with_capacity(length + secret.len());

    data.push(packet.code.as_u8());
    data.push(packet.identifier);
    data.extend_from_slice(&(length as u16).to_be_bytes());
    data.extend_from_slice(request_authenticator);
    for attr in &packet.attributes {
        data.extend_from_slice(&attr.encode()?);
    }
    data.extend_from_slice(secret);

    Ok(md5::compute(&data).0)
}

/// Sign a response in place with its Response Authenticator
pub fn sign_response(
    response: &mut Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<(), PacketError> {
    response.authenticator =
        calculate_response_authenticator(response, request_authenticator, secret)?;
    Ok(())
}

/// Verify Response Authenticator
///
/// Verifies that the Response Authenticator matches the expected value
/// calculated from the request and secret.
pub fn verify_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    calculate_response_authenticator(response, request_authenticator, secret)
        .map(|calculated| calculated == response.authenticator)
        .unwrap_or(false)
}
