//! Integration tests for the VLAN Selector server
//!
//! These tests run a real server on 127.0.0.1 and verify:
//! - Accept with VLAN assignment and the tunnel attribute triple
//! - Default VLAN fallback
//! - Reject when no MAC is found or no VLAN applies
//! - Mapping reload while the server runs
//! - Client validation and per-client secrets
//! - Audit logging

use radius_proto::auth::{generate_request_authenticator, verify_response_authenticator};
use radius_proto::{Attribute, AttributeType, Code, Packet};
use std::io::{Seek, SeekFrom, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use vlan_selector::{
    AuditEntry, AuditEventType, Config, ConfigStore, FileMappingSource, RadiusServer,
    ReloadHandle, ServerConfig,
};

const SECRET: &[u8] = b"testing123";

fn write_config(file: &mut NamedTempFile, body: &str) {
    let f = file.as_file_mut();
    f.set_len(0).expect("Failed to truncate config");
    f.seek(SeekFrom::Start(0)).expect("Failed to rewind config");
    write!(
        f,
        "radius:\n  listen_address: 127.0.0.1\n  port: 1812\n  secret: testing123\n{}",
        body
    )
    .expect("Failed to write config");
    f.flush().expect("Failed to flush config");
}

/// Start a server for the given config body, returning its address
async fn start_server(config_file: &NamedTempFile) -> (SocketAddr, ReloadHandle) {
    let mut config = Config::from_file(config_file.path()).expect("Failed to load config");
    config.radius.port = 0; // Let OS assign port

    let store = Arc::new(
        ConfigStore::new(FileMappingSource::new(config_file.path()))
            .expect("Failed to load mapping"),
    );
    let server_config =
        ServerConfig::new(config, store).expect("Failed to create server config");
    let server = RadiusServer::new(server_config)
        .await
        .expect("Failed to create server");

    let addr = server.local_addr().expect("Failed to get server address");
    let reload = server.reload_handle();

    tokio::spawn(async move {
        server.run().await.expect("Server failed");
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, reload)
}

fn mac_request(attrs: &[(AttributeType, &str)], identifier: u8) -> Packet {
    let mut packet = Packet::new(Code::AccessRequest, identifier, generate_request_authenticator());
    for (attr_type, value) in attrs {
        packet.add_attribute(
            Attribute::string(attr_type.as_u8(), *value).expect("Failed to create attribute"),
        );
    }
    packet
}

async fn send_radius_request(
    packet: &Packet,
    server_addr: SocketAddr,
) -> Result<Packet, Box<dyn std::error::Error + Send + Sync>> {
    use tokio::net::UdpSocket;
    use tokio::time::timeout;

    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    socket.send_to(&packet.encode()?, server_addr).await?;

    let mut buf = [0u8; 4096];
    let (len, _) = timeout(Duration::from_secs(5), socket.recv_from(&mut buf)).await??;

    Ok(Packet::decode(&buf[..len])?)
}

fn tunnel_triple(response: &Packet) -> Vec<(u8, u8, String)> {
    response
        .attributes
        .iter()
        .map(|attr| match attr.attr_type {
            81 => {
                let (tag, value) = attr.as_tagged_string().expect("Bad Tunnel-Private-Group-Id");
                (attr.attr_type, tag, value)
            }
            _ => {
                let (tag, value) = attr.as_tagged_integer().expect("Bad tunnel integer");
                (attr.attr_type, tag, value.to_string())
            }
        })
        .collect()
}

const MAPPING_WITH_DEFAULT: &str = r#"mapping:
  1:
    - "aa:bb:cc:dd:ee:ff"
  default: 99
"#;

#[tokio::test]
async fn test_mapped_mac_is_accepted_into_its_vlan() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, MAPPING_WITH_DEFAULT);
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::CallingStationId, "AA:BB:CC:DD:EE:FF")], 1);
    let response = send_radius_request(&request, addr)
        .await
        .expect("Failed to get response");

    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(response.identifier, 1);
    assert!(verify_response_authenticator(
        &response,
        &request.authenticator,
        SECRET
    ));
    assert_eq!(
        tunnel_triple(&response),
        vec![
            (81, 0, "1".to_string()),
            (64, 0, "13".to_string()),
            (65, 0, "6".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unmapped_mac_gets_default_vlan() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, MAPPING_WITH_DEFAULT);
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::CallingStationId, "11:22:33:44:55:66")], 2);
    let response = send_radius_request(&request, addr).await.unwrap();

    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(tunnel_triple(&response)[0], (81, 0, "99".to_string()));
}

#[tokio::test]
async fn test_unmapped_mac_without_default_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, "mapping:\n  1: [\"aa:bb:cc:dd:ee:ff\"]\n");
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::CallingStationId, "11:22:33:44:55:66")], 3);
    let response = send_radius_request(&request, addr).await.unwrap();

    assert_eq!(response.code, Code::AccessReject);
    assert!(response.attributes.is_empty());
    assert!(verify_response_authenticator(
        &response,
        &request.authenticator,
        SECRET
    ));
}

#[tokio::test]
async fn test_request_without_mac_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, MAPPING_WITH_DEFAULT);
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::UserName, "bob")], 4);
    let response = send_radius_request(&request, addr).await.unwrap();
    assert_eq!(response.code, Code::AccessReject);

    let request = mac_request(&[], 5);
    let response = send_radius_request(&request, addr).await.unwrap();
    assert_eq!(response.code, Code::AccessReject);
}

#[tokio::test]
async fn test_user_name_fallback_and_calling_station_precedence() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(
        &mut file,
        "mapping:\n  10: [\"aa:bb:cc:dd:ee:ff\"]\n  20: [\"11:22:33:44:55:66\"]\n",
    );
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::UserName, "112233445566")], 6);
    let response = send_radius_request(&request, addr).await.unwrap();
    assert_eq!(tunnel_triple(&response)[0], (81, 0, "20".to_string()));

    let request = mac_request(
        &[
            (AttributeType::UserName, "11-22-33-44-55-66"),
            (AttributeType::CallingStationId, "aabbccddeeff"),
        ],
        7,
    );
    let response = send_radius_request(&request, addr).await.unwrap();
    assert_eq!(tunnel_triple(&response)[0], (81, 0, "10".to_string()));
}

#[tokio::test]
async fn test_proxy_state_is_echoed() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, MAPPING_WITH_DEFAULT);
    let (addr, _) = start_server(&file).await;

    let mut request = mac_request(&[(AttributeType::CallingStationId, "aabbccddeeff")], 8);
    request.add_attribute(Attribute::new(AttributeType::ProxyState.as_u8(), vec![9, 9]).unwrap());
    let response = send_radius_request(&request, addr).await.unwrap();

    let proxy_state = response.attributes_of(AttributeType::ProxyState);
    assert_eq!(proxy_state.len(), 1);
    assert_eq!(proxy_state[0].value, vec![9, 9]);
}

#[tokio::test]
async fn test_reload_changes_assignment() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, "mapping:\n  10: [\"aa:bb:cc:dd:ee:ff\"]\n");
    let (addr, reload) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::CallingStationId, "aabbccddeeff")], 9);
    let response = send_radius_request(&request, addr).await.unwrap();
    assert_eq!(tunnel_triple(&response)[0], (81, 0, "10".to_string()));

    write_config(&mut file, "mapping:\n  30: [\"aa-bb-cc-dd-ee-ff\"]\n  junk: 1\n");
    let report = reload.reload().await.expect("Reload failed");
    assert_eq!(report.skipped_vlan_keys, 1);

    let request = mac_request(&[(AttributeType::CallingStationId, "aabbccddeeff")], 10);
    let response = send_radius_request(&request, addr).await.unwrap();
    assert_eq!(tunnel_triple(&response)[0], (81, 0, "30".to_string()));
}

#[tokio::test]
async fn test_failed_reload_keeps_serving_old_mapping() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, "mapping:\n  10: [\"aa:bb:cc:dd:ee:ff\"]\n");
    let (addr, reload) = start_server(&file).await;

    write_config(&mut file, "log_level: info\n");
    assert!(reload.reload().await.is_err());

    let request = mac_request(&[(AttributeType::CallingStationId, "aabbccddeeff")], 11);
    let response = send_radius_request(&request, addr).await.unwrap();
    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(tunnel_triple(&response)[0], (81, 0, "10".to_string()));
}

#[tokio::test]
async fn test_client_ip_validation() {
    let mut file = NamedTempFile::new().unwrap();
    let mut body = String::from("clients:\n  - address: 10.0.0.0/8\n    secret: other\n");
    body.push_str(MAPPING_WITH_DEFAULT);
    write_config(&mut file, &body);
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::CallingStationId, "aabbccddeeff")], 12);
    let result = tokio::time::timeout(
        Duration::from_millis(500),
        send_radius_request(&request, addr),
    )
    .await;

    // Requests from 127.0.0.1 are dropped without an answer
    assert!(result.is_err() || result.unwrap().is_err());
}

#[tokio::test]
async fn test_per_client_secret_signs_response() {
    let mut file = NamedTempFile::new().unwrap();
    let mut body = String::from("clients:\n  - address: 127.0.0.1\n    secret: ap_secret\n    name: Lab AP\n");
    body.push_str(MAPPING_WITH_DEFAULT);
    write_config(&mut file, &body);
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::CallingStationId, "aabbccddeeff")], 13);
    let response = send_radius_request(&request, addr).await.unwrap();

    assert_eq!(response.code, Code::AccessAccept);
    assert!(verify_response_authenticator(
        &response,
        &request.authenticator,
        b"ap_secret"
    ));
    assert!(!verify_response_authenticator(
        &response,
        &request.authenticator,
        SECRET
    ));
}

#[tokio::test]
async fn test_accounting_requests_are_ignored() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(&mut file, MAPPING_WITH_DEFAULT);
    let (addr, _) = start_server(&file).await;

    let mut request = mac_request(&[(AttributeType::CallingStationId, "aabbccddeeff")], 14);
    request.code = Code::AccountingRequest;
    let result = tokio::time::timeout(
        Duration::from_millis(500),
        send_radius_request(&request, addr),
    )
    .await;

    assert!(result.is_err() || result.unwrap().is_err());
}

#[tokio::test]
async fn test_concurrent_requests() {
    let mut file = NamedTempFile::new().unwrap();
    write_config(
        &mut file,
        "mapping:\n  10: [\"00:00:00:00:00:01\"]\n  20: [\"00:00:00:00:00:02\"]\n",
    );
    let (addr, _) = start_server(&file).await;

    let tasks: Vec<_> = (0..20u8)
        .map(|i| {
            tokio::spawn(async move {
                let (mac, vlan) = if i % 2 == 0 {
                    ("00-00-00-00-00-01", "10")
                } else {
                    ("00-00-00-00-00-02", "20")
                };
                let request = mac_request(&[(AttributeType::CallingStationId, mac)], i);
                let response = send_radius_request(&request, addr).await.unwrap();
                assert_eq!(response.identifier, i);
                assert_eq!(tunnel_triple(&response)[0], (81, 0, vlan.to_string()));
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test]
async fn test_audit_log_records_decisions() {
    let audit_file = NamedTempFile::new().unwrap();
    let audit_path = audit_file.path().to_str().unwrap().to_string();

    let mut file = NamedTempFile::new().unwrap();
    let body = format!(
        "audit_log_path: {}\nmapping:\n  1: [\"aa:bb:cc:dd:ee:ff\"]\n",
        audit_path
    );
    write_config(&mut file, &body);
    let (addr, _) = start_server(&file).await;

    let request = mac_request(&[(AttributeType::CallingStationId, "AA:BB:CC:DD:EE:FF")], 15);
    send_radius_request(&request, addr).await.unwrap();
    let request = mac_request(&[(AttributeType::CallingStationId, "11:22:33:44:55:66")], 16);
    send_radius_request(&request, addr).await.unwrap();

    let contents = std::fs::read_to_string(&audit_path).unwrap();
    let entries: Vec<AuditEntry> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let accept = entries
        .iter()
        .find(|e| e.event_type == AuditEventType::AccessAccept)
        .expect("No accept entry");
    assert_eq!(accept.mac.as_deref(), Some("aabbccddeeff"));
    assert_eq!(accept.vlan, Some(1));
    assert_eq!(accept.request_id, Some(15));

    let reject = entries
        .iter()
        .find(|e| e.event_type == AuditEventType::AccessReject)
        .expect("No reject entry");
    assert_eq!(reject.mac.as_deref(), Some("112233445566"));
    assert_eq!(reject.vlan, None);
}
