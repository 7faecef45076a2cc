use crate::audit::{AuditEntry, AuditEventType, AuditLogger};
use crate::config::{Config, ConfigError};
use crate::handler::{AuthenticationOutcome, MacVlanHandler};
use crate::mapping::LoadReport;
use crate::response::PendingResponse;
use crate::store::ConfigStore;
use radius_proto::{AttributeType, Code, Packet, PacketError};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid client")]
    InvalidClient,
}

/// Everything a running server needs
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Listener, secrets and NAS clients
    pub config: Arc<Config>,
    /// Decision Handler and the mapping it reads
    pub handler: MacVlanHandler,
    pub audit_logger: Arc<AuditLogger>,
}

impl ServerConfig {
    pub fn new(config: Config, store: Arc<ConfigStore>) -> Result<Self, ServerError> {
        let bind_addr = config.socket_addr()?;
        let audit_logger = Arc::new(AuditLogger::new(config.audit_log_path.clone())?);

        Ok(ServerConfig {
            bind_addr,
            config: Arc::new(config),
            handler: MacVlanHandler::new(store),
            audit_logger,
        })
    }

    /// Handle for reloading the mapping while the server runs
    pub fn reload_handle(&self) -> ReloadHandle {
        ReloadHandle {
            store: Arc::clone(self.handler.store()),
            audit_logger: Arc::clone(&self.audit_logger),
        }
    }
}

/// Triggers a mapping reload and records it in the audit log
#[derive(Clone)]
pub struct ReloadHandle {
    store: Arc<ConfigStore>,
    audit_logger: Arc<AuditLogger>,
}

impl ReloadHandle {
    /// Reload the mapping on the blocking pool, since sources read files
    pub async fn reload(&self) -> Result<LoadReport, ConfigError> {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || store.reload())
            .await
            .unwrap_or_else(|e| Err(ConfigError::Invalid(format!("Reload task failed: {}", e))));
        let entry = match &result {
            Ok(report) => AuditEntry::new(AuditEventType::ConfigReload).with_report(report),
            Err(e) => AuditEntry::new(AuditEventType::ConfigReloadFailed).with_details(format!(
                "{}: {}",
                self.store.describe_source(),
                e
            )),
        };
        self.audit_logger.log(entry).await;
        result
    }
}

/// RADIUS server answering MAC authentication requests
pub struct RadiusServer {
    config: Arc<ServerConfig>,
    socket: Arc<UdpSocket>,
}

impl RadiusServer {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(config.bind_addr).await?;
        info!("RADIUS server listening on {}", socket.local_addr()?);

        Ok(RadiusServer {
            config: Arc::new(config),
            socket: Arc::new(socket),
        })
    }

    /// Get the local address the server is listening on
    ///
    /// This is useful for testing when binding to port 0 (OS-assigned port)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket.local_addr().map_err(ServerError::from)
    }

    pub fn reload_handle(&self) -> ReloadHandle {
        self.config.reload_handle()
    }

    /// Receive requests until the socket fails
    pub async fn run(&self) -> Result<(), ServerError> {
        let start = AuditEntry::new(AuditEventType::ServerStart)
            .with_details(self.local_addr()?.to_string());
        self.config.audit_logger.log(start).await;

        let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE];

        loop {
            let (len, addr) = self.socket.recv_from(&mut buf).await?;
            let data = buf[..len].to_vec();

            let config = Arc::clone(&self.config);
            let socket = Arc::clone(&self.socket);

            tokio::spawn(async move {
                if let Err(e) = Self::handle_request(data, addr, config, socket).await {
                    debug!("Error handling request from {}: {}", addr, e);
                }
            });
        }
    }

    async fn handle_request(
        data: Vec<u8>,
        addr: SocketAddr,
        config: Arc<ServerConfig>,
        socket: Arc<UdpSocket>,
    ) -> Result<(), ServerError> {
        // RFC 2865 Section 3: silently discard requests from unknown clients
        if !config.config.is_client_authorized(addr.ip()) {
            let request_id = data.get(1).copied().unwrap_or(0);
            warn!(
                client_ip = %addr.ip(),
                request_id = request_id,
                "Rejected request from unauthorized client"
            );
            config
                .audit_logger
                .log(
                    AuditEntry::new(AuditEventType::UnauthorizedClient)
                        .with_client_ip(addr.ip())
                        .with_request_id(request_id),
                )
                .await;
            return Err(ServerError::InvalidClient);
        }

        let request = Packet::decode(&data)?;

        if request.code != Code::AccessRequest {
            debug!(
                packet_type = %request.code,
                client_addr = %addr,
                "Ignoring unsupported packet type"
            );
            return Ok(());
        }

        let response = Self::handle_access_request(&request, &config, addr.ip()).await?;

        socket.send_to(&response.encode()?, addr).await?;
        debug!(
            response_type = %response.code,
            client_addr = %addr,
            request_id = response.identifier,
            "Sent RADIUS response"
        );

        Ok(())
    }

    async fn handle_access_request(
        request: &Packet,
        config: &ServerConfig,
        source_ip: IpAddr,
    ) -> Result<Packet, ServerError> {
        let calling_station_id = request
            .find_attribute(AttributeType::CallingStationId.as_u8())
            .map(|attr| attr.as_string_lossy().into_owned());
        let user_name = request
            .find_attribute(AttributeType::UserName.as_u8())
            .map(|attr| attr.as_string_lossy().into_owned());

        info!(
            client_ip = %source_ip,
            request_id = request.identifier,
            calling_station_id = calling_station_id.as_deref().unwrap_or("-"),
            user_name = user_name.as_deref().unwrap_or("-"),
            "Received Access-Request"
        );

        let mut pending = PendingResponse::new();
        let decision = config.handler.handle(request, &mut pending);

        let mac = decision.mac.as_ref().map(|m| m.to_string());
        let client_name = config
            .config
            .find_client(source_ip)
            .and_then(|client| client.name.as_deref());

        let entry = match decision.outcome {
            AuthenticationOutcome::Accept(vlan) => {
                info!(
                    mac = mac.as_deref().unwrap_or("-"),
                    vlan = vlan.get(),
                    client_ip = %source_ip,
                    request_id = request.identifier,
                    "Access-Accept"
                );
                AuditEntry::new(AuditEventType::AccessAccept).with_vlan(Some(vlan))
            }
            AuthenticationOutcome::Reject => {
                let reason = if decision.mac.is_some() {
                    "MAC not mapped and no default VLAN"
                } else {
                    "No MAC address in request"
                };
                info!(
                    mac = mac.as_deref().unwrap_or("-"),
                    client_ip = %source_ip,
                    request_id = request.identifier,
                    reason,
                    "Access-Reject"
                );
                AuditEntry::new(AuditEventType::AccessReject).with_details(reason)
            }
        };

        config
            .audit_logger
            .log(
                entry
                    .with_mac(decision.mac.as_ref())
                    .with_client_ip(source_ip)
                    .with_client_name(client_name)
                    .with_request_id(request.identifier),
            )
            .await;

        let secret = config.config.secret_for_client(source_ip);
        Ok(pending.into_packet(request, secret)?)
    }
}
