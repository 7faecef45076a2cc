//! MAC Authentication and VLAN Assignment over RADIUS
//!
//! Answers Access-Requests from access points and switches: the device MAC is
//! taken from Calling-Station-Id (or a MAC-shaped User-Name), looked up in a
//! MAC to VLAN table, and the device is accepted into its VLAN with the
//! RFC 2868 tunnel attributes, or rejected.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vlan_selector::{Config, ConfigStore, FileMappingSource, RadiusServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path = "mac-vlan-config.yaml";
//!     let config = Config::from_file(path)?;
//!     let store = Arc::new(ConfigStore::new(FileMappingSource::new(path))?);
//!
//!     let server = RadiusServer::new(ServerConfig::new(config, store)?).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod config;
pub mod extract;
pub mod handler;
pub mod mac;
pub mod mapping;
pub mod resolver;
pub mod response;
pub mod server;
pub mod store;

pub use audit::{AuditEntry, AuditEventType, AuditLogger};
pub use config::{Client, Config, ConfigError, DEFAULT_CONFIG_PATH, RadiusSettings};
pub use extract::{AttributeSource, extract};
pub use handler::{AttributeSink, AuthenticationOutcome, Decision, MacVlanHandler};
pub use mac::{MacAddress, is_mac_shaped, normalize};
pub use mapping::{LoadReport, MacVlanMapping, VlanId};
pub use resolver::resolve;
pub use response::PendingResponse;
pub use server::{RadiusServer, ReloadHandle, ServerConfig, ServerError};
pub use store::{ConfigStore, FileMappingSource, MappingSource, StaticMappingSource};
