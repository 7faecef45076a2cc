use ipnetwork::IpNetwork;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "mac-vlan-config.yaml";

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env var pattern")
});

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Configuration has no `mapping` section")]
    MissingMapping,
    #[error("Configuration `mapping` section is empty")]
    EmptyMapping,
}

/// RADIUS listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiusSettings {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Default shared secret, `${VAR}` is expanded from the environment
    #[serde(default = "default_secret")]
    pub secret: String,
}

impl Default for RadiusSettings {
    fn default() -> Self {
        RadiusSettings {
            listen_address: default_listen_address(),
            port: default_port(),
            secret: default_secret(),
        }
    }
}

/// NAS client allowed to query the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Client IP address or network (supports CIDR notation)
    pub address: String,
    /// Shared secret for this client
    pub secret: String,
    /// Optional client name/description
    #[serde(default)]
    pub name: Option<String>,
    /// Enable/disable this client
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1812 // Standard RADIUS authentication port
}

fn default_secret() -> String {
    "testing123".to_string()
}

impl Client {
    /// Parse the client address as an IP network
    pub fn parse_network(&self) -> Result<IpNetwork, ConfigError> {
        if let Ok(network) = self.address.parse::<IpNetwork>() {
            return Ok(network);
        }
        if let Ok(ip) = self.address.parse::<IpAddr>() {
            return Ok(IpNetwork::from(ip));
        }
        Err(ConfigError::Invalid(format!(
            "Invalid client address: {}",
            self.address
        )))
    }

    /// Check if a source IP address matches this client
    pub fn matches(&self, source_ip: IpAddr) -> bool {
        self.parse_network()
            .map(|network| network.contains(source_ip))
            .unwrap_or(false)
    }
}

/// Server configuration file
///
/// The `mapping` section stays a generic YAML value; it is interpreted by
/// [`crate::mapping::MacVlanMapping::from_mapping`] so that malformed entries
/// are skipped one by one instead of failing the whole file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub radius: RadiusSettings,

    /// Authorized NAS clients; empty means any source address is accepted
    #[serde(default)]
    pub clients: Vec<Client>,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,

    /// Audit log file path (JSON lines, optional)
    #[serde(default)]
    pub audit_log_path: Option<String>,

    /// VLAN id (or `default`) to list of MAC addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Value>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(contents)?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_yaml::to_string(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// The `mapping` section as a mapping
    pub fn mapping_section(&self) -> Result<&Mapping, ConfigError> {
        match &self.mapping {
            Some(Value::Mapping(mapping)) if mapping.is_empty() => Err(ConfigError::EmptyMapping),
            Some(Value::Mapping(mapping)) => Ok(mapping),
            _ => Err(ConfigError::MissingMapping),
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr: IpAddr = self.radius.listen_address.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "Invalid listen address: {}",
                self.radius.listen_address
            ))
        })?;
        Ok(SocketAddr::new(addr, self.radius.port))
    }

    /// First enabled client matching the source IP
    pub fn find_client(&self, source_ip: IpAddr) -> Option<&Client> {
        self.clients
            .iter()
            .filter(|client| client.enabled)
            .find(|client| client.matches(source_ip))
    }

    /// Whether a request from `source_ip` should be answered
    pub fn is_client_authorized(&self, source_ip: IpAddr) -> bool {
        self.clients.is_empty() || self.find_client(source_ip).is_some()
    }

    /// Client-specific secret, else the default shared secret
    pub fn secret_for_client(&self, source_ip: IpAddr) -> &[u8] {
        self.find_client(source_ip)
            .map(|client| client.secret.as_bytes())
            .unwrap_or_else(|| self.radius.secret.as_bytes())
    }

    fn expand_env(&mut self) -> Result<(), ConfigError> {
        self.radius.secret = expand_env_vars(&self.radius.secret)?;
        for client in &mut self.clients {
            client.secret = expand_env_vars(&client.secret)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.radius.port == 0 {
            return Err(ConfigError::Invalid("Port cannot be 0".to_string()));
        }

        if self.radius.secret.is_empty() {
            return Err(ConfigError::Invalid("Secret cannot be empty".to_string()));
        }

        for client in &self.clients {
            if client.secret.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Client {} has empty secret",
                    client.address
                )));
            }
            client.parse_network()?;
        }

        Ok(())
    }

    /// Starter configuration written when no file exists yet
    pub fn example() -> Self {
        let mapping: Value = serde_yaml::from_str(
            r#"
default: 99
10:
  - "aa:bb:cc:dd:ee:ff"
  - "11-22-33-44-55-66"
20:
  - "001122334455"
"#,
        )
        .unwrap_or(Value::Null);

        Config {
            radius: RadiusSettings::default(),
            clients: vec![Client {
                address: "192.168.1.0/24".to_string(),
                secret: "client_secret_1".to_string(),
                name: Some("Access Points".to_string()),
                enabled: true,
            }],
            log_level: Some("info".to_string()),
            audit_log_path: None,
            mapping: Some(mapping),
        }
    }
}

/// Replace every `${VAR}` with the value of the environment variable
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut missing = None;
    let expanded = ENV_VAR.replace_all(input, |caps: &Captures| {
        let name = &caps[1];
        std::env::var(name).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });
    match missing {
        Some(name) => Err(ConfigError::Invalid(format!(
            "Environment variable not set: {}",
            name
        ))),
        None => Ok(expanded.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("mapping:\n  default: 1\n").unwrap();
        assert_eq!(config.radius.port, 1812);
        assert_eq!(config.radius.secret, "testing123");
        assert_eq!(config.socket_addr().unwrap().port(), 1812);
        assert!(config.clients.is_empty());
    }

    #[test]
    fn test_radius_section() {
        let config = Config::from_yaml(
            "radius:\n  listen_address: 127.0.0.1\n  port: 11812\n  secret: s3cret\n",
        )
        .unwrap();
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:11812".parse().unwrap()
        );
        assert_eq!(config.radius.secret, "s3cret");
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::from_yaml("radius:\n  secret: \"\"\n").is_err());
        assert!(Config::from_yaml("radius:\n  port: 0\n").is_err());
        assert!(Config::from_yaml("radius:\n  listen_address: nowhere\n").is_err());
        assert!(Config::from_yaml("clients:\n  - address: bogus\n    secret: x\n").is_err());
        assert!(Config::from_yaml("radius: [1, 2]\n").is_err());
    }

    #[test]
    fn test_mapping_section() {
        let config = Config::from_yaml("log_level: info\n").unwrap();
        assert!(matches!(
            config.mapping_section(),
            Err(ConfigError::MissingMapping)
        ));

        let config = Config::from_yaml("mapping: {}\n").unwrap();
        assert!(matches!(
            config.mapping_section(),
            Err(ConfigError::EmptyMapping)
        ));

        let config = Config::from_yaml("mapping: [a, b]\n").unwrap();
        assert!(matches!(
            config.mapping_section(),
            Err(ConfigError::MissingMapping)
        ));

        let config = Config::from_yaml("mapping:\n  10: [aabbccddeeff]\n").unwrap();
        assert_eq!(config.mapping_section().unwrap().len(), 1);
    }

    #[test]
    fn test_client_matching() {
        let config = Config::from_yaml(
            r#"
radius:
  secret: default_secret
clients:
  - address: 192.168.1.0/24
    secret: ap_secret
    name: Office
  - address: 10.0.0.1
    secret: single_secret
  - address: 172.16.0.0/12
    secret: disabled_secret
    enabled: false
"#,
        )
        .unwrap();

        let client = config.find_client("192.168.1.50".parse().unwrap()).unwrap();
        assert_eq!(client.name.as_deref(), Some("Office"));
        assert_eq!(
            config.secret_for_client("10.0.0.1".parse().unwrap()),
            b"single_secret"
        );
        assert!(config.find_client("172.16.0.1".parse().unwrap()).is_none());
        assert!(!config.is_client_authorized("172.16.0.1".parse().unwrap()));
        assert_eq!(
            config.secret_for_client("8.8.8.8".parse().unwrap()),
            b"default_secret"
        );
    }

    #[test]
    fn test_empty_client_list_authorizes_everyone() {
        let config = Config::default();
        assert!(config.is_client_authorized("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_env_var_not_found() {
        let err = Config::from_yaml("radius:\n  secret: \"${VLAN_SELECTOR_UNSET_VAR_93412}\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("VLAN_SELECTOR_UNSET_VAR_93412"));
    }

    #[test]
    fn test_env_var_expansion() {
        // PATH is set in every test environment
        let path = std::env::var("PATH").unwrap();
        let expanded = expand_env_vars("pre-${PATH}-post").unwrap();
        assert_eq!(expanded, format!("pre-{}-post", path));
        assert_eq!(expand_env_vars("plain").unwrap(), "plain");
    }

    #[test]
    fn test_example_round_trips_through_yaml() {
        let example = Config::example();
        let text = serde_yaml::to_string(&example).unwrap();
        let parsed = Config::from_yaml(&text).unwrap();
        assert_eq!(parsed.clients.len(), 1);
        assert_eq!(parsed.mapping_section().unwrap().len(), 3);
    }
}
