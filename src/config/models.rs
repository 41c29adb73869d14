// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_host: IpAddr,
    pub listen_port: u16,
    /// Backend addresses in round-robin order.
    pub backends: Vec<String>,
    pub health: HealthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            listen_port: 3000,
            backends: vec![
                "https://www.facebook.com".to_string(),
                "https://www.bing.com".to_string(),
                "https://www.duckduckgo.com".to_string(),
            ],
            health: HealthConfig::default(),
        }
    }
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.listen_port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::EmptyPool);
        }

        for address in &self.backends {
            parse_backend_address(address)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub policy: HealthPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthPolicy {
    #[default]
    AlwaysAlive,
    ReportedLiveness,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend address {address:?} must use http or https, got {scheme:?}")]
    UnsupportedScheme { address: String, scheme: String },

    #[error("no backends configured")]
    EmptyPool,
}

/// Parse and check a backend address. Only absolute http(s) URLs can be
/// forwarded to; the url crate already rejects those without a host.
pub fn parse_backend_address(address: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(address).map_err(|source| ConfigError::InvalidAddress {
        address: address.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            address: address.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backends.len(), 3);
        assert_eq!(config.listen_addr().port(), 3000);
    }

    #[test]
    fn test_unparsable_address() {
        let err = parse_backend_address("not a url \x00").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { .. }));
    }

    #[test]
    fn test_non_http_scheme() {
        let err = parse_backend_address("ftp://files.example.com").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));
    }

    #[test]
    fn test_validate_reports_bad_backend() {
        let config = Config {
            backends: vec!["http://ok".to_string(), "::nope".to_string()],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_validate_empty_pool() {
        let config = Config {
            backends: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPool)));
    }
}
