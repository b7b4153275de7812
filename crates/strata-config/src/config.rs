//! The top-level configuration.

use crate::{ConfigError, LoggingSection, ServerSection};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// Complete Strata configuration.
///
/// # Example
///
/// ```
/// use strata_config::StrataConfig;
///
/// let config = StrataConfig::default();
/// assert_eq!(config.server.port, 3000);
/// assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct StrataConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl StrataConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero port, a host that is
    /// not an IP address, a zero request timeout, or a log filter that does
    /// not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid_value("server.port", "must not be zero"));
        }

        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.host",
                format!("invalid IP address: {}", self.server.host),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must not be zero",
            ));
        }

        if let Err(e) = strata_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Returns the address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the host is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.host",
                format!("invalid IP address: {}", self.server.host),
            )
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
