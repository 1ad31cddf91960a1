//! Top-level configuration.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{AuthConfig, LoggingConfig, MetricsConfig, ServerConfig, ValidatorKind};

/// Complete itemgate configuration.
///
/// ```toml
/// [server]
/// http_addr = "0.0.0.0:8080"
///
/// [auth]
/// validator = "static"
///
/// [auth.static_tokens]
/// "secret-token" = "svc-reporting"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ItemgateConfig {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bearer-token gate.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Prometheus exporter.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl ItemgateConfig {
    /// Configuration suited to local development: pretty logs at debug
    /// level on a loopback listener.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.logging.level = "debug".to_string();
        config.logging.format = itemgate_telemetry::LogFormat::Pretty;
        config
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_addr("server.http_addr", &self.server.http_addr)?;

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.metrics.enabled {
            parse_addr("metrics.addr", &self.metrics.addr)?;
        }

        if self.auth.default_subject.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "auth.default_subject",
                "must not be blank",
            ));
        }

        if self.auth.validator == ValidatorKind::Static && self.auth.static_tokens.is_empty() {
            return Err(ConfigError::invalid_value(
                "auth.static_tokens",
                "static validator requires at least one token",
            ));
        }

        if self.auth.static_tokens.keys().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "auth.static_tokens",
                "tokens must not be blank",
            ));
        }

        Ok(())
    }

    /// Parsed listen address.
    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_addr("server.http_addr", &self.server.http_addr)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    /// Shutdown drain timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse::<SocketAddr>()
        .map_err(|_| ConfigError::invalid_value(field, format!("invalid socket address: {value}")))
}
