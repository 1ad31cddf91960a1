//! Configuration sections.
//!
//! Each section derives `Default` so a partial file only overrides what it
//! names. Unknown keys are rejected.

use std::collections::BTreeMap;

use itemgate_telemetry::{LogConfig, LogFormat, MetricsConfig as TelemetryMetricsConfig};
use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address (e.g. `"0.0.0.0:8080"`).
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Seconds to wait for in-flight connections on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Which token validator the auth gate uses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    /// Any three-segment JWT-shaped token; subject from the `sub` claim.
    #[default]
    UnverifiedJwt,
    /// Only tokens listed in `static_tokens`.
    Static,
}

/// Bearer-token gate settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Validator selection.
    #[serde(default)]
    pub validator: ValidatorKind,

    /// Subject for JWT-shaped tokens without a `sub` claim.
    #[serde(default = "default_subject")]
    pub default_subject: String,

    /// Token to subject table for the static validator.
    #[serde(default)]
    pub static_tokens: BTreeMap<String, String>,
}

fn default_subject() -> String {
    "user-123".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorKind::default(),
            default_subject: default_subject(),
            static_tokens: BTreeMap::new(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Converts to the telemetry logging config.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ..LogConfig::default()
        }
    }
}

/// Prometheus exporter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether the exporter is started.
    #[serde(default)]
    pub enabled: bool,

    /// Scrape listener address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
        }
    }
}

impl MetricsConfig {
    /// Converts to the telemetry metrics config.
    #[must_use]
    pub fn to_metrics_config(&self) -> TelemetryMetricsConfig {
        TelemetryMetricsConfig {
            enabled: self.enabled,
            addr: self.addr.clone(),
            ..TelemetryMetricsConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: ServerConfig = toml::from_str("http_addr = \"127.0.0.1:3000\"").unwrap();
        assert_eq!(config.http_addr, "127.0.0.1:3000");
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_validator_kind_names() {
        let auth: AuthConfig = toml::from_str("validator = \"static\"").unwrap();
        assert_eq!(auth.validator, ValidatorKind::Static);
        let auth: AuthConfig = toml::from_str("validator = \"unverified_jwt\"").unwrap();
        assert_eq!(auth.validator, ValidatorKind::UnverifiedJwt);
    }

    #[test]
    fn test_logging_conversion() {
        let logging = LoggingConfig {
            enabled: true,
            level: "debug".to_string(),
            format: LogFormat::Pretty,
        };
        let log = logging.to_log_config();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_metrics_conversion_keeps_buckets() {
        let metrics = MetricsConfig {
            enabled: true,
            addr: "127.0.0.1:9100".to_string(),
        };
        let converted = metrics.to_metrics_config();
        assert!(converted.enabled);
        assert_eq!(converted.addr, "127.0.0.1:9100");
        assert!(!converted.duration_buckets.is_empty());
    }
}
