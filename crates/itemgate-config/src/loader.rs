//! Layered configuration loading.
//!
//! Layers apply in order, later ones winning: built-in defaults, one
//! configuration file (TOML or JSON), then `PREFIX__SECTION__KEY`
//! environment variables.

use std::fs;
use std::path::Path;

use itemgate_telemetry::LogFormat;

use crate::error::ConfigError;
use crate::schema::ValidatorKind;
use crate::ItemgateConfig;

/// Default environment prefix.
pub const DEFAULT_ENV_PREFIX: &str = "ITEMGATE";

/// Builds an [`ItemgateConfig`] from defaults, a file and the environment.
///
/// ```no_run
/// use itemgate_config::ConfigLoader;
///
/// # fn main() -> Result<(), itemgate_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("itemgate.toml")?
///     .with_env_prefix("ITEMGATE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ItemgateConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ItemgateConfig::default();
        self
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ItemgateConfig::development();
        self
    }

    /// Loads a `.toml` or `.json` file, replacing the current values.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration text in the named format (`"toml"` or `"json"`).
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = Self::parse_str(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Enables `PREFIX__SECTION__KEY` environment overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads `.env` into the process environment if present.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Applies environment overrides and validates.
    pub fn load(self) -> Result<ItemgateConfig, ConfigError> {
        let vars = std::env::vars();
        self.load_from_vars(vars)
    }

    /// Returns the configuration without environment overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ItemgateConfig {
        self.config
    }

    fn load_from_vars(
        mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<ItemgateConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            for (key, value) in vars {
                if key.starts_with(&prefix) {
                    self.apply_env_var(&key, &value, &prefix)?;
                }
            }
        }
        self.config.validate()?;
        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<ItemgateConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        Self::parse_str(content, &extension)
            .map_err(|e| match e {
                ConfigError::UnsupportedFormat(_) => {
                    ConfigError::UnsupportedFormat(path.display().to_string())
                }
                other => other,
            })
    }

    fn parse_str(content: &str, format: &str) -> Result<ItemgateConfig, ConfigError> {
        match format {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // Shares the prefix but not the separator, e.g. ITEMGATE_HOME.
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => self.config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                self.config.server.request_timeout_ms = parse_int(key, value)?;
            }

            ["AUTH", "VALIDATOR"] => {
                self.config.auth.validator = match value.to_lowercase().as_str() {
                    "unverified_jwt" => ValidatorKind::UnverifiedJwt,
                    "static" => ValidatorKind::Static,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected unverified_jwt or static",
                        ))
                    }
                };
            }
            ["AUTH", "DEFAULT_SUBJECT"] => self.config.auth.default_subject = value.to_string(),
            ["AUTH", "STATIC_TOKENS"] => {
                self.config.auth.static_tokens = parse_token_table(key, value)?;
            }

            ["LOGGING", "ENABLED"] => self.config.logging.enabled = parse_bool(key, value)?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_parse_error(key, "expected json or pretty")),
                };
            }

            ["METRICS", "ENABLED"] => self.config.metrics.enabled = parse_bool(key, value)?,
            ["METRICS", "ADDR"] => self.config.metrics.addr = value.to_string(),

            _ => {}
        }
        Ok(())
    }
}

fn parse_int(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

/// Parses `token=subject` pairs separated by commas.
fn parse_token_table(
    key: &str,
    value: &str,
) -> Result<std::collections::BTreeMap<String, String>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(token, subject)| (token.trim().to_string(), subject.trim().to_string()))
                .ok_or_else(|| ConfigError::env_parse_error(key, "expected token=subject pairs"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new().load_from_vars(Vec::new()).unwrap();
        assert_eq!(config, ItemgateConfig::default());
    }

    #[test]
    fn test_toml_file() {
        let file = temp_file(
            ".toml",
            r#"
                [server]
                http_addr = "127.0.0.1:3000"

                [auth]
                validator = "static"

                [auth.static_tokens]
                "secret" = "svc-reporting"
            "#,
        );
        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load_from_vars(Vec::new())
            .unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.auth.validator, ValidatorKind::Static);
        assert_eq!(
            config.auth.static_tokens.get("secret").map(String::as_str),
            Some("svc-reporting")
        );
    }

    #[test]
    fn test_json_file() {
        let file = temp_file(".json", r#"{"logging": {"level": "warn"}}"#);
        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new()
            .with_file("/definitely/not/here.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        ConfigLoader::new()
            .with_optional_file("/definitely/not/here.toml")
            .unwrap();
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_file(".yaml", "server: {}");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_with_string() {
        let config = ConfigLoader::new()
            .with_string("[metrics]\nenabled = true", "TOML")
            .unwrap()
            .load_unvalidated();
        assert!(config.metrics.enabled);

        assert!(ConfigLoader::new().with_string("{}", "ini").is_err());
        assert!(matches!(
            ConfigLoader::new().with_string("[server", "toml"),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::new()
            .with_env_prefix("itemgate")
            .load_from_vars(vars(&[
                ("ITEMGATE__SERVER__HTTP_ADDR", "127.0.0.1:9000"),
                ("ITEMGATE__SERVER__REQUEST_TIMEOUT_MS", "1500"),
                ("ITEMGATE__LOGGING__FORMAT", "pretty"),
                ("ITEMGATE__METRICS__ENABLED", "yes"),
                ("ITEMGATE__AUTH__DEFAULT_SUBJECT", "anon"),
                ("OTHER__SERVER__HTTP_ADDR", "ignored"),
                ("ITEMGATE_HOME", "/tmp"),
            ]))
            .unwrap();
        assert_eq!(config.server.http_addr, "127.0.0.1:9000");
        assert_eq!(config.server.request_timeout_ms, 1500);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.metrics.enabled);
        assert_eq!(config.auth.default_subject, "anon");
    }

    #[test]
    fn test_env_static_tokens() {
        let config = ConfigLoader::new()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load_from_vars(vars(&[
                ("ITEMGATE__AUTH__VALIDATOR", "static"),
                ("ITEMGATE__AUTH__STATIC_TOKENS", "a=alice, b=bob"),
            ]))
            .unwrap();
        assert_eq!(config.auth.validator, ValidatorKind::Static);
        assert_eq!(config.auth.static_tokens.len(), 2);
        assert_eq!(
            config.auth.static_tokens.get("b").map(String::as_str),
            Some("bob")
        );
    }

    #[test]
    fn test_env_overrides_ignored_without_prefix() {
        let config = ConfigLoader::new()
            .load_from_vars(vars(&[("ITEMGATE__SERVER__HTTP_ADDR", "bad")]))
            .unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_env_parse_errors() {
        for (key, value) in [
            ("ITEMGATE__SERVER__REQUEST_TIMEOUT_MS", "soon"),
            ("ITEMGATE__METRICS__ENABLED", "maybe"),
            ("ITEMGATE__LOGGING__FORMAT", "xml"),
            ("ITEMGATE__AUTH__VALIDATOR", "oauth"),
            ("ITEMGATE__AUTH__STATIC_TOKENS", "no-separator"),
        ] {
            let err = ConfigLoader::new()
                .with_env_prefix(DEFAULT_ENV_PREFIX)
                .load_from_vars(vars(&[(key, value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::EnvParseError { .. }),
                "{key}={value}"
            );
        }
    }

    #[test]
    fn test_load_validates() {
        let err = ConfigLoader::new()
            .with_env_prefix(DEFAULT_ENV_PREFIX)
            .load_from_vars(vars(&[("ITEMGATE__SERVER__HTTP_ADDR", "nowhere")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_bool() {
        for v in ["true", "1", "YES", "on"] {
            assert!(parse_bool("K", v).unwrap());
        }
        for v in ["false", "0", "no", "OFF"] {
            assert!(!parse_bool("K", v).unwrap());
        }
        assert!(parse_bool("K", "2").is_err());
    }
}
