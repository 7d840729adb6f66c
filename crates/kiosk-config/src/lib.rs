//! Configuration parsing and validation for kioskd
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Service settings (socket, data directory, bound account, timing)
//! - Power control action and command override
//! - An optional pricing table replacing the built-in one

mod pricing;
mod schema;
mod settings;
mod validation;

pub use pricing::*;
pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<KioskConfig> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading configuration");
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<KioskConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(KioskConfig::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_host_api::PowerAction;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let config = parse_config("config_version = 1").unwrap();
        assert_eq!(config.pricing, PricingTable::default());
        assert_eq!(config.service.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config.service.grace_delay, DEFAULT_GRACE_DELAY);
        assert_eq!(config.power.action, PowerAction::PowerOff);
        assert!(config.service.user_id.is_none());
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [service]
            socket_path = "/tmp/kiosk.sock"
            data_dir = "/tmp/kiosk"
            user_id = "terminal-07"
            tick_interval_ms = 250
            grace_delay_ms = 3000

            [power]
            action = "reboot"
            command = ["/sbin/reboot", "-f"]

            [[packages]]
            label = "15 minutes"
            seconds = 900
            cost = 500

            [[packages]]
            label = "1 hour"
            seconds = 3600
            cost = 1800
        "#;

        let config = parse_config(config).unwrap();
        assert_eq!(config.service.user_id.as_ref().unwrap().as_str(), "terminal-07");
        assert_eq!(config.service.tick_interval, Duration::from_millis(250));
        assert_eq!(config.service.grace_delay, Duration::from_secs(3));
        assert_eq!(config.power.action, PowerAction::Reboot);
        assert_eq!(config.power.command.as_deref().unwrap(), ["/sbin/reboot", "-f"]);
        assert_eq!(config.pricing.len(), 2);
        assert_eq!(config.pricing.get("1 hour").unwrap().cost, 1800);
        assert!(config.pricing.get("2 hours").is_none());
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn validation_errors_are_reported_together() {
        let config = r#"
            config_version = 1

            [service]
            tick_interval_ms = 0

            [[packages]]
            label = "nothing"
            seconds = 0
            cost = 10
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_version = 1\n[service]\nuser_id = \"alice\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.service.user_id.unwrap().as_str(), "alice");
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = load_config("/nonexistent/kioskd/config.toml");
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
