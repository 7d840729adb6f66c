//! Validated configuration

use kiosk_host_api::PowerAction;
use kiosk_util::{default_data_dir, default_socket_path, UserId};
use std::path::PathBuf;
use std::time::Duration;

use crate::pricing::{Package, PricingTable};
use crate::schema::{RawConfig, RawPowerConfig, RawServiceConfig};
use crate::validation::parse_power_action;

/// Default countdown period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default pause between the expiry notice and power-off
pub const DEFAULT_GRACE_DELAY: Duration = Duration::from_secs(1);

/// Complete service configuration after validation
#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub service: ServiceConfig,
    pub power: PowerConfig,
    pub pricing: PricingTable,
}

impl KioskConfig {
    /// Convert from a raw config. Call only after `validate_config` passed.
    pub fn from_raw(raw: RawConfig) -> Self {
        let pricing = match raw.packages {
            Some(packages) if !packages.is_empty() => PricingTable::new(
                packages
                    .into_iter()
                    .map(|p| Package::new(p.label.trim(), p.seconds, p.cost))
                    .collect(),
            ),
            _ => PricingTable::default(),
        };

        Self {
            service: ServiceConfig::from_raw(raw.service),
            power: PowerConfig::from_raw(raw.power),
            pricing,
        }
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::from_raw(RawServiceConfig::default()),
            power: PowerConfig::default(),
            pricing: PricingTable::default(),
        }
    }
}

/// Service-level settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub socket_path: PathBuf,
    pub data_dir: PathBuf,
    /// Account bound to this terminal; may instead come from the command line
    pub user_id: Option<UserId>,
    pub tick_interval: Duration,
    pub grace_delay: Duration,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            socket_path: raw.socket_path.unwrap_or_else(default_socket_path),
            data_dir: raw.data_dir.unwrap_or_else(default_data_dir),
            user_id: raw
                .user_id
                .map(|u| UserId::new(u.trim()))
                .filter(|u| !u.is_empty()),
            tick_interval: raw
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TICK_INTERVAL),
            grace_delay: raw
                .grace_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_GRACE_DELAY),
        }
    }
}

/// Power control settings
#[derive(Debug, Clone, Default)]
pub struct PowerConfig {
    pub action: PowerAction,
    /// Replaces the platform default command when set
    pub command: Option<Vec<String>>,
}

impl PowerConfig {
    fn from_raw(raw: RawPowerConfig) -> Self {
        Self {
            action: raw
                .action
                .as_deref()
                .and_then(parse_power_action)
                .unwrap_or_default(),
            command: raw.command,
        }
    }
}
