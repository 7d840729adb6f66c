//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// What happens when the countdown expires
    #[serde(default)]
    pub power: RawPowerConfig,

    /// Pricing table; the built-in table is used when absent
    #[serde(default)]
    pub packages: Option<Vec<RawPackage>>,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// IPC socket path (default: /run/kioskd/kioskd.sock)
    pub socket_path: Option<PathBuf>,

    /// Data directory for the account database
    pub data_dir: Option<PathBuf>,

    /// Account bound to this terminal
    pub user_id: Option<String>,

    /// Countdown period in milliseconds (default: 1000)
    pub tick_interval_ms: Option<u64>,

    /// Delay between the expiry notice and power-off (default: 1000)
    pub grace_delay_ms: Option<u64>,
}

/// Power control settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPowerConfig {
    /// "power_off" or "reboot"
    pub action: Option<String>,

    /// Command override, e.g. ["systemctl", "poweroff"]
    pub command: Option<Vec<String>>,
}

/// One purchasable package
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPackage {
    pub label: String,
    pub seconds: u64,
    pub cost: u64,
}
