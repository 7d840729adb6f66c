//! Default paths for kioskd components
//!
//! Paths are user-writable by default so the service can run unprivileged
//! during development:
//! - Socket: `$XDG_RUNTIME_DIR/kioskd/kioskd.sock` or `/tmp/kioskd-$USER/kioskd.sock`
//! - Config: `$XDG_CONFIG_HOME/kioskd/config.toml` or `~/.config/kioskd/config.toml`
//! - Data: `$XDG_DATA_HOME/kioskd` or `~/.local/share/kioskd`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const KIOSK_SOCKET_ENV: &str = "KIOSK_SOCKET";

/// Environment variable for overriding the data directory
pub const KIOSK_DATA_DIR_ENV: &str = "KIOSK_DATA_DIR";

const SOCKET_FILENAME: &str = "kioskd.sock";
const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "kioskd";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$KIOSK_SOCKET`
/// 2. `$XDG_RUNTIME_DIR/kioskd/kioskd.sock`
/// 3. `/tmp/kioskd-$USER/kioskd.sock`
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(KIOSK_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Socket path ignoring `$KIOSK_SOCKET`, for config defaults where the
/// variable is checked separately.
pub fn socket_path_without_env() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the default configuration file path.
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$KIOSK_DATA_DIR`
/// 2. `$XDG_DATA_HOME/kioskd`
/// 3. `~/.local/share/kioskd`
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(KIOSK_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Data directory ignoring `$KIOSK_DATA_DIR`.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
