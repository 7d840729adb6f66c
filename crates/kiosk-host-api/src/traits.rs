//! Host adapter traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from power control operations
#[derive(Debug, Error)]
pub enum PowerError {
    #[error("Failed to run power command: {0}")]
    Io(#[from] std::io::Error),

    #[error("Power command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not supported: {0}")]
    Unsupported(String),
}

pub type PowerResult<T> = Result<T, PowerError>;

/// What "shut down" means on this terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    #[default]
    PowerOff,
    Reboot,
}

impl PowerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerAction::PowerOff => "power_off",
            PowerAction::Reboot => "reboot",
        }
    }
}

/// Power control capability - implemented by platform-specific adapters
///
/// `shutdown_now` is irreversible. On success the host is going down and the
/// caller should not expect to do further work.
#[async_trait]
pub trait PowerControl: Send + Sync {
    /// The action `shutdown_now` performs
    fn action(&self) -> PowerAction;

    /// Power off (or restart) the host immediately
    async fn shutdown_now(&self) -> PowerResult<()>;

    /// Optional: check that the adapter can plausibly do its job
    fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_action_is_power_off() {
        assert_eq!(PowerAction::default(), PowerAction::PowerOff);
    }

    #[test]
    fn action_parses_from_snake_case() {
        let action: PowerAction = serde_json::from_str("\"reboot\"").unwrap();
        assert_eq!(action, PowerAction::Reboot);
        assert_eq!(action.as_str(), "reboot");
    }
}
