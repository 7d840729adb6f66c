//! Core events emitted by the session timer

use kiosk_host_api::PowerAction;

/// Lifecycle events the service loop reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// Countdown reached zero; the shutdown sequence has begun
    Expired,

    /// Power control accepted the shutdown request
    ShutdownInvoked { action: PowerAction },

    /// Power control could not shut the host down
    ShutdownFailed { message: String },
}
