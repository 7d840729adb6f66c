//! Event types for kioskd -> client streaming

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{ChargeReceipt, ErrorInfo, PurchaseReceipt, ServiceStateSnapshot, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: kiosk_util::now(),
            payload,
        }
    }
}

/// All possible events from the service to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Full state snapshot (sent on subscribe and major changes)
    StateChanged(ServiceStateSnapshot),

    /// One second elapsed
    Tick { seconds_left: u64 },

    /// Countdown reached zero; the machine shuts down after the grace delay
    Expired,

    PurchaseSucceeded {
        receipt: PurchaseReceipt,
        message: String,
    },

    PurchaseFailed { error: ErrorInfo },

    ChargeSucceeded {
        receipt: ChargeReceipt,
        message: String,
    },

    ChargeFailed { error: ErrorInfo },

    /// Countdown stopped and remaining time saved
    Stopped { seconds_left: u64 },

    /// Remaining time could not be saved when the countdown stopped
    StopFailed { error: ErrorInfo },

    /// Power control refused to shut the machine down
    PowerOffFailed { message: String },

    /// Service is shutting down
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn tick_event_wire_format() {
        let event = Event::new(EventPayload::Tick { seconds_left: 41 });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"tick\""));

        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api_version, API_VERSION);
        assert!(matches!(parsed.payload, EventPayload::Tick { seconds_left: 41 }));
    }

    #[test]
    fn failure_event_keeps_error_code() {
        let event = Event::new(EventPayload::PurchaseFailed {
            error: ErrorInfo::new(ErrorCode::InvalidPackage, "Unknown package: 9 hours"),
        });
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();

        match parsed.payload {
            EventPayload::PurchaseFailed { error } => {
                assert_eq!(error.code, ErrorCode::InvalidPackage)
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
