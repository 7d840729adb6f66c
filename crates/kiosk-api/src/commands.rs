//! Command types for the kioskd protocol

use serde::{Deserialize, Serialize};
use kiosk_util::ClientId;

use crate::{
    ChargeReceipt, ClientRole, HealthStatus, PackageView, PurchaseReceipt,
    ServiceStateSnapshot, API_VERSION,
};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    AccountNotFound,
    InvalidAmount,
    InvalidPackage,
    InsufficientFunds,
    StoreUnavailable,
    PowerControlFailed,
    SessionExpiring,
    PermissionDenied,
    RateLimited,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Get current service state
    GetState,

    /// List the pricing table
    ListPackages,

    /// Convert money into time using the package with this label
    Purchase { package: String },

    /// Add money to the account (operator only)
    Charge { amount: i64 },

    /// Persist the remaining time and stop the countdown
    Stop,

    /// Subscribe to events (returns immediately, events stream separately)
    SubscribeEvents,

    /// Unsubscribe from events
    UnsubscribeEvents,

    /// Get health status
    GetHealth,

    /// Ping for keepalive
    Ping,
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    State(ServiceStateSnapshot),
    Packages(Vec<PackageView>),
    Purchased(PurchaseReceipt),
    Charged(ChargeReceipt),
    Stopped { seconds_left: u64 },
    Subscribed { client_id: ClientId },
    Unsubscribed,
    Health(HealthStatus),
    Pong,
}

/// Client connection info (set by IPC layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: ClientId,
    pub role: ClientRole,
    /// Unix UID if available
    pub uid: Option<u32>,
}

impl ClientInfo {
    pub fn new(role: ClientRole) -> Self {
        Self {
            client_id: ClientId::new(),
            role,
            uid: None,
        }
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_command_wire_format() {
        let req = Request::new(7, Command::Purchase { package: "2 hours".into() });
        let json = serde_json::to_string(&req).unwrap();

        assert!(json.contains("\"type\":\"purchase\""));
        assert!(json.contains("\"package\":\"2 hours\""));

        let parsed: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.request_id, 7);
        assert!(matches!(parsed.command, Command::Purchase { package } if package == "2 hours"));
    }

    #[test]
    fn negative_charge_amount_survives_the_wire() {
        // Validation happens in the core, not at deserialization.
        let parsed: Request = serde_json::from_str(
            r#"{"request_id":1,"api_version":1,"command":{"type":"charge","amount":-5}}"#,
        )
        .unwrap();
        assert!(matches!(parsed.command, Command::Charge { amount: -5 }));
    }

    #[test]
    fn error_response_carries_code() {
        let resp = Response::error(
            3,
            ErrorInfo::new(ErrorCode::InsufficientFunds, "Not enough money to add time."),
        );
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("insufficient_funds"));

        let parsed: Response = serde_json::from_str(&json).unwrap();
        match parsed.result {
            ResponseResult::Err(e) => assert_eq!(e.code, ErrorCode::InsufficientFunds),
            ResponseResult::Ok(_) => panic!("expected error"),
        }
    }
}
