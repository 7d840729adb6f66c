//! Errors reported by kiosk operations

use kiosk_api::{ErrorCode, ErrorInfo};
use kiosk_host_api::PowerError;
use kiosk_store::StoreError;
use kiosk_util::UserId;
use thiserror::Error;

/// Every way a kiosk operation can fail.
///
/// Store and power-control failures are converted at the boundary of the
/// operation that issued them; transport errors never escape raw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KioskError {
    #[error("Account not found: {0}")]
    AccountNotFound(UserId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown package: {0}")]
    InvalidPackage(String),

    #[error("Not enough money: balance {balance}, cost {cost}")]
    InsufficientFunds { balance: u64, cost: u64 },

    #[error("Account store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Power control failed: {0}")]
    PowerControlFailed(String),

    #[error("Time has expired; the terminal is shutting down")]
    SessionExpiring,
}

impl KioskError {
    /// Wire error code for this kind
    pub fn code(&self) -> ErrorCode {
        match self {
            KioskError::AccountNotFound(_) => ErrorCode::AccountNotFound,
            KioskError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            KioskError::InvalidPackage(_) => ErrorCode::InvalidPackage,
            KioskError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            KioskError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            KioskError::PowerControlFailed(_) => ErrorCode::PowerControlFailed,
            KioskError::SessionExpiring => ErrorCode::SessionExpiring,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.code(), self.to_string())
    }
}

impl From<StoreError> for KioskError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(user) => KioskError::AccountNotFound(UserId::new(user)),
            other => KioskError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<PowerError> for KioskError {
    fn from(e: PowerError) -> Self {
        KioskError::PowerControlFailed(e.to_string())
    }
}

pub type KioskResult<T> = Result<T, KioskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_becomes_account_not_found() {
        let err: KioskError = StoreError::NotFound("alice".into()).into();
        assert_eq!(err, KioskError::AccountNotFound(UserId::new("alice")));
        assert_eq!(err.code(), ErrorCode::AccountNotFound);
    }

    #[test]
    fn other_store_errors_are_unavailable() {
        let err: KioskError = StoreError::Database("disk I/O error".into()).into();
        assert!(matches!(err, KioskError::StoreUnavailable(ref m) if m.contains("disk I/O")));
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
    }

    #[test]
    fn power_errors_map_to_power_control_failed() {
        let err: KioskError = PowerError::PermissionDenied("not root".into()).into();
        assert_eq!(err.code(), ErrorCode::PowerControlFailed);
    }

    #[test]
    fn error_info_carries_message() {
        let info = KioskError::InsufficientFunds {
            balance: 500,
            cost: 1000,
        }
        .to_error_info();
        assert_eq!(info.code, ErrorCode::InsufficientFunds);
        assert!(info.message.contains("500"));
    }
}
