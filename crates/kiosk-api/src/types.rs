//! Shared types for the kioskd API

use serde::{Deserialize, Serialize};
use kiosk_util::UserId;

/// State of the session countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// No countdown: never started, or started with no time
    Idle,
    /// Ticking once per second
    Running,
    /// Reached zero; the shutdown sequence is in progress
    Expiring,
    /// Cancelled by the caller; a credit restarts it
    Stopped,
}

impl TimerState {
    pub fn is_running(self) -> bool {
        self == TimerState::Running
    }
}

/// A purchasable time package as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageView {
    pub label: String,
    /// Time added, in seconds
    pub seconds: u64,
    /// Price in currency units
    pub cost: u64,
}

/// Result of a successful purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub package: String,
    pub seconds_added: u64,
    pub cost: u64,
    /// Balance after the debit
    pub money_left: u64,
    /// Countdown after the credit
    pub seconds_left: u64,
}

impl PurchaseReceipt {
    /// Human-readable confirmation, e.g. "Added 35 minutes for 1000."
    pub fn message(&self) -> String {
        format!(
            "Added {} minutes for {}.",
            kiosk_util::whole_minutes(self.seconds_added),
            self.cost
        )
    }
}

/// Result of a successful charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub amount: u64,
    /// Balance after the charge
    pub balance: u64,
}

impl ChargeReceipt {
    pub fn message(&self) -> String {
        format!("Charged {}. New balance: {}.", self.amount, self.balance)
    }
}

/// Full service state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStateSnapshot {
    pub api_version: u32,
    pub user_id: UserId,
    pub state: TimerState,
    pub seconds_left: u64,
    /// Current balance; None if the store could not be read
    pub money: Option<u64>,
}

/// Role for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    /// Terminal front end - can view state, buy time, stop
    Shell,
    /// Operator - can also charge money
    Admin,
    /// Read-only observer
    Observer,
}

impl ClientRole {
    pub fn can_purchase(&self) -> bool {
        matches!(self, ClientRole::Shell | ClientRole::Admin)
    }

    pub fn can_stop(&self) -> bool {
        matches!(self, ClientRole::Shell | ClientRole::Admin)
    }

    pub fn can_charge(&self) -> bool {
        matches!(self, ClientRole::Admin)
    }
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub live: bool,
    pub ready: bool,
    pub store_ok: bool,
    pub power_control_ok: bool,
}
