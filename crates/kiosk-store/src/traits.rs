//! Store trait definitions

use kiosk_util::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::StoreResult;

/// Durable balances of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    /// Currency units, never negative
    pub money: u64,
    /// Seconds of session time, as of the last flush
    pub remaining_time: u64,
}

/// The independently updatable fields of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountField {
    #[serde(rename = "money")]
    Money,
    #[serde(rename = "remainingTime")]
    RemainingTime,
}

impl AccountField {
    /// Field name as stored in account documents
    pub fn as_str(self) -> &'static str {
        match self {
            AccountField::Money => "money",
            AccountField::RemainingTime => "remainingTime",
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            AccountField::Money => "money",
            AccountField::RemainingTime => "remaining_time",
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account store.
///
/// Every call is a synchronous round-trip that may block or fail. Field
/// updates are independent: there is no multi-field transaction.
pub trait AccountStore: Send + Sync {
    /// Read an account. Fails with `StoreError::NotFound` if it does not exist.
    fn get(&self, user_id: &UserId) -> StoreResult<Account>;

    /// Overwrite one field. Negative values are rejected with
    /// `StoreError::InvalidValue` and leave the account unchanged.
    fn update(&self, user_id: &UserId, field: AccountField, value: i64) -> StoreResult<()>;

    /// Create an account with zero balances.
    fn create_account(&self, user_id: &UserId) -> StoreResult<Account>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
