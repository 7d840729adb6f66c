//! Account store for kioskd
//!
//! Holds the two durable balances of every account:
//! - `money`, in currency units
//! - `remainingTime`, in seconds, as last flushed by the session timer
//!
//! Only current balances are kept; there is no transaction history.

mod sqlite;
mod traits;

pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Invalid value {value} for {field}")]
    InvalidValue { field: AccountField, value: i64 },

    #[error("Account already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
