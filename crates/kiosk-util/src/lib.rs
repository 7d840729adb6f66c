//! Shared utilities for kioskd
//!
//! This crate provides:
//! - ID types (UserId, SessionId, ClientId)
//! - Countdown formatting
//! - Rate limiting helpers
//! - Default paths for socket, config and data directories

mod ids;
mod paths;
mod rate_limit;
mod time;

pub use ids::*;
pub use paths::*;
pub use rate_limit::*;
pub use time::*;
