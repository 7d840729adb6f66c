//! Host adapter trait interfaces for kioskd
//!
//! This crate defines the capability-based interface between the session
//! core and the platform: today that is only power control. It contains no
//! platform code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
