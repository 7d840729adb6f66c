//! Session timer and time-purchase engine for kioskd
//!
//! This crate is the heart of kioskd, containing:
//! - The countdown state machine (Idle -> Running -> Expiring, or Stopped)
//! - The session timer that ticks it and runs the expiry -> power-off sequence
//! - Money-for-time purchases against the account store
//! - The display notification port

mod engine;
mod error;
mod events;
mod notifier;
mod session;
mod timer;

#[cfg(test)]
mod testing;

pub use engine::*;
pub use error::*;
pub use events::*;
pub use notifier::*;
pub use session::*;
pub use timer::*;
