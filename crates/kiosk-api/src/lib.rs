//! Protocol types for kioskd IPC
//!
//! This crate defines the stable API between kioskd and its front ends:
//! - Commands (requests from clients)
//! - Responses
//! - Events (service -> clients), the wire form of the display notifications
//! - Versioning

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
