//! Linux host adapter for kioskd
//!
//! Provides power control by running a configurable command
//! (`systemctl poweroff` unless told otherwise), after flushing filesystem
//! buffers so the last account write survives the power cut.

mod power;

pub use power::*;
