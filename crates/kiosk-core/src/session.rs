//! Session countdown state machine
//!
//! Pure bookkeeping: no clocks, no I/O. [`crate::SessionTimer`] drives it.
//!
//! ```text
//! Idle --start(n>0)--> Running --tick(0)--> Expiring
//!   ^                   |   ^
//!   |                 stop  credit
//!   +--- credit(0) -- Stopped
//! ```

use kiosk_api::TimerState;

use crate::{KioskError, KioskResult};

/// What a tick did to the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with this many seconds left
    Continue(u64),
    /// Reached zero; the session is now `Expiring`
    Expired,
    /// Not running; nothing changed
    Ignored,
}

/// Live countdown of one terminal
#[derive(Debug, Clone)]
pub struct Session {
    seconds_left: u64,
    state: TimerState,
}

impl Session {
    pub fn new() -> Self {
        Self {
            seconds_left: 0,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    /// Load a countdown. Returns true if a clock should now be running.
    ///
    /// Once expiring, the session can no longer be restarted.
    pub fn start(&mut self, initial_seconds: u64) -> bool {
        if self.state == TimerState::Expiring {
            return false;
        }

        self.seconds_left = initial_seconds;
        self.state = if initial_seconds > 0 {
            TimerState::Running
        } else {
            TimerState::Idle
        };
        self.state.is_running()
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }

        self.seconds_left = self.seconds_left.saturating_sub(1);
        if self.seconds_left > 0 {
            TickOutcome::Continue(self.seconds_left)
        } else {
            self.state = TimerState::Expiring;
            TickOutcome::Expired
        }
    }

    /// Add time. Returns true if the clock must be (re)started.
    ///
    /// A running clock keeps its phase; only the counted value grows.
    pub fn credit(&mut self, seconds: u64) -> KioskResult<bool> {
        if self.state == TimerState::Expiring {
            return Err(KioskError::SessionExpiring);
        }

        self.seconds_left = self.seconds_left.saturating_add(seconds);

        match self.state {
            TimerState::Idle | TimerState::Stopped if self.seconds_left > 0 => {
                self.state = TimerState::Running;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Stop the countdown. Returns the value to persist, or None if there
    /// is nothing to do (already stopped, or expiring).
    pub fn stop(&mut self) -> Option<u64> {
        match self.state {
            TimerState::Running | TimerState::Idle => {
                self.state = TimerState::Stopped;
                Some(self.seconds_left)
            }
            TimerState::Stopped | TimerState::Expiring => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
