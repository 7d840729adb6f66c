//! Mock power control for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{PowerAction, PowerControl, PowerError, PowerResult};

/// Power control that records calls instead of turning anything off
#[derive(Debug, Clone, Default)]
pub struct MockPowerControl {
    action: PowerAction,
    calls: Arc<AtomicUsize>,

    /// Configure shutdown to fail
    pub fail_shutdown: Arc<AtomicBool>,
}

impl MockPowerControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: PowerAction) -> Self {
        self.action = action;
        self
    }

    /// Make every subsequent `shutdown_now` fail
    pub fn set_fail(&self, fail: bool) {
        self.fail_shutdown.store(fail, Ordering::SeqCst);
    }

    /// Number of times `shutdown_now` was invoked, failed calls included
    pub fn shutdown_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PowerControl for MockPowerControl {
    fn action(&self) -> PowerAction {
        self.action
    }

    async fn shutdown_now(&self) -> PowerResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_shutdown.load(Ordering::SeqCst) {
            return Err(PowerError::PermissionDenied("Mock shutdown failure".into()));
        }

        Ok(())
    }
}
