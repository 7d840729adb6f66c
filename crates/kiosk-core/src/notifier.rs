//! Outbound display notifications

use kiosk_api::{ChargeReceipt, PurchaseReceipt};

use crate::KioskResult;

/// Receives display notifications from the core.
///
/// One-way: implementations render or forward and return immediately.
/// `on_tick` and `on_expired` run while the timer holds its lock, so an
/// implementation must not call back into the timer.
pub trait Notifier: Send + Sync {
    fn on_tick(&self, seconds_left: u64);

    fn on_expired(&self);

    fn on_purchase_result(&self, result: &KioskResult<PurchaseReceipt>);

    fn on_charge_result(&self, result: &KioskResult<ChargeReceipt>);

    /// Outcome of stopping the countdown: the seconds saved, or why saving failed
    fn on_stopped(&self, _result: &KioskResult<u64>) {}

    /// Tear down display resources before power-off
    fn release(&self) {}
}

/// Notifier that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn on_tick(&self, _seconds_left: u64) {}
    fn on_expired(&self) {}
    fn on_purchase_result(&self, _result: &KioskResult<PurchaseReceipt>) {}
    fn on_charge_result(&self, _result: &KioskResult<ChargeReceipt>) {}
}
