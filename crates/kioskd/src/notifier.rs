//! Display notifications forwarded to subscribed IPC clients

use kiosk_api::{ChargeReceipt, Event, EventPayload, PurchaseReceipt};
use kiosk_core::{KioskResult, Notifier};
use kiosk_ipc::IpcServer;
use std::sync::Arc;

/// Turns core notifications into IPC events
pub struct IpcNotifier {
    ipc: Arc<IpcServer>,
}

impl IpcNotifier {
    pub fn new(ipc: Arc<IpcServer>) -> Self {
        Self { ipc }
    }

    fn send(&self, payload: EventPayload) {
        self.ipc.broadcast_event(Event::new(payload));
    }
}

impl Notifier for IpcNotifier {
    fn on_tick(&self, seconds_left: u64) {
        self.send(EventPayload::Tick { seconds_left });
    }

    fn on_expired(&self) {
        self.send(EventPayload::Expired);
    }

    fn on_purchase_result(&self, result: &KioskResult<PurchaseReceipt>) {
        self.send(match result {
            Ok(receipt) => EventPayload::PurchaseSucceeded {
                message: receipt.message(),
                receipt: receipt.clone(),
            },
            Err(e) => EventPayload::PurchaseFailed {
                error: e.to_error_info(),
            },
        });
    }

    fn on_charge_result(&self, result: &KioskResult<ChargeReceipt>) {
        self.send(match result {
            Ok(receipt) => EventPayload::ChargeSucceeded {
                message: receipt.message(),
                receipt: receipt.clone(),
            },
            Err(e) => EventPayload::ChargeFailed {
                error: e.to_error_info(),
            },
        });
    }

    fn on_stopped(&self, result: &KioskResult<u64>) {
        self.send(match result {
            Ok(seconds_left) => EventPayload::Stopped {
                seconds_left: *seconds_left,
            },
            Err(e) => EventPayload::StopFailed {
                error: e.to_error_info(),
            },
        });
    }

    // Front ends close their windows on Shutdown.
    fn release(&self) {
        self.send(EventPayload::Shutdown);
    }
}
