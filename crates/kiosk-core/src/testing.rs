//! Test doubles that write every side effect to one shared journal, so
//! tests can assert the order in which the store, display and power
//! control were touched.

use async_trait::async_trait;
use kiosk_api::{ChargeReceipt, PurchaseReceipt};
use kiosk_config::PricingTable;
use kiosk_host_api::{MockPowerControl, PowerAction, PowerControl, PowerResult};
use kiosk_store::{
    Account, AccountField, AccountStore, SqliteAccountStore, StoreError, StoreResult,
};
use kiosk_util::UserId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::{CoreEvent, KioskEngine, KioskResult, Notifier, SessionTimer, TimerSettings};

pub type Journal = Arc<Mutex<Vec<String>>>;

fn record(journal: &Journal, entry: String) {
    journal.lock().unwrap().push(entry);
}

pub struct JournalStore {
    inner: SqliteAccountStore,
    journal: Journal,
    fail: AtomicBool,
}

impl JournalStore {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Database("store offline".into()));
        }
        Ok(())
    }
}

impl AccountStore for JournalStore {
    fn get(&self, user_id: &UserId) -> StoreResult<Account> {
        self.check()?;
        self.inner.get(user_id)
    }

    fn update(&self, user_id: &UserId, field: AccountField, value: i64) -> StoreResult<()> {
        self.check()?;
        self.inner.update(user_id, field, value)?;
        record(&self.journal, format!("update {} {}", field, value));
        Ok(())
    }

    fn create_account(&self, user_id: &UserId) -> StoreResult<Account> {
        self.check()?;
        self.inner.create_account(user_id)
    }

    fn is_healthy(&self) -> bool {
        !self.fail.load(Ordering::SeqCst) && self.inner.is_healthy()
    }
}

struct JournalPower {
    mock: MockPowerControl,
    journal: Journal,
}

#[async_trait]
impl PowerControl for JournalPower {
    fn action(&self) -> PowerAction {
        self.mock.action()
    }

    async fn shutdown_now(&self) -> PowerResult<()> {
        record(&self.journal, "shutdown".into());
        self.mock.shutdown_now().await
    }
}

struct JournalNotifier {
    journal: Journal,
}

impl Notifier for JournalNotifier {
    fn on_tick(&self, seconds_left: u64) {
        record(&self.journal, format!("tick {}", seconds_left));
    }

    fn on_expired(&self) {
        record(&self.journal, "expired".into());
    }

    fn on_purchase_result(&self, result: &KioskResult<PurchaseReceipt>) {
        let entry = match result {
            Ok(receipt) => format!("purchase ok {}", receipt.package),
            Err(e) => format!("purchase err {:?}", e.code()),
        };
        record(&self.journal, entry);
    }

    fn on_charge_result(&self, result: &KioskResult<ChargeReceipt>) {
        let entry = match result {
            Ok(receipt) => format!("charge ok {}", receipt.balance),
            Err(e) => format!("charge err {:?}", e.code()),
        };
        record(&self.journal, entry);
    }

    fn on_stopped(&self, result: &KioskResult<u64>) {
        let entry = match result {
            Ok(seconds_left) => format!("stopped {}", seconds_left),
            Err(e) => format!("stop err {:?}", e.code()),
        };
        record(&self.journal, entry);
    }

    fn release(&self) {
        record(&self.journal, "release".into());
    }
}

/// Engine wired to journaling doubles, for account "alice"
pub struct Harness {
    pub engine: KioskEngine,
    pub timer: SessionTimer,
    pub store: Arc<JournalStore>,
    pub power: MockPowerControl,
    pub events: mpsc::UnboundedReceiver<CoreEvent>,
    pub user_id: UserId,
    journal: Journal,
}

impl Harness {
    pub fn new(money: i64, remaining_time: i64) -> Self {
        Self::with_settings(money, remaining_time, TimerSettings::default())
    }

    pub fn with_settings(money: i64, remaining_time: i64, settings: TimerSettings) -> Self {
        let user_id = UserId::new("alice");
        let inner = SqliteAccountStore::in_memory().unwrap();
        inner.create_account(&user_id).unwrap();
        inner.update(&user_id, AccountField::Money, money).unwrap();
        inner
            .update(&user_id, AccountField::RemainingTime, remaining_time)
            .unwrap();

        let journal: Journal = Arc::default();
        let store = Arc::new(JournalStore {
            inner,
            journal: journal.clone(),
            fail: AtomicBool::new(false),
        });
        let power = MockPowerControl::new();

        let (engine, events) = KioskEngine::new(
            user_id.clone(),
            store.clone(),
            Arc::new(JournalPower {
                mock: power.clone(),
                journal: journal.clone(),
            }),
            Arc::new(JournalNotifier {
                journal: journal.clone(),
            }),
            PricingTable::default(),
            settings,
        );

        Self {
            timer: engine.timer().clone(),
            engine,
            store,
            power,
            events,
            user_id,
            journal,
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn stored_money(&self) -> u64 {
        self.store.inner.get(&self.user_id).unwrap().money
    }

    pub fn stored_remaining(&self) -> u64 {
        self.store.inner.get(&self.user_id).unwrap().remaining_time
    }
}
