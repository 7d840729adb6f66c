//! Integration tests for kioskd
//!
//! These wire the real config parser, SQLite account store and kiosk engine
//! together with a mock power control.

use kiosk_api::{ChargeReceipt, PurchaseReceipt, TimerState};
use kiosk_config::parse_config;
use kiosk_core::{KioskEngine, KioskError, KioskResult, Notifier, TimerSettings};
use kiosk_host_api::MockPowerControl;
use kiosk_store::{AccountField, AccountStore, SqliteAccountStore};
use kiosk_util::UserId;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn on_tick(&self, _seconds_left: u64) {}

    fn on_expired(&self) {
        self.messages.lock().unwrap().push("Time is up.".into());
    }

    fn on_purchase_result(&self, result: &KioskResult<PurchaseReceipt>) {
        let message = match result {
            Ok(receipt) => receipt.message(),
            Err(e) => e.to_string(),
        };
        self.messages.lock().unwrap().push(message);
    }

    fn on_charge_result(&self, result: &KioskResult<ChargeReceipt>) {
        let message = match result {
            Ok(receipt) => receipt.message(),
            Err(e) => e.to_string(),
        };
        self.messages.lock().unwrap().push(message);
    }
}

struct Terminal {
    engine: KioskEngine,
    store: Arc<SqliteAccountStore>,
    power: MockPowerControl,
    notifier: Arc<RecordingNotifier>,
    user_id: UserId,
}

fn make_test_config() -> kiosk_config::KioskConfig {
    parse_config(
        r#"
        config_version = 1

        [service]
        user_id = "terminal-07"

        [[packages]]
        label = "10 minutes"
        seconds = 600
        cost = 300

        [[packages]]
        label = "1 hour"
        seconds = 3600
        cost = 1500
        "#,
    )
    .unwrap()
}

fn open_terminal(db_path: &Path, money: Option<i64>) -> Terminal {
    let config = make_test_config();
    let user_id = config.service.user_id.clone().unwrap();

    let store = Arc::new(SqliteAccountStore::open(db_path).unwrap());
    if let Some(money) = money {
        store.create_account(&user_id).unwrap();
        store.update(&user_id, AccountField::Money, money).unwrap();
    }

    let power = MockPowerControl::new();
    let notifier = Arc::new(RecordingNotifier::default());

    let (engine, _events) = KioskEngine::new(
        user_id.clone(),
        store.clone(),
        Arc::new(power.clone()),
        notifier.clone(),
        config.pricing.clone(),
        TimerSettings::from_config(&config.service),
    );

    Terminal {
        engine,
        store,
        power,
        notifier,
        user_id,
    }
}

#[test]
fn test_config_pricing_table() {
    let config = make_test_config();
    assert_eq!(config.pricing.len(), 2);
    assert!(config.pricing.get("35 minutes").is_none());
    assert_eq!(config.pricing.get("1 hour").unwrap().seconds, 3600);
}

#[tokio::test(start_paused = true)]
async fn test_purchase_with_configured_package() {
    let dir = tempfile::tempdir().unwrap();
    let t = open_terminal(&dir.path().join("kioskd.db"), Some(2000));

    t.engine.resume().unwrap();
    let receipt = t.engine.purchase("1 hour").unwrap();

    assert_eq!(receipt.money_left, 500);
    assert_eq!(t.engine.timer().state(), TimerState::Running);
    assert_eq!(t.store.get(&t.user_id).unwrap().money, 500);
    assert_eq!(t.notifier.messages(), ["Added 60 minutes for 1500."]);

    // The default table is replaced, not extended.
    assert!(matches!(
        t.engine.purchase("2 hours"),
        Err(KioskError::InvalidPackage(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_remaining_time_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("kioskd.db");

    {
        let t = open_terminal(&db_path, Some(300));
        t.engine.resume().unwrap();
        t.engine.purchase("10 minutes").unwrap();

        tokio::time::sleep(Duration::from_millis(100_500)).await;
        t.engine.stop().unwrap();
        assert_eq!(t.store.get(&t.user_id).unwrap().remaining_time, 500);
    }

    let t = open_terminal(&db_path, None);
    assert_eq!(t.engine.resume().unwrap(), 500);
    assert_eq!(t.engine.timer().state(), TimerState::Running);
    assert_eq!(t.engine.snapshot().money, Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_expiry_powers_off() {
    let dir = tempfile::tempdir().unwrap();
    let t = open_terminal(&dir.path().join("kioskd.db"), Some(0));
    t.store
        .update(&t.user_id, AccountField::RemainingTime, 3)
        .unwrap();

    t.engine.resume().unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(t.engine.timer().state(), TimerState::Expiring);
    assert_eq!(t.power.shutdown_calls(), 0);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(t.power.shutdown_calls(), 1);
    assert_eq!(t.store.get(&t.user_id).unwrap().remaining_time, 0);
    assert_eq!(t.notifier.messages(), ["Time is up."]);
}

#[tokio::test(start_paused = true)]
async fn test_charge_then_purchase() {
    let dir = tempfile::tempdir().unwrap();
    let t = open_terminal(&dir.path().join("kioskd.db"), Some(0));
    t.engine.resume().unwrap();

    assert!(matches!(
        t.engine.purchase("10 minutes"),
        Err(KioskError::InsufficientFunds { balance: 0, cost: 300 })
    ));

    let receipt = t.engine.charge(&t.user_id, 300).unwrap();
    assert_eq!(receipt.balance, 300);

    let receipt = t.engine.purchase("10 minutes").unwrap();
    assert_eq!(receipt.seconds_left, 600);
    assert_eq!(t.engine.timer().state(), TimerState::Running);

    let messages = t.notifier.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], "Charged 300. New balance: 300.");
    assert_eq!(messages[2], "Added 10 minutes for 300.");
}

#[tokio::test(start_paused = true)]
async fn test_health_reports_store_and_power() {
    let dir = tempfile::tempdir().unwrap();
    let t = open_terminal(&dir.path().join("kioskd.db"), Some(0));

    let health = t.engine.health();
    assert!(health.live);
    assert!(health.ready);
    assert!(health.store_ok);
    assert!(health.power_control_ok);
}
