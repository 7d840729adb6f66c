//! Kiosk engine: time purchases, money charges and the state snapshot

use kiosk_api::{
    ChargeReceipt, HealthStatus, PackageView, PurchaseReceipt, ServiceStateSnapshot, TimerState,
    API_VERSION,
};
use kiosk_config::PricingTable;
use kiosk_host_api::PowerControl;
use kiosk_store::{AccountField, AccountStore};
use kiosk_util::UserId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::{CoreEvent, KioskError, KioskResult, Notifier, SessionTimer, TimerSettings};

/// The kiosk engine for one terminal and its bound account
pub struct KioskEngine {
    user_id: UserId,
    store: Arc<dyn AccountStore>,
    power: Arc<dyn PowerControl>,
    notifier: Arc<dyn Notifier>,
    pricing: PricingTable,
    timer: SessionTimer,
}

impl KioskEngine {
    /// Create a new engine. The returned channel carries expiry and
    /// power-off outcomes.
    pub fn new(
        user_id: UserId,
        store: Arc<dyn AccountStore>,
        power: Arc<dyn PowerControl>,
        notifier: Arc<dyn Notifier>,
        pricing: PricingTable,
        settings: TimerSettings,
    ) -> (Self, mpsc::UnboundedReceiver<CoreEvent>) {
        let (timer, events) = SessionTimer::new(
            user_id.clone(),
            store.clone(),
            power.clone(),
            notifier.clone(),
            settings,
        );

        info!(
            user_id = %user_id,
            package_count = pricing.len(),
            "Kiosk engine initialized"
        );

        (
            Self {
                user_id,
                store,
                power,
                notifier,
                pricing,
                timer,
            },
            events,
        )
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Resume the countdown from the account's stored remaining time
    pub fn resume(&self) -> KioskResult<u64> {
        let account = self.store.get(&self.user_id)?;
        self.timer.start(account.remaining_time);
        Ok(account.remaining_time)
    }

    /// Convert money into time with the package named `label`.
    ///
    /// The debit is committed before the countdown is credited. If the
    /// credit is then refused the user has paid without receiving time;
    /// nothing is retried or refunded.
    pub fn purchase(&self, label: &str) -> KioskResult<PurchaseReceipt> {
        let result = self.try_purchase(label);

        match &result {
            Ok(receipt) => info!(
                user_id = %self.user_id,
                package = %receipt.package,
                cost = receipt.cost,
                money_left = receipt.money_left,
                seconds_left = receipt.seconds_left,
                "Time purchased"
            ),
            Err(e) => warn!(user_id = %self.user_id, package = label, error = %e, "Purchase rejected"),
        }

        self.notifier.on_purchase_result(&result);
        result
    }

    fn try_purchase(&self, label: &str) -> KioskResult<PurchaseReceipt> {
        if self.timer.state() == TimerState::Expiring {
            return Err(KioskError::SessionExpiring);
        }

        let package = self
            .pricing
            .get(label)
            .ok_or_else(|| KioskError::InvalidPackage(label.trim().to_string()))?;

        let account = self.store.get(&self.user_id)?;
        if account.money < package.cost {
            return Err(KioskError::InsufficientFunds {
                balance: account.money,
                cost: package.cost,
            });
        }

        let money_left = account.money - package.cost;
        self.store.update(
            &self.user_id,
            AccountField::Money,
            i64::try_from(money_left).unwrap_or(i64::MAX),
        )?;

        let seconds_left = self.timer.credit(package.seconds).inspect_err(|e| {
            error!(
                user_id = %self.user_id,
                cost = package.cost,
                error = %e,
                "Account debited but time not credited"
            );
        })?;

        Ok(PurchaseReceipt {
            package: package.label.clone(),
            seconds_added: package.seconds,
            cost: package.cost,
            money_left,
            seconds_left,
        })
    }

    /// Add `amount` to an account's money. Does not touch the countdown.
    pub fn charge(&self, user_id: &UserId, amount: i64) -> KioskResult<ChargeReceipt> {
        let result = self.try_charge(user_id, amount);

        match &result {
            Ok(receipt) => info!(
                user_id = %user_id,
                amount = receipt.amount,
                balance = receipt.balance,
                "Account charged"
            ),
            Err(e) => warn!(user_id = %user_id, amount, error = %e, "Charge rejected"),
        }

        self.notifier.on_charge_result(&result);
        result
    }

    fn try_charge(&self, user_id: &UserId, amount: i64) -> KioskResult<ChargeReceipt> {
        let amount = u64::try_from(amount)
            .map_err(|_| KioskError::InvalidAmount(format!("{} is negative", amount)))?;

        let account = self.store.get(user_id)?;
        let balance = account
            .money
            .checked_add(amount)
            .filter(|b| i64::try_from(*b).is_ok())
            .ok_or_else(|| KioskError::InvalidAmount(format!("{} overflows the balance", amount)))?;

        self.store.update(
            user_id,
            AccountField::Money,
            i64::try_from(balance).unwrap_or(i64::MAX),
        )?;

        Ok(ChargeReceipt { amount, balance })
    }

    /// Save the remaining time and stop the countdown
    pub fn stop(&self) -> KioskResult<()> {
        self.timer.stop()
    }

    pub fn packages(&self) -> Vec<PackageView> {
        self.pricing.views()
    }

    /// Current state; `money` is None if the store cannot be read
    pub fn snapshot(&self) -> ServiceStateSnapshot {
        let money = match self.store.get(&self.user_id) {
            Ok(account) => Some(account.money),
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Could not read balance");
                None
            }
        };

        ServiceStateSnapshot {
            api_version: API_VERSION,
            user_id: self.user_id.clone(),
            state: self.timer.state(),
            seconds_left: self.timer.seconds_left(),
            money,
        }
    }

    pub fn health(&self) -> HealthStatus {
        let store_ok = self.store.is_healthy();
        HealthStatus {
            live: true,
            ready: store_ok && self.timer.state() != TimerState::Expiring,
            store_ok,
            power_control_ok: self.power.is_healthy(),
        }
    }
}
