//! Session timer: drives the countdown clock and the expiry sequence

use kiosk_api::TimerState;
use kiosk_config::ServiceConfig;
use kiosk_host_api::PowerControl;
use kiosk_store::{AccountField, AccountStore};
use kiosk_util::{SessionId, UserId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::{CoreEvent, KioskError, KioskResult, Notifier, Session, TickOutcome};

/// Timing parameters of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    /// Period of one countdown step (one second of purchased time)
    pub tick_interval: Duration,
    /// Pause between the expiry notice and power-off
    pub grace_delay: Duration,
}

impl TimerSettings {
    pub fn from_config(service: &ServiceConfig) -> Self {
        Self {
            tick_interval: service.tick_interval,
            grace_delay: service.grace_delay,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            grace_delay: Duration::from_secs(1),
        }
    }
}

/// Owner of the live countdown.
///
/// Ticks only touch memory. The account store is written on `stop()` and
/// once more at expiry, right before power-off. Cloning yields another
/// handle to the same countdown.
#[derive(Clone)]
pub struct SessionTimer {
    shared: Arc<Shared>,
}

struct Shared {
    user_id: UserId,
    store: Arc<dyn AccountStore>,
    power: Arc<dyn PowerControl>,
    notifier: Arc<dyn Notifier>,
    settings: TimerSettings,
    events: mpsc::UnboundedSender<CoreEvent>,
    inner: Mutex<Inner>,
}

struct Inner {
    session: Session,
    clock: Option<JoinHandle<()>>,
    /// Bumped whenever the clock is cancelled; a clock task that sees a
    /// different value has been superseded.
    generation: u64,
    run_id: SessionId,
}

impl SessionTimer {
    pub fn new(
        user_id: UserId,
        store: Arc<dyn AccountStore>,
        power: Arc<dyn PowerControl>,
        notifier: Arc<dyn Notifier>,
        settings: TimerSettings,
    ) -> (Self, mpsc::UnboundedReceiver<CoreEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let shared = Shared {
            user_id,
            store,
            power,
            notifier,
            settings,
            events: tx,
            inner: Mutex::new(Inner {
                session: Session::new(),
                clock: None,
                generation: 0,
                run_id: SessionId::new(),
            }),
        };

        (
            Self {
                shared: Arc::new(shared),
            },
            rx,
        )
    }

    pub fn user_id(&self) -> &UserId {
        &self.shared.user_id
    }

    pub fn state(&self) -> TimerState {
        self.shared.lock().session.state()
    }

    pub fn seconds_left(&self) -> u64 {
        self.shared.lock().session.seconds_left()
    }

    /// Load `initial_seconds` and start ticking if it is non-zero.
    ///
    /// Any clock already running is cancelled and replaced.
    pub fn start(&self, initial_seconds: u64) -> TimerState {
        let mut inner = self.shared.lock();

        if inner.session.state() == TimerState::Expiring {
            warn!("Ignoring start while expiring");
            return TimerState::Expiring;
        }

        cancel_clock(&mut inner);
        if inner.session.start(initial_seconds) {
            self.spawn_clock(&mut inner);
            info!(
                user_id = %self.shared.user_id,
                session_id = %inner.run_id,
                seconds_left = initial_seconds,
                "Session timer started"
            );
        } else {
            info!(user_id = %self.shared.user_id, "No time left; timer idle");
        }

        inner.session.state()
    }

    /// Add purchased time. Returns the new countdown value.
    pub fn credit(&self, seconds: u64) -> KioskResult<u64> {
        let mut inner = self.shared.lock();

        if inner.session.credit(seconds)? {
            self.spawn_clock(&mut inner);
            info!(
                user_id = %self.shared.user_id,
                session_id = %inner.run_id,
                seconds_left = inner.session.seconds_left(),
                "Session timer restarted by credit"
            );
        }

        debug!(seconds, seconds_left = inner.session.seconds_left(), "Time credited");
        Ok(inner.session.seconds_left())
    }

    /// Save the remaining time and cancel the clock.
    ///
    /// Safe to call repeatedly and from a termination handler racing with a
    /// tick: only the first call persists, and no tick is observed after it
    /// returns. A no-op while expiring.
    pub fn stop(&self) -> KioskResult<()> {
        let to_persist = {
            let mut inner = self.shared.lock();
            let value = inner.session.stop();
            if value.is_some() {
                cancel_clock(&mut inner);
            }
            value
        };

        let Some(seconds_left) = to_persist else {
            debug!("Timer already stopped");
            return Ok(());
        };

        let value = i64::try_from(seconds_left).unwrap_or(i64::MAX);
        let result = self
            .shared
            .store
            .update(&self.shared.user_id, AccountField::RemainingTime, value)
            .map(|()| seconds_left)
            .map_err(KioskError::from);

        match &result {
            Ok(_) => info!(user_id = %self.shared.user_id, seconds_left, "Session stopped and saved"),
            Err(e) => {
                error!(user_id = %self.shared.user_id, error = %e, "Failed to save remaining time")
            }
        }
        self.shared.notifier.on_stopped(&result);
        result.map(|_| ())
    }

    fn spawn_clock(&self, inner: &mut Inner) {
        cancel_clock(inner);
        inner.run_id = SessionId::new();

        let shared = Arc::clone(&self.shared);
        let generation = inner.generation;
        inner.clock = Some(tokio::spawn(run_clock(shared, generation)));
    }
}

fn cancel_clock(inner: &mut Inner) {
    inner.generation = inner.generation.wrapping_add(1);
    if let Some(clock) = inner.clock.take() {
        clock.abort();
    }
}

async fn run_clock(shared: Arc<Shared>, generation: u64) {
    let period = shared.settings.tick_interval;
    let mut interval = time::interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;
        match shared.tick(generation) {
            TickOutcome::Continue(_) => {}
            TickOutcome::Expired => break,
            TickOutcome::Ignored => return,
        }
    }

    shared.expire().await;
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self, generation: u64) -> TickOutcome {
        let mut inner = self.lock();
        if inner.generation != generation {
            return TickOutcome::Ignored;
        }

        let outcome = inner.session.tick();
        match outcome {
            TickOutcome::Continue(seconds_left) => {
                debug!(seconds_left, "Tick");
                self.notifier.on_tick(seconds_left);
            }
            TickOutcome::Expired => {
                info!(
                    user_id = %self.user_id,
                    session_id = %inner.run_id,
                    "Session time expired"
                );
                self.notifier.on_expired();
                let _ = self.events.send(CoreEvent::Expired);
            }
            TickOutcome::Ignored => {}
        }
        outcome
    }

    /// Terminal: runs once, cannot be cancelled.
    async fn expire(&self) {
        time::sleep(self.settings.grace_delay).await;

        match self
            .store
            .update(&self.user_id, AccountField::RemainingTime, 0)
        {
            Ok(()) => debug!(user_id = %self.user_id, "Remaining time cleared"),
            Err(e) => error!(
                user_id = %self.user_id,
                error = %e,
                "Failed to clear remaining time; shutting down anyway"
            ),
        }

        self.notifier.release();

        let action = self.power.action();
        info!(action = action.as_str(), "Shutting down host");

        match self.power.shutdown_now().await {
            Ok(()) => {
                let _ = self.events.send(CoreEvent::ShutdownInvoked { action });
            }
            Err(e) => {
                let err = KioskError::from(e);
                error!(error = %err, "Power control failed");
                let _ = self.events.send(CoreEvent::ShutdownFailed {
                    message: err.to_string(),
                });
            }
        }
    }
}
