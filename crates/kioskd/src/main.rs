//! kioskd - The kiosk session service
//!
//! This is the main entry point for the kioskd service.
//! It wires together all the components:
//! - Configuration loading
//! - Account store
//! - Kiosk engine and session timer
//! - Power control (Linux)
//! - IPC server

mod notifier;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kiosk_api::{
    ClientRole, Command, ErrorCode, ErrorInfo, Event, EventPayload, Response, ResponsePayload,
};
use kiosk_config::{load_config, KioskConfig};
use kiosk_core::{CoreEvent, KioskEngine, TimerSettings};
use kiosk_host_api::PowerControl;
use kiosk_host_linux::LinuxPowerControl;
use kiosk_ipc::{IpcServer, ServerMessage};
use kiosk_store::{AccountStore, SqliteAccountStore, StoreError};
use kiosk_util::{default_config_path, format_countdown, ClientId, RateLimiter, UserId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::notifier::IpcNotifier;

/// kioskd - Pay-per-time session control for shared terminals
#[derive(Parser, Debug)]
#[command(name = "kioskd")]
#[command(about = "Pay-per-time session control for shared terminals", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/kioskd/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set KIOSK_SOCKET env var)
    #[arg(short, long, env = "KIOSK_SOCKET")]
    socket: Option<PathBuf>,

    /// Data directory override (or set KIOSK_DATA_DIR env var)
    #[arg(short, long, env = "KIOSK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Account bound to this terminal (or set KIOSK_USER env var)
    #[arg(short, long, env = "KIOSK_USER")]
    user: Option<String>,

    /// Create the account with zero balances if it does not exist
    #[arg(long)]
    create_account: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    engine: Arc<KioskEngine>,
    core_events: mpsc::UnboundedReceiver<CoreEvent>,
    ipc: Arc<IpcServer>,
    rate_limiter: RateLimiter<ClientId>,
}

/// Saves the countdown if the service loop unwinds without reaching the
/// orderly shutdown path.
struct StopGuard(Arc<KioskEngine>);

impl Drop for StopGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.stop() {
            error!(error = %e, "Failed to save remaining time on exit");
        }
    }
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        let config = if args.config.exists() {
            let config = load_config(&args.config)
                .with_context(|| format!("Failed to load config from {:?}", args.config))?;
            info!(
                config_path = %args.config.display(),
                package_count = config.pricing.len(),
                "Configuration loaded"
            );
            config
        } else {
            warn!(
                config_path = %args.config.display(),
                "Config file not found, using defaults"
            );
            KioskConfig::default()
        };

        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| config.service.socket_path.clone());

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| config.service.data_dir.clone());

        let user_id = match args.user.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => UserId::new(user),
            _ => match &config.service.user_id {
                Some(user) => user.clone(),
                None => bail!("No account bound to this terminal: set service.user_id or --user"),
            },
        };

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join("kioskd.db");
        let store = SqliteAccountStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;
        info!(db_path = %db_path.display(), "Store initialized");

        if args.create_account {
            match store.create_account(&user_id) {
                Ok(_) => info!(user_id = %user_id, "Account created"),
                Err(StoreError::AlreadyExists(_)) => {
                    debug!(user_id = %user_id, "Account already exists")
                }
                Err(e) => return Err(e).context("Failed to create account"),
            }
        }

        // The terminal cannot be used without an account.
        let account = store.get(&user_id).with_context(|| {
            format!(
                "Cannot load account {:?} (use --create-account to create it)",
                user_id.as_str()
            )
        })?;

        let power: Arc<dyn PowerControl> = Arc::new(match &config.power.command {
            Some(command) => LinuxPowerControl::with_command(config.power.action, command.clone()),
            None => LinuxPowerControl::new(config.power.action),
        });
        if !power.is_healthy() {
            warn!(action = power.action().as_str(), "Power command not found; expiry cannot power off");
        }

        let mut ipc = IpcServer::new(&socket_path);
        ipc.start().await?;
        let ipc = Arc::new(ipc);

        let (engine, core_events) = KioskEngine::new(
            user_id.clone(),
            Arc::new(store),
            power,
            Arc::new(IpcNotifier::new(ipc.clone())),
            config.pricing.clone(),
            TimerSettings::from_config(&config.service),
        );

        let remaining = engine.resume().context("Failed to resume session")?;
        info!(
            user_id = %user_id,
            money = account.money,
            remaining = %format_countdown(remaining),
            "Session resumed"
        );

        // Rate limiter: 30 requests per second per client
        let rate_limiter = RateLimiter::new(30, Duration::from_secs(1));

        Ok(Self {
            engine: Arc::new(engine),
            core_events,
            ipc,
            rate_limiter,
        })
    }

    async fn run(mut self) -> Result<()> {
        let _stop_guard = StopGuard(self.engine.clone());

        let mut ipc_messages = self
            .ipc
            .take_message_receiver()
            .await
            .context("IPC message receiver already taken")?;

        let ipc_accept = self.ipc.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup())
            .context("Failed to create SIGHUP handler")?;

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                Some(event) = self.core_events.recv() => {
                    self.handle_core_event(event);
                }

                Some(msg) = ipc_messages.recv() => {
                    self.handle_ipc_message(msg).await;
                }
            }
        }

        info!("Shutting down kioskd");

        // Must run before any other cleanup.
        if let Err(e) = self.engine.stop() {
            error!(error = %e, "Failed to save remaining time");
        }

        self.ipc.broadcast_event(Event::new(EventPayload::Shutdown));
        self.ipc.shutdown();

        info!("Shutdown complete");
        Ok(())
    }

    fn handle_core_event(&self, event: CoreEvent) {
        match event {
            CoreEvent::Expired => {
                info!(user_id = %self.engine.user_id(), "Time expired, powering off after grace delay");
            }
            CoreEvent::ShutdownInvoked { action } => {
                info!(action = action.as_str(), "Power control accepted; waiting for the host to go down");
            }
            CoreEvent::ShutdownFailed { message } => {
                error!(message = %message, "Host did not power off; terminal stays locked");
                self.ipc
                    .broadcast_event(Event::new(EventPayload::PowerOffFailed { message }));
            }
        }
    }

    async fn handle_ipc_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Request { client_id, request } => {
                if !self.rate_limiter.check(&client_id) {
                    warn!(client_id = %client_id, "Rate limit exceeded");
                    let response = Response::error(
                        request.request_id,
                        ErrorInfo::new(ErrorCode::RateLimited, "Too many requests"),
                    );
                    let _ = self.ipc.send_response(&client_id, response).await;
                    return;
                }

                let response = self
                    .handle_command(&client_id, request.request_id, request.command)
                    .await;

                if let Err(e) = self.ipc.send_response(&client_id, response).await {
                    debug!(client_id = %client_id, error = %e, "Could not deliver response");
                }
            }

            ServerMessage::ClientConnected { client_id, info } => {
                info!(
                    client_id = %client_id,
                    role = ?info.role,
                    uid = ?info.uid,
                    "Client connected"
                );
            }

            ServerMessage::ClientDisconnected { client_id } => {
                debug!(client_id = %client_id, "Client disconnected");
                self.rate_limiter.remove(&client_id);
            }
        }
    }

    /// Reject the command unless the client's role passes `allowed`
    async fn authorize(
        &self,
        client_id: &ClientId,
        request_id: u64,
        allowed: fn(&ClientRole) -> bool,
    ) -> Option<Response> {
        let role = self.ipc.get_client_info(client_id).await.map(|info| info.role);
        match role {
            Some(role) if allowed(&role) => None,
            _ => {
                warn!(client_id = %client_id, role = ?role, "Permission denied");
                Some(Response::error(
                    request_id,
                    ErrorInfo::new(ErrorCode::PermissionDenied, "Not allowed for this client"),
                ))
            }
        }
    }

    async fn handle_command(
        &self,
        client_id: &ClientId,
        request_id: u64,
        command: Command,
    ) -> Response {
        let engine = &self.engine;

        match command {
            Command::GetState => {
                Response::success(request_id, ResponsePayload::State(engine.snapshot()))
            }

            Command::ListPackages => {
                Response::success(request_id, ResponsePayload::Packages(engine.packages()))
            }

            Command::Purchase { package } => {
                if let Some(denied) = self
                    .authorize(client_id, request_id, ClientRole::can_purchase)
                    .await
                {
                    return denied;
                }

                match engine.purchase(&package) {
                    Ok(receipt) => Response::success(request_id, ResponsePayload::Purchased(receipt)),
                    Err(e) => Response::error(request_id, e.to_error_info()),
                }
            }

            Command::Charge { amount } => {
                if let Some(denied) = self
                    .authorize(client_id, request_id, ClientRole::can_charge)
                    .await
                {
                    return denied;
                }

                match engine.charge(engine.user_id(), amount) {
                    Ok(receipt) => Response::success(request_id, ResponsePayload::Charged(receipt)),
                    Err(e) => Response::error(request_id, e.to_error_info()),
                }
            }

            Command::Stop => {
                if let Some(denied) = self
                    .authorize(client_id, request_id, ClientRole::can_stop)
                    .await
                {
                    return denied;
                }

                match engine.stop() {
                    Ok(()) => Response::success(
                        request_id,
                        ResponsePayload::Stopped {
                            seconds_left: engine.timer().seconds_left(),
                        },
                    ),
                    Err(e) => Response::error(request_id, e.to_error_info()),
                }
            }

            Command::SubscribeEvents => {
                // Give the new subscriber a starting point.
                self.ipc
                    .broadcast_event(Event::new(EventPayload::StateChanged(engine.snapshot())));
                Response::success(
                    request_id,
                    ResponsePayload::Subscribed {
                        client_id: client_id.clone(),
                    },
                )
            }

            Command::UnsubscribeEvents => {
                Response::success(request_id, ResponsePayload::Unsubscribed)
            }

            Command::GetHealth => {
                Response::success(request_id, ResponsePayload::Health(engine.health()))
            }

            Command::Ping => Response::success(request_id, ResponsePayload::Pong),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "kioskd starting");

    let service = Service::new(&args).await?;
    service.run().await
}
