//! kioskctl - talk to a running kioskd

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kiosk_api::{Command, EventPayload, ResponsePayload, ServiceStateSnapshot};
use kiosk_ipc::IpcClient;
use kiosk_util::{default_socket_path, format_countdown};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// kioskctl - Command-line front end for kioskd
#[derive(Parser, Debug)]
#[command(name = "kioskctl")]
#[command(about = "Command-line front end for kioskd", long_about = None)]
struct Args {
    /// Socket path (or set KIOSK_SOCKET env var)
    #[arg(short, long, env = "KIOSK_SOCKET", default_value_os_t = default_socket_path())]
    socket: PathBuf,

    /// Print raw JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Show the countdown and balance
    State,
    /// List the packages for sale
    Packages,
    /// Buy time with the package named LABEL
    Purchase { label: String },
    /// Add money to the account (operator only)
    Charge {
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
    /// Save the remaining time and stop the countdown
    Stop,
    /// Follow the countdown until the service goes away
    Watch,
    /// Show service health
    Health,
}

fn print_state(state: &ServiceStateSnapshot) {
    println!("Account:   {}", state.user_id);
    println!("State:     {:?}", state.state);
    println!("Time left: {}", format_countdown(state.seconds_left));
    match state.money {
        Some(money) => println!("Balance:   {}", money),
        None => println!("Balance:   (unavailable)"),
    }
}

fn print_payload(payload: &ResponsePayload) {
    match payload {
        ResponsePayload::State(state) => print_state(state),
        ResponsePayload::Packages(packages) => {
            for package in packages {
                println!(
                    "{:<12} {:>9}  {}",
                    package.label,
                    format_countdown(package.seconds),
                    package.cost
                );
            }
        }
        ResponsePayload::Purchased(receipt) => {
            println!("{}", receipt.message());
            println!("Time left: {}", format_countdown(receipt.seconds_left));
        }
        ResponsePayload::Charged(receipt) => println!("{}", receipt.message()),
        ResponsePayload::Stopped { seconds_left } => {
            println!("Stopped with {} left", format_countdown(*seconds_left))
        }
        ResponsePayload::Health(health) => {
            println!("ready: {}", health.ready);
            println!("store: {}", if health.store_ok { "ok" } else { "unavailable" });
            println!(
                "power control: {}",
                if health.power_control_ok { "ok" } else { "unavailable" }
            );
        }
        other => debug!(payload = ?other, "Unhandled payload"),
    }
}

/// One line per event; returns false once the service is gone
fn print_event(payload: &EventPayload) -> bool {
    match payload {
        EventPayload::StateChanged(state) => {
            println!("{} ({:?})", format_countdown(state.seconds_left), state.state)
        }
        EventPayload::Tick { seconds_left } => println!("{}", format_countdown(*seconds_left)),
        EventPayload::Expired => println!("Time is up. The terminal will shut down."),
        EventPayload::PurchaseSucceeded { message, .. }
        | EventPayload::ChargeSucceeded { message, .. } => println!("{}", message),
        EventPayload::PurchaseFailed { error } | EventPayload::ChargeFailed { error } => {
            println!("{}", error.message)
        }
        EventPayload::StopFailed { error } => println!("Stop failed: {}", error.message),
        EventPayload::Stopped { seconds_left } => {
            println!("Stopped with {} left", format_countdown(*seconds_left))
        }
        EventPayload::PowerOffFailed { message } => println!("Power off failed: {}", message),
        EventPayload::Shutdown => {
            println!("Service shutting down");
            return false;
        }
    }
    true
}

async fn watch(client: IpcClient, json: bool) -> Result<()> {
    let mut events = client.subscribe().await.context("Failed to subscribe")?;

    loop {
        let event = match events.next().await {
            Ok(event) => event,
            Err(kiosk_ipc::IpcError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }
        if !print_event(&event.payload) {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut client = IpcClient::connect(&args.socket)
        .await
        .with_context(|| format!("Cannot connect to kioskd at {}", args.socket.display()))?;

    let command = match args.command {
        Action::State => Command::GetState,
        Action::Packages => Command::ListPackages,
        Action::Purchase { label } => Command::Purchase { package: label },
        Action::Charge { amount } => Command::Charge { amount },
        Action::Stop => Command::Stop,
        Action::Health => Command::GetHealth,
        Action::Watch => return watch(client, args.json).await,
    };

    match client.call(command).await {
        Ok(payload) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_payload(&payload);
            }
            Ok(())
        }
        Err(kiosk_ipc::IpcError::Rejected(error)) => {
            bail!("{} ({:?})", error.message, error.code)
        }
        Err(e) => Err(e.into()),
    }
}
