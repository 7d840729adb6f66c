//! Config validation CLI tool
//!
//! Validates a kioskd configuration file and reports any errors.

use kiosk_util::{default_config_path, format_countdown};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a kioskd configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match kiosk_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", kiosk_config::CURRENT_CONFIG_VERSION);
            println!("  Socket: {}", config.service.socket_path.display());
            println!("  Data dir: {}", config.service.data_dir.display());
            match &config.service.user_id {
                Some(user) => println!("  Account: {}", user),
                None => println!("  Account: (set with --user)"),
            }
            println!("  Tick interval: {:?}", config.service.tick_interval);
            println!("  Grace delay: {:?}", config.service.grace_delay);
            match &config.power.command {
                Some(command) => {
                    println!("  Power: {} via {:?}", config.power.action.as_str(), command)
                }
                None => println!("  Power: {}", config.power.action.as_str()),
            }

            println!();
            println!("Packages ({}):", config.pricing.len());
            for package in config.pricing.packages() {
                println!(
                    "  - {}: {} for {}",
                    package.label,
                    format_countdown(package.seconds),
                    package.cost
                );
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                kiosk_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                kiosk_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                kiosk_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                kiosk_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        kiosk_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
