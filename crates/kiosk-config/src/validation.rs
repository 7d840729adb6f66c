//! Configuration validation

use crate::schema::{RawConfig, RawPackage};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Package '{label}': {message}")]
    PackageError { label: String, message: String },

    #[error("Duplicate package label: {0}")]
    DuplicatePackage(String),

    #[error("Package label cannot be empty")]
    EmptyPackageLabel,

    #[error("Unknown power action '{0}' (expected power_off or reboot)")]
    InvalidPowerAction(String),

    #[error("Power command cannot be empty")]
    EmptyPowerCommand,

    #[error("Service config error: {0}")]
    ServiceError(String),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let service = &config.service;
    if service.tick_interval_ms == Some(0) {
        errors.push(ValidationError::ServiceError(
            "tick_interval_ms must be greater than zero".into(),
        ));
    }
    if let Some(user) = &service.user_id
        && user.trim().is_empty()
    {
        errors.push(ValidationError::ServiceError("user_id cannot be empty".into()));
    }

    if let Some(action) = &config.power.action
        && parse_power_action(action).is_none()
    {
        errors.push(ValidationError::InvalidPowerAction(action.clone()));
    }
    if let Some(command) = &config.power.command
        && command.first().is_none_or(|program| program.trim().is_empty())
    {
        errors.push(ValidationError::EmptyPowerCommand);
    }

    if let Some(packages) = &config.packages {
        let mut seen = HashSet::new();
        for package in packages {
            let label = package.label.trim();
            if !label.is_empty() && !seen.insert(label) {
                errors.push(ValidationError::DuplicatePackage(label.to_string()));
            }
            errors.extend(validate_package(package));
        }
    }

    errors
}

fn validate_package(package: &RawPackage) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if package.label.trim().is_empty() {
        errors.push(ValidationError::EmptyPackageLabel);
        return errors;
    }

    if package.seconds == 0 {
        errors.push(ValidationError::PackageError {
            label: package.label.clone(),
            message: "seconds must be greater than zero".into(),
        });
    }

    errors
}

/// Parse a power action name
pub fn parse_power_action(s: &str) -> Option<kiosk_host_api::PowerAction> {
    match s.to_lowercase().as_str() {
        "power_off" | "poweroff" | "shutdown" => Some(kiosk_host_api::PowerAction::PowerOff),
        "reboot" | "restart" => Some(kiosk_host_api::PowerAction::Reboot),
        _ => None,
    }
}
