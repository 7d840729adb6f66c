//! Power control via an external command

use async_trait::async_trait;
use kiosk_host_api::{PowerAction, PowerControl, PowerError, PowerResult};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// Linux power control
pub struct LinuxPowerControl {
    action: PowerAction,
    argv: Vec<String>,
}

impl LinuxPowerControl {
    /// Use the systemd command for `action`
    pub fn new(action: PowerAction) -> Self {
        Self {
            action,
            argv: default_argv(action),
        }
    }

    /// Use an explicit command instead of the systemd default
    pub fn with_command(action: PowerAction, argv: Vec<String>) -> Self {
        Self { action, argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

fn default_argv(action: PowerAction) -> Vec<String> {
    let verb = match action {
        PowerAction::PowerOff => "poweroff",
        PowerAction::Reboot => "reboot",
    };
    vec!["systemctl".to_string(), verb.to_string()]
}

/// Resolve a program name the way the shell would
fn program_exists(program: &str) -> bool {
    if program.contains('/') {
        return Path::new(program).is_file();
    }

    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

#[async_trait]
impl PowerControl for LinuxPowerControl {
    fn action(&self) -> PowerAction {
        self.action
    }

    async fn shutdown_now(&self) -> PowerResult<()> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(PowerError::Unsupported("empty power command".into()));
        };

        // Push dirty pages out before the host goes away.
        nix::unistd::sync();

        info!(action = self.action.as_str(), command = ?self.argv, "Invoking power control");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    PowerError::PermissionDenied(format!("{}: {}", program, e))
                }
                _ => PowerError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, stderr = %stderr, "Power command failed");
            return Err(PowerError::CommandFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.argv
            .first()
            .map(|program| program_exists(program))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    #[test]
    fn default_commands_use_systemctl() {
        assert_eq!(
            LinuxPowerControl::new(PowerAction::PowerOff).argv(),
            ["systemctl", "poweroff"]
        );
        assert_eq!(
            LinuxPowerControl::new(PowerAction::Reboot).argv(),
            ["systemctl", "reboot"]
        );
    }

    #[tokio::test]
    async fn successful_command_is_ok() {
        let power = LinuxPowerControl::with_command(PowerAction::PowerOff, vec!["true".into()]);
        assert!(power.shutdown_now().await.is_ok());
    }

    #[tokio::test]
    async fn failing_command_reports_status() {
        let power = LinuxPowerControl::with_command(PowerAction::PowerOff, vec!["false".into()]);
        let result = power.shutdown_now().await;
        assert!(matches!(result, Err(PowerError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn missing_program_is_io_error() {
        let power = LinuxPowerControl::with_command(
            PowerAction::PowerOff,
            vec!["/nonexistent/kiosk-poweroff".into()],
        );
        assert!(matches!(power.shutdown_now().await, Err(PowerError::Io(_))));
        assert!(!power.is_healthy());
    }

    #[tokio::test]
    async fn empty_command_is_unsupported() {
        let power = LinuxPowerControl::with_command(PowerAction::Reboot, vec![]);
        assert!(matches!(power.shutdown_now().await, Err(PowerError::Unsupported(_))));
        assert!(!power.is_healthy());
    }

    #[test]
    fn absolute_program_path_is_checked_directly() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("poweroff");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let power = LinuxPowerControl::with_command(
            PowerAction::PowerOff,
            vec![script.to_string_lossy().into_owned()],
        );
        assert!(power.is_healthy());
    }
}
