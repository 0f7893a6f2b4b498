//! Launching the downloaded driver installer.
//!
//! On Windows the installer needs elevation, so it goes through
//! `Start-Process -Verb RunAs` which raises the UAC prompt; elsewhere
//! the binary is executed directly. The launcher waits for the process
//! to exit but treats a non-zero exit code as a normal outcome: the
//! user declining the UAC prompt or closing the installer UI is not a
//! launch failure.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use nvup_core::{InstallerLauncher, LaunchError};

/// Production installer launcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElevatedInstallerLauncher;

impl ElevatedInstallerLauncher {
    /// Create a launcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
fn build_command(installer: &Path) -> Command {
    let mut command = Command::new("powershell");
    command.args(["-NoProfile", "-Command"]);
    command.arg(format!(
        "Start-Process -FilePath '{}' -Verb RunAs -Wait",
        installer.display()
    ));
    command
}

#[cfg(not(windows))]
fn build_command(installer: &Path) -> Command {
    Command::new(installer)
}

#[async_trait]
impl InstallerLauncher for ElevatedInstallerLauncher {
    async fn launch(&self, installer: &Path) -> Result<(), LaunchError> {
        let mut command = build_command(installer);
        if let Some(parent) = installer.parent() {
            if !parent.as_os_str().is_empty() {
                command.current_dir(parent);
            }
        }

        tracing::info!(
            target: "nvup.installer",
            path = %installer.display(),
            "launching installer"
        );

        let mut child = command
            .stdin(Stdio::null())
            .spawn()
            .map_err(|err| LaunchError::spawn(err.to_string()))?;
        let status = child
            .wait()
            .await
            .map_err(|err| LaunchError::from_wait_error(&err))?;

        tracing::info!(
            target: "nvup.installer",
            code = ?status.code(),
            "installer exited"
        );
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waits_for_process_exit() {
        let launcher = ElevatedInstallerLauncher::new();
        // /bin/sh with a null stdin exits immediately on EOF.
        launcher.launch(Path::new("/bin/sh")).await.unwrap();
    }

    #[tokio::test]
    async fn nonzero_exit_is_not_a_launch_failure() {
        let launcher = ElevatedInstallerLauncher::new();
        launcher.launch(Path::new("/bin/false")).await.unwrap();
    }

    #[tokio::test]
    async fn missing_installer_is_a_spawn_error() {
        let launcher = ElevatedInstallerLauncher::new();
        let err = launcher
            .launch(Path::new("/nonexistent/driver-installer.exe"))
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }
}
