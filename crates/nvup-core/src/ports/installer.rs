//! Installer launcher port.

use std::path::Path;

use async_trait::async_trait;

use crate::error::LaunchError;

/// Port for launching the downloaded installer.
///
/// Implementations spawn the file as an elevated process with the file's
/// own directory as working directory and wait for it to exit without
/// blocking the caller's control thread. A non-zero exit status is the
/// installer's business (the user may simply close it); only spawn and
/// wait failures are errors.
#[async_trait]
pub trait InstallerLauncher: Send + Sync {
    /// Launch `installer` and wait for the process to exit.
    async fn launch(&self, installer: &Path) -> Result<(), LaunchError>;
}
