//! Port definitions - the seams between the core and its adapters.
//!
//! Concrete implementations live in adapter crates (`nvup-catalog`,
//! `nvup-download`, `nvup-runtime`, `nvup-cli`) and are wired together
//! only at the composition root.

mod catalog;
mod downloader;
mod driver_probe;
mod event_emitter;
mod installer;
mod notifier;

pub use catalog::CatalogClient;
pub use downloader::{DownloadControllerPort, DownloadRequest, DownloadSession, TransferProgress};
pub use driver_probe::DriverProbe;
pub use event_emitter::{NoopEmitter, UpdateEventEmitter};
pub use installer::InstallerLauncher;
pub use notifier::{NoopNotifier, Notifier};

#[cfg(test)]
pub use catalog::MockCatalogClient;
#[cfg(test)]
pub use driver_probe::MockDriverProbe;
