#![doc = include_str!("../README.md")]

pub mod error;
pub mod paths;
pub mod ports;
pub mod settings;
pub mod update;
pub mod version;

pub use error::{CatalogError, DownloadError, LaunchError, ProbeError};
pub use ports::{
    CatalogClient, DownloadControllerPort, DownloadRequest, DownloadSession, DriverProbe,
    InstallerLauncher, NoopEmitter, NoopNotifier, Notifier, TransferProgress, UpdateEventEmitter,
};
pub use settings::{CatalogProfile, Settings};
pub use update::{
    DownloadEvent, DriverInfo, InstallAction, Notification, Severity, UpdateEvent, UpdateMachine,
    UpdateMachineDeps, UpdateState,
};
pub use version::{DriverVersion, is_newer};
