//! Error taxonomy shared across adapters.
//!
//! These errors are designed to be serializable: they cross the event
//! boundary into notifications and logs, so they capture I/O error kinds
//! and messages as strings instead of wrapping `std::io::Error`.
//!
//! Propagation policy: everything here is recovered at the state-machine
//! boundary and surfaced as a state plus a notification. Nothing in this
//! module should ever terminate the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error from the installed-driver probe.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProbeError {
    /// The enumeration command could not be started.
    #[error("probe launch failed: {message}")]
    Launch {
        /// Detailed error message.
        message: String,
    },

    /// The enumeration command did not finish within the bounded timeout.
    #[error("probe timed out after {seconds}s")]
    Timeout {
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// The command ran but produced output we could not interpret.
    #[error("unreadable probe output: {message}")]
    Output {
        /// Detailed error message.
        message: String,
    },
}

/// Error from the remote catalog fetch.
///
/// A missing `IDS` array, an empty array, or missing fields are all
/// `Malformed`: the fetch failed, it is not a parse exception that
/// propagates upward.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CatalogError {
    /// Network/HTTP failure reaching the catalog service.
    #[error("catalog request failed: {message}")]
    Network {
        /// Detailed error message.
        message: String,
        /// HTTP status code if one was received.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// The catalog did not respond within the bounded timeout.
    #[error("catalog request timed out after {seconds}s")]
    Timeout {
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// The payload did not have the expected shape.
    #[error("malformed catalog response: {message}")]
    Malformed {
        /// What was missing or wrong.
        message: String,
    },

    /// The catalog entry carried an empty or unparsable download URL.
    #[error("invalid download URL in catalog entry: {url}")]
    InvalidDownloadUrl {
        /// The offending URL text.
        url: String,
    },
}

impl CatalogError {
    /// Create a network error without a status code.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error with an HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Error from the download-and-install pipeline.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// Network/HTTP failure during the transfer.
    #[error("network error: {message}")]
    Network {
        /// Detailed error message.
        message: String,
        /// HTTP status code if one was received.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// Disk failure creating or writing the target file.
    #[error("disk error ({kind}): {message}")]
    Disk {
        /// The I/O error kind (e.g. "PermissionDenied").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// The transfer was cancelled cooperatively. Distinct from `Failed`
    /// outcomes: the partial file is left in place and a retry overwrites it.
    #[error("download cancelled")]
    Cancelled,

    /// The downloaded installer could not be launched.
    #[error("installer launch failed: {message}")]
    InstallerLaunch {
        /// Detailed error message.
        message: String,
    },
}

impl DownloadError {
    /// Create a network error without a status code.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error with an HTTP status code.
    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a disk error from a `std::io::Error`, capturing the kind name.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::Disk {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
        }
    }

    /// Create an installer-launch error.
    pub fn installer_launch(message: impl Into<String>) -> Self {
        Self::InstallerLaunch {
            message: message.into(),
        }
    }

    /// Check if this is a cooperative cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Convert to a human-readable message for the notification surface.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network {
                message,
                status_code: Some(code),
            } => format!("Download failed (HTTP {code}): {message}"),
            Self::Network { message, .. } => format!("Download failed: {message}"),
            Self::Disk { message, .. } => format!("Could not write installer: {message}"),
            Self::Cancelled => "Download cancelled.".to_string(),
            Self::InstallerLaunch { message } => {
                format!("Installer could not be started: {message}")
            }
        }
    }
}

/// Error launching or waiting on the installer process.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LaunchError {
    /// The process could not be spawned.
    #[error("failed to spawn installer: {message}")]
    Spawn {
        /// Detailed error message.
        message: String,
    },

    /// Waiting on the spawned process failed.
    #[error("failed waiting on installer ({kind}): {message}")]
    Wait {
        /// The I/O error kind.
        kind: String,
        /// Detailed error message.
        message: String,
    },
}

impl LaunchError {
    /// Create a spawn error.
    pub fn spawn(message: impl Into<String>) -> Self {
        Self::Spawn {
            message: message.into(),
        }
    }

    /// Create a wait error from a `std::io::Error`.
    #[must_use]
    pub fn from_wait_error(err: &std::io::Error) -> Self {
        Self::Wait {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
        }
    }
}

impl From<LaunchError> for DownloadError {
    fn from(err: LaunchError) -> Self {
        Self::installer_launch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_error_captures_io_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DownloadError::from_io_error(&io_err);
        match err {
            DownloadError::Disk { kind, message } => {
                assert_eq!(kind, "PermissionDenied");
                assert!(message.contains("denied"));
            }
            other => panic!("expected Disk variant, got {other:?}"),
        }
    }

    #[test]
    fn errors_serialize_round_trip() {
        let err = CatalogError::network_with_status("gateway", 502);
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("502"));
        let parsed: CatalogError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }

    #[test]
    fn cancelled_is_distinct_from_failures() {
        assert!(DownloadError::Cancelled.is_cancelled());
        assert!(!DownloadError::network("reset").is_cancelled());
        assert!(!DownloadError::installer_launch("nope").is_cancelled());
    }

    #[test]
    fn launch_error_maps_to_installer_launch() {
        let err: DownloadError = LaunchError::spawn("access denied").into();
        match err {
            DownloadError::InstallerLaunch { message } => {
                assert!(message.contains("access denied"));
            }
            other => panic!("expected InstallerLaunch, got {other:?}"),
        }
    }
}
