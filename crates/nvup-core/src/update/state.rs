//! Update lifecycle state.
//!
//! Exactly one [`UpdateState`] value is current at any time. The state
//! machine replaces it wholesale on every transition; observers see the
//! pre- or post-transition value, never a torn mixture.

use serde::{Deserialize, Serialize};

/// Short-form display cap. External surfaces rely on this exact
/// truncation behavior, so it must not change.
pub const SUMMARY_MAX_CHARS: usize = 60;

/// Latest catalog entry for the tracked driver.
///
/// Produced once per catalog fetch and owned by the state machine for the
/// duration of one check cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Version string as reported by the catalog (e.g. "552.44").
    pub version: String,
    /// Well-formed, non-empty URL of the installer payload.
    pub download_url: String,
}

impl DriverInfo {
    /// The filename segment of the download URL, used to derive the
    /// target path under the download directory.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.download_url
            .rsplit('/')
            .next()
            .map(|segment| segment.split('?').next().unwrap_or(segment))
            .filter(|name| !name.is_empty())
    }
}

/// The tagged update lifecycle state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateState {
    /// No check has completed yet (process start).
    Unknown,

    /// The installed driver could not be found or its version was
    /// unparsable. Terminal for the check cycle; no catalog call is made.
    NoDriverDetected,

    /// The catalog fetch failed.
    CheckFailed {
        /// Human-readable failure reason.
        reason: String,
    },

    /// The installed driver matches (or exceeds) the catalog entry.
    UpToDate {
        /// Installed version string.
        installed: String,
    },

    /// A newer driver is available for download.
    UpdateAvailable {
        /// Installed version string.
        installed: String,
        /// The catalog entry offering the update.
        latest: DriverInfo,
    },

    /// A download is in flight.
    Downloading {
        /// The catalog entry being downloaded.
        latest: DriverInfo,
        /// Bytes received so far.
        received: u64,
        /// Total bytes if the server reported a length.
        total: Option<u64>,
    },

    /// The installer has been launched and is running.
    InstallerRunning {
        /// The catalog entry whose installer is running.
        latest: DriverInfo,
    },
}

impl UpdateState {
    /// Short-form summary for constrained surfaces (tray tooltip, one-line
    /// status). Always clipped via [`clip_summary`].
    #[must_use]
    pub fn short_summary(&self) -> String {
        let text = match self {
            Self::Unknown => "Update status not checked yet".to_string(),
            Self::NoDriverDetected => "No display driver detected".to_string(),
            Self::CheckFailed { reason } => format!("Update check failed: {reason}"),
            Self::UpToDate { installed } => format!("Driver {installed} is up to date"),
            Self::UpdateAvailable { installed, latest } => {
                format!("Driver {} available (installed {installed})", latest.version)
            }
            Self::Downloading {
                latest,
                received,
                total,
            } => match total {
                Some(total) if *total > 0 => format!(
                    "Downloading {}: {}%",
                    latest.version,
                    received.saturating_mul(100) / total
                ),
                _ => format!("Downloading {}: {received} bytes", latest.version),
            },
            Self::InstallerRunning { latest } => {
                format!("Installing driver {}", latest.version)
            }
        };
        clip_summary(&text)
    }

    /// Whether an install request is currently meaningful from this state.
    #[must_use]
    pub const fn offers_install(&self) -> bool {
        matches!(self, Self::UpdateAvailable { .. })
    }
}

/// Clip a summary to [`SUMMARY_MAX_CHARS`] characters, appending an
/// ellipsis when clipped.
///
/// This is a presentation contract: external UI components depend on
/// the 60-character cap for consistent truncation.
#[must_use]
pub fn clip_summary(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SUMMARY_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
