//! Update events - discriminated unions for all update state changes.
//!
//! Background tasks communicate through these events rather than mutating
//! shared state directly; presentation adapters subscribe to them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DownloadError;

use super::state::{UpdateState, clip_summary};

/// Severity of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational, no action required.
    Info,
    /// Something went wrong but the system recovered.
    Warning,
    /// A user-visible failure.
    Error,
}

/// A user-facing notification tuple.
///
/// The core produces these; how they are rendered (toast, stdout, tray
/// balloon) is the sink adapter's concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Short title line.
    pub title: String,
    /// Full body text.
    pub body: String,
    /// Severity for the rendering surface.
    pub severity: Severity,
    /// Short-form summary, clipped to the 60-character display cap.
    pub summary: String,
}

impl Notification {
    /// Build a notification, deriving the clipped summary from the body.
    pub fn new(title: impl Into<String>, body: impl Into<String>, severity: Severity) -> Self {
        let body = body.into();
        let summary = clip_summary(&body);
        Self {
            title: title.into(),
            body,
            severity,
            summary,
        }
    }
}

/// Events produced by one download-and-install session.
///
/// For a given session these form a finite sequence: zero or more
/// `Progress` events (non-decreasing `received`), then exactly one
/// terminal event (`Completed`, `Cancelled`, or `Failed`). Nothing is
/// emitted after the terminal event. `InstallerLaunched` belongs to the
/// install phase that follows a `Completed` transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// The transfer has started.
    Started {
        /// Source URL.
        url: String,
    },

    /// Throttled progress update.
    Progress {
        /// Bytes received so far.
        received: u64,
        /// Total bytes if the server reported a length.
        #[serde(skip_serializing_if = "Option::is_none")]
        total: Option<u64>,
        /// Truncating integer percent, when the total is known.
        #[serde(skip_serializing_if = "Option::is_none")]
        percent: Option<u8>,
    },

    /// The transfer completed and the file is fully on disk.
    Completed {
        /// Path of the downloaded installer.
        path: PathBuf,
    },

    /// The installer process has been launched.
    InstallerLaunched {
        /// Path of the running installer.
        path: PathBuf,
    },

    /// The transfer was cancelled cooperatively.
    Cancelled,

    /// The transfer or installer launch failed.
    Failed {
        /// What went wrong.
        error: DownloadError,
    },
}

impl DownloadEvent {
    /// Create a progress event, computing the truncating percent when the
    /// total is known and non-zero.
    #[must_use]
    pub fn progress(received: u64, total: Option<u64>) -> Self {
        let percent = match total {
            Some(total) if total > 0 => {
                u8::try_from(received.saturating_mul(100) / total).ok()
            }
            _ => None,
        };
        Self::Progress {
            received,
            total,
            percent,
        }
    }

    /// Whether this event terminates the session's transfer sequence.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Cancelled | Self::Failed { .. }
        )
    }
}

/// Canonical event union consumed by presentation adapters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateEvent {
    /// The lifecycle state was replaced.
    StateChanged {
        /// The new current state.
        state: UpdateState,
    },

    /// A download session event.
    Download {
        /// The wrapped session event.
        event: DownloadEvent,
    },

    /// A user-facing notification was produced.
    Notification {
        /// The notification tuple.
        notification: Notification,
    },
}

impl UpdateEvent {
    /// Event name for wire protocols and log targets.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "update:state_changed",
            Self::Download { .. } => "update:download",
            Self::Notification { .. } => "update:notification",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent_truncates() {
        match DownloadEvent::progress(999, Some(1000)) {
            DownloadEvent::Progress { percent, .. } => assert_eq!(percent, Some(99)),
            other => panic!("expected Progress, got {other:?}"),
        }
        match DownloadEvent::progress(500, Some(1000)) {
            DownloadEvent::Progress { percent, .. } => assert_eq!(percent, Some(50)),
            other => panic!("expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn progress_without_total_has_no_percent() {
        match DownloadEvent::progress(4096, None) {
            DownloadEvent::Progress { percent, total, .. } => {
                assert_eq!(percent, None);
                assert_eq!(total, None);
            }
            other => panic!("expected Progress, got {other:?}"),
        }
    }

    #[test]
    fn terminal_classification() {
        assert!(DownloadEvent::Cancelled.is_terminal());
        assert!(
            DownloadEvent::Failed {
                error: DownloadError::network("reset")
            }
            .is_terminal()
        );
        assert!(
            DownloadEvent::Completed {
                path: PathBuf::from("driver.exe")
            }
            .is_terminal()
        );
        assert!(!DownloadEvent::progress(1, Some(2)).is_terminal());
        assert!(
            !DownloadEvent::Started {
                url: "https://x/y".to_string()
            }
            .is_terminal()
        );
    }

    #[test]
    fn notification_summary_is_clipped() {
        let n = Notification::new("title", "b".repeat(100), Severity::Info);
        assert!(n.summary.chars().count() <= 61);
        assert!(n.summary.ends_with('…'));
    }

    #[test]
    fn events_carry_type_tags() {
        let event = UpdateEvent::Download {
            event: DownloadEvent::Cancelled,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"download\""));
        assert!(json.contains("\"type\":\"cancelled\""));
        assert_eq!(event.event_name(), "update:download");
    }
}
