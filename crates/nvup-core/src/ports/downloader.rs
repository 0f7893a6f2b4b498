//! Download controller port and session types.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::DownloadError;

/// Progress snapshot sent through the watch channel.
///
/// The worker only ever writes here; bridges and the state machine read.
/// `seq` increases with every write so readers can detect fresh values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes received so far. Non-decreasing within one session.
    pub received: u64,
    /// Total bytes if the server reported a content length.
    pub total: Option<u64>,
    /// Monotonically increasing sequence number for change detection.
    pub seq: u64,
}

/// Everything a controller needs to execute one transfer.
///
/// A value type with no references back to the state machine: the machine
/// keeps the token and a watch receiver, the controller gets the rest.
pub struct DownloadRequest {
    /// Source URL of the installer payload.
    pub url: String,
    /// Target path under the download directory. An existing file (for
    /// example a partial left by a cancelled attempt) is overwritten.
    pub target_path: PathBuf,
    /// Cooperative cancellation signal, checked at chunk boundaries.
    pub cancel: CancellationToken,
    /// Progress sender the worker writes to.
    pub progress_tx: watch::Sender<TransferProgress>,
}

/// Handle for the single in-flight download-and-install operation.
///
/// At most one exists system-wide; the state machine enforces that by
/// interpreting an install request during an active session as a cancel.
#[derive(Debug, Clone)]
pub struct DownloadSession {
    /// Where the installer is being written.
    pub target_path: PathBuf,
    /// Cancellation handle shared with the in-flight transfer.
    pub cancel: CancellationToken,
    /// When the session was started.
    pub started_at: DateTime<Utc>,
}

impl DownloadSession {
    /// Create a session starting now.
    #[must_use]
    pub fn new(target_path: PathBuf, cancel: CancellationToken) -> Self {
        Self {
            target_path,
            cancel,
            started_at: Utc::now(),
        }
    }
}

/// Port for the cancellable download-and-install primitive.
///
/// The controller is single-session-at-a-time but does not self-enforce
/// against concurrent misuse; callers must serialize (the state machine's
/// toggle logic does).
#[async_trait]
pub trait DownloadControllerPort: Send + Sync {
    /// Stream the resource at `request.url` to `request.target_path`,
    /// reporting progress through the watch channel and emitting throttled
    /// progress events. Resolves to the downloaded path, or
    /// `DownloadError::Cancelled` / a failure. The partial file is left in
    /// place on cancellation or failure.
    async fn download(&self, request: DownloadRequest) -> Result<PathBuf, DownloadError>;

    /// Post-transfer phase: clear the OS download-provenance marker
    /// (best-effort), launch the installer elevated with its own directory
    /// as working directory, and wait for it to exit.
    async fn install(&self, installer: &Path) -> Result<(), DownloadError>;
}
