//! The update lifecycle state machine.
//!
//! Orchestrates the probe → catalog → comparison cycle and drives the
//! single cancellable download-and-install operation.
//!
//! # Concurrency model
//!
//! All state mutation happens through [`UpdateMachine::set_state`] on the
//! orchestration task; background work (transfer, installer wait) reports
//! back through a `watch` channel and the event emitter rather than
//! touching shared fields. `check_now` is guarded by a busy flag so a
//! reentrant call is a no-op; the single optional [`DownloadSession`]
//! lives only for the transfer, and a second flag tracks the wider
//! download-and-install flow.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify, RwLock, watch};
use tokio_util::sync::CancellationToken;

use crate::paths::{ensure_directory, resolve_download_dir};
use crate::ports::{
    CatalogClient, DownloadControllerPort, DownloadRequest, DownloadSession, DriverProbe,
    Notifier, TransferProgress, UpdateEventEmitter,
};
use crate::settings::Settings;
use crate::version::{DriverVersion, is_newer};

use super::events::{Notification, Severity, UpdateEvent};
use super::state::{DriverInfo, UpdateState};

/// Fallback installer filename when the URL has no usable segment.
const DEFAULT_INSTALLER_NAME: &str = "driver-installer.exe";

/// What an install request resolved to.
///
/// The toggle semantics are deliberate: the same user action starts a
/// download when idle and cancels it when one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    /// A new download session was started.
    Started,
    /// An active session was asked to cancel.
    CancelRequested,
    /// The request was not meaningful in the current state.
    Ignored,
}

/// Dependencies for creating an update machine.
pub struct UpdateMachineDeps {
    /// Installed-driver lookup.
    pub probe: Arc<dyn DriverProbe>,
    /// Remote catalog client.
    pub catalog: Arc<dyn CatalogClient>,
    /// Download-and-install controller.
    pub controller: Arc<dyn DownloadControllerPort>,
    /// Notification sink.
    pub notifier: Arc<dyn Notifier>,
    /// Event emitter for presentation adapters.
    pub emitter: Arc<dyn UpdateEventEmitter>,
    /// Runtime configuration.
    pub settings: Settings,
}

/// Outcome of one check cycle, before it is applied to the state.
enum CheckOutcome {
    NoDriver,
    Failed(String),
    UpToDate(String),
    UpdateAvailable(String, DriverInfo),
}

/// The update lifecycle orchestrator.
///
/// Create once, wrap in an `Arc`, and drive through [`check_now`] and
/// [`request_install`].
///
/// [`check_now`]: UpdateMachine::check_now
/// [`request_install`]: UpdateMachine::request_install
pub struct UpdateMachine {
    probe: Arc<dyn DriverProbe>,
    catalog: Arc<dyn CatalogClient>,
    controller: Arc<dyn DownloadControllerPort>,
    notifier: Arc<dyn Notifier>,
    emitter: Arc<dyn UpdateEventEmitter>,
    settings: Settings,
    /// The single current state, replaced wholesale on every transition.
    state: RwLock<UpdateState>,
    /// Busy flag making `check_now` reentrancy a no-op.
    checking: AtomicBool,
    /// Set for the lifetime of a download-and-install flow, which
    /// outlives the session once the transfer hands off to the installer.
    installing: AtomicBool,
    /// The at-most-one in-flight download session.
    active: Mutex<Option<DownloadSession>>,
    /// Woken whenever the machine returns to idle.
    idle_notify: Notify,
}

impl UpdateMachine {
    /// Create a new machine in the `Unknown` state.
    #[must_use]
    pub fn new(deps: UpdateMachineDeps) -> Self {
        Self {
            probe: deps.probe,
            catalog: deps.catalog,
            controller: deps.controller,
            notifier: deps.notifier,
            emitter: deps.emitter,
            settings: deps.settings,
            state: RwLock::new(UpdateState::Unknown),
            checking: AtomicBool::new(false),
            installing: AtomicBool::new(false),
            active: Mutex::new(None),
            idle_notify: Notify::new(),
        }
    }

    /// The current state (cloned snapshot).
    pub async fn current_state(&self) -> UpdateState {
        self.state.read().await.clone()
    }

    /// Whether a download session is currently active.
    pub async fn is_downloading(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Run one check cycle: installed version → catalog → comparison.
    ///
    /// A call while another check is in flight is a no-op that returns the
    /// current state without duplicating network calls or transitions.
    pub async fn check_now(&self) -> UpdateState {
        if self
            .checking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(target: "nvup.update", "check already in flight, ignoring");
            return self.current_state().await;
        }

        let outcome = self.run_check().await;
        self.apply_check_outcome(outcome).await;

        self.checking.store(false, Ordering::SeqCst);
        self.idle_notify.notify_waiters();
        self.current_state().await
    }

    /// Interpret a user install trigger against the current state.
    ///
    /// From `UpdateAvailable` this starts the download-and-install flow in
    /// the background and returns immediately. While a download session is
    /// active it requests cancellation instead (toggle semantics). In any
    /// other state, including while the installer is running, the request
    /// is ignored.
    pub async fn request_install(self: &Arc<Self>) -> InstallAction {
        // Check-and-claim under one lock so parallel requests cannot
        // both start a session.
        let mut active = self.active.lock().await;
        if let Some(session) = active.as_ref() {
            tracing::info!(
                target: "nvup.update",
                path = %session.target_path.display(),
                "install request while a download is active - cancelling"
            );
            session.cancel.cancel();
            return InstallAction::CancelRequested;
        }

        let (installed, latest) = match self.current_state().await {
            UpdateState::UpdateAvailable { installed, latest } => (installed, latest),
            state => {
                tracing::warn!(
                    target: "nvup.update",
                    state = ?state,
                    "install request ignored in current state"
                );
                return InstallAction::Ignored;
            }
        };

        let target_path = match self.plan_target_path(&latest) {
            Ok(path) => path,
            Err(message) => {
                drop(active);
                self.set_state(
                    UpdateState::UpdateAvailable {
                        installed,
                        latest: latest.clone(),
                    },
                    Some(Notification::new(
                        "Driver download failed",
                        message,
                        Severity::Error,
                    )),
                )
                .await;
                return InstallAction::Ignored;
            }
        };

        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(TransferProgress::default());
        *active = Some(DownloadSession::new(target_path.clone(), cancel.clone()));
        self.installing.store(true, Ordering::SeqCst);
        drop(active);

        self.set_state(
            UpdateState::Downloading {
                latest: latest.clone(),
                received: 0,
                total: None,
            },
            Some(Notification::new(
                "Driver download",
                format!("Downloading driver {}", latest.version),
                Severity::Info,
            )),
        )
        .await;

        self.spawn_progress_follower(progress_rx);

        let machine = Arc::clone(self);
        tokio::spawn(async move {
            machine
                .run_install_flow(installed, latest, target_path, cancel, progress_tx)
                .await;
        });

        InstallAction::Started
    }

    /// Wait until no check cycle and no download-and-install flow is in
    /// flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle_notify.notified();
            let busy = self.installing.load(Ordering::SeqCst)
                || self.active.lock().await.is_some()
                || self.checking.load(Ordering::SeqCst);
            if !busy {
                return;
            }
            notified.await;
        }
    }

    /// The probe → catalog → comparison pipeline.
    async fn run_check(&self) -> CheckOutcome {
        let installed = match self.probe.installed_version().await {
            Ok(Some(version)) => version,
            Ok(None) => return CheckOutcome::NoDriver,
            Err(err) => {
                tracing::warn!(target: "nvup.update", error = %err, "driver probe failed");
                return CheckOutcome::Failed(err.to_string());
            }
        };

        // An unparsable installed version is indistinguishable from no
        // driver for update purposes; the catalog is not consulted.
        if installed.parse::<DriverVersion>().is_err() {
            tracing::warn!(
                target: "nvup.update",
                installed,
                "installed version is unparsable, treating as no driver"
            );
            return CheckOutcome::NoDriver;
        }

        let latest = match self.catalog.latest_driver().await {
            Ok(latest) => latest,
            Err(err) => {
                tracing::warn!(target: "nvup.update", error = %err, "catalog fetch failed");
                return CheckOutcome::Failed(err.to_string());
            }
        };

        if is_newer(&latest.version, &installed) {
            CheckOutcome::UpdateAvailable(installed, latest)
        } else {
            CheckOutcome::UpToDate(installed)
        }
    }

    /// Translate a check outcome into a transition plus notification.
    async fn apply_check_outcome(&self, outcome: CheckOutcome) {
        let (state, notification) = match outcome {
            CheckOutcome::NoDriver => (
                UpdateState::NoDriverDetected,
                Notification::new(
                    "No driver detected",
                    "No supported display driver was found on this system.",
                    Severity::Warning,
                ),
            ),
            CheckOutcome::Failed(reason) => (
                UpdateState::CheckFailed {
                    reason: reason.clone(),
                },
                Notification::new("Update check failed", reason, Severity::Error),
            ),
            CheckOutcome::UpToDate(installed) => (
                UpdateState::UpToDate {
                    installed: installed.clone(),
                },
                Notification::new(
                    "Driver up to date",
                    format!("Driver {installed} is the latest available version."),
                    Severity::Info,
                ),
            ),
            CheckOutcome::UpdateAvailable(installed, latest) => (
                UpdateState::UpdateAvailable {
                    installed: installed.clone(),
                    latest: latest.clone(),
                },
                Notification::new(
                    "Driver update available",
                    format!(
                        "Driver {} is available (installed: {installed}).",
                        latest.version
                    ),
                    Severity::Info,
                ),
            ),
        };
        self.set_state(state, Some(notification)).await;
    }

    /// Background flow: transfer → installer → automatic re-check.
    async fn run_install_flow(
        self: Arc<Self>,
        installed: String,
        latest: DriverInfo,
        target_path: PathBuf,
        cancel: CancellationToken,
        progress_tx: watch::Sender<TransferProgress>,
    ) {
        let request = DownloadRequest {
            url: latest.download_url.clone(),
            target_path,
            cancel,
            progress_tx,
        };

        match self.controller.download(request).await {
            Ok(path) => {
                // The session ends with the transfer; a new install
                // request during the installer phase has no handle to
                // cancel and is ignored.
                self.clear_active().await;
                self.set_state(
                    UpdateState::InstallerRunning {
                        latest: latest.clone(),
                    },
                    Some(Notification::new(
                        "Driver update",
                        format!("Running installer for driver {}", latest.version),
                        Severity::Info,
                    )),
                )
                .await;

                match self.controller.install(&path).await {
                    Ok(()) => {
                        tracing::info!(
                            target: "nvup.update",
                            version = %latest.version,
                            "installer exited, re-checking"
                        );
                        // The one automatic re-check after a completed install.
                        self.check_now().await;
                    }
                    Err(err) => {
                        self.set_state(
                            UpdateState::UpdateAvailable { installed, latest },
                            Some(Notification::new(
                                "Driver update failed",
                                err.user_message(),
                                Severity::Error,
                            )),
                        )
                        .await;
                    }
                }
            }
            Err(err) if err.is_cancelled() => {
                self.set_state(
                    UpdateState::UpdateAvailable {
                        installed,
                        latest: latest.clone(),
                    },
                    Some(Notification::new(
                        "Download cancelled",
                        format!("Driver {} download was cancelled.", latest.version),
                        Severity::Info,
                    )),
                )
                .await;
                self.clear_active().await;
            }
            Err(err) => {
                self.set_state(
                    UpdateState::UpdateAvailable { installed, latest },
                    Some(Notification::new(
                        "Driver download failed",
                        err.user_message(),
                        Severity::Error,
                    )),
                )
                .await;
                self.clear_active().await;
            }
        }

        self.installing.store(false, Ordering::SeqCst);
        self.idle_notify.notify_waiters();
    }

    /// Derive the target path from the URL's filename segment under the
    /// download directory, creating the directory lazily.
    fn plan_target_path(&self, latest: &DriverInfo) -> Result<PathBuf, String> {
        let dir = resolve_download_dir(self.settings.download_dir.as_deref())
            .map_err(|err| err.to_string())?;
        ensure_directory(&dir).map_err(|err| err.to_string())?;
        let file_name = latest.file_name().unwrap_or(DEFAULT_INSTALLER_NAME);
        Ok(dir.join(file_name))
    }

    /// Follow transfer progress and refresh the `Downloading` state.
    ///
    /// Progress refreshes replace the state wholesale but are not
    /// transitions: no notification is produced for them.
    fn spawn_progress_follower(self: &Arc<Self>, mut rx: watch::Receiver<TransferProgress>) {
        let machine = Arc::clone(self);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let progress = rx.borrow().clone();
                machine.update_download_progress(progress).await;
            }
        });
    }

    async fn update_download_progress(&self, progress: TransferProgress) {
        let mut state = self.state.write().await;
        if let UpdateState::Downloading { latest, .. } = &*state {
            *state = UpdateState::Downloading {
                latest: latest.clone(),
                received: progress.received,
                total: progress.total,
            };
        }
    }

    async fn clear_active(&self) {
        *self.active.lock().await = None;
        self.idle_notify.notify_waiters();
    }

    /// Replace the state wholesale, emit the transition, and deliver the
    /// notification if one accompanies it.
    async fn set_state(&self, next: UpdateState, notification: Option<Notification>) {
        {
            let mut state = self.state.write().await;
            tracing::debug!(
                target: "nvup.update",
                from = ?*state,
                to = ?next,
                "state transition"
            );
            *state = next.clone();
        }
        self.emitter.emit(UpdateEvent::StateChanged { state: next });
        if let Some(notification) = notification {
            self.notifier.notify(&notification);
            self.emitter.emit(UpdateEvent::Notification { notification });
        }
    }
}
