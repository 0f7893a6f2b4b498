//! The download-and-install controller.
//!
//! Streams the installer to disk with cooperative cancellation. Raw
//! per-chunk progress goes to the session's `watch` channel; UI-facing
//! progress events are throttled. Each session ends with exactly one
//! terminal event and nothing after it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use nvup_core::{
    DownloadControllerPort, DownloadError, DownloadEvent, DownloadRequest, InstallerLauncher,
    TransferProgress, UpdateEvent, UpdateEventEmitter,
};

use crate::throttle::{DEFAULT_PROGRESS_INTERVAL, ProgressThrottle};
use crate::unblock::clear_download_mark;

/// Production implementation of [`DownloadControllerPort`].
pub struct DownloadController {
    client: reqwest::Client,
    launcher: Arc<dyn InstallerLauncher>,
    emitter: Box<dyn UpdateEventEmitter>,
    progress_interval: Duration,
}

impl DownloadController {
    /// Create a controller with the default 2 second progress interval.
    pub fn new(launcher: Arc<dyn InstallerLauncher>, emitter: Box<dyn UpdateEventEmitter>) -> Self {
        Self::with_progress_interval(launcher, emitter, DEFAULT_PROGRESS_INTERVAL)
    }

    /// Create a controller with a custom progress event interval.
    pub fn with_progress_interval(
        launcher: Arc<dyn InstallerLauncher>,
        emitter: Box<dyn UpdateEventEmitter>,
        progress_interval: Duration,
    ) -> Self {
        // No overall request timeout: installer payloads are large and
        // transfer time is unbounded. The connect phase is bounded.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            launcher,
            emitter,
            progress_interval,
        }
    }

    fn emit(&self, event: DownloadEvent) {
        self.emitter.emit(UpdateEvent::Download { event });
    }

    /// The streaming write loop, separated from cancellation handling.
    async fn transfer(&self, request: &DownloadRequest) -> Result<PathBuf, DownloadError> {
        let response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|err| DownloadError::network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::network_with_status(
                format!("server responded with {status}"),
                status.as_u16(),
            ));
        }

        let total = response.content_length();

        // Truncates any partial file left by a cancelled earlier attempt.
        let mut file = tokio::fs::File::create(&request.target_path)
            .await
            .map_err(|err| DownloadError::from_io_error(&err))?;

        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;
        let mut seq: u64 = 0;
        let mut throttle = ProgressThrottle::new(self.progress_interval);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| DownloadError::network(err.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|err| DownloadError::from_io_error(&err))?;
            received += chunk.len() as u64;
            seq += 1;

            // send_modify avoids clone and is infallible
            let current_seq = seq;
            request.progress_tx.send_modify(|state: &mut TransferProgress| {
                state.received = received;
                state.total = total;
                state.seq = current_seq;
            });

            if throttle.should_emit() {
                self.emit(DownloadEvent::progress(received, total));
            }
        }

        file.flush()
            .await
            .map_err(|err| DownloadError::from_io_error(&err))?;
        drop(file);

        // Closing progress event regardless of the throttle window.
        self.emit(DownloadEvent::progress(received, total));
        clear_download_mark(&request.target_path).await;

        tracing::info!(
            target: "nvup.download",
            path = %request.target_path.display(),
            received,
            "transfer complete"
        );
        Ok(request.target_path.clone())
    }
}

#[async_trait]
impl DownloadControllerPort for DownloadController {
    async fn download(&self, request: DownloadRequest) -> Result<PathBuf, DownloadError> {
        tracing::info!(
            target: "nvup.download",
            url = %request.url,
            path = %request.target_path.display(),
            "starting transfer"
        );
        self.emit(DownloadEvent::Started {
            url: request.url.clone(),
        });

        let result = tokio::select! {
            biased;

            () = request.cancel.cancelled() => {
                // The partial file stays on disk; a retry overwrites it.
                Err(DownloadError::Cancelled)
            }

            result = self.transfer(&request) => result,
        };

        match &result {
            Ok(path) => self.emit(DownloadEvent::Completed { path: path.clone() }),
            Err(err) if err.is_cancelled() => {
                tracing::info!(
                    target: "nvup.download",
                    path = %request.target_path.display(),
                    "transfer cancelled"
                );
                self.emit(DownloadEvent::Cancelled);
            }
            Err(err) => {
                tracing::warn!(target: "nvup.download", error = %err, "transfer failed");
                self.emit(DownloadEvent::Failed { error: err.clone() });
            }
        }
        result
    }

    async fn install(&self, installer: &Path) -> Result<(), DownloadError> {
        match self.launcher.launch(installer).await {
            Ok(()) => {
                self.emit(DownloadEvent::InstallerLaunched {
                    path: installer.to_path_buf(),
                });
                Ok(())
            }
            Err(err) => {
                let err = DownloadError::from(err);
                self.emit(DownloadEvent::Failed { error: err.clone() });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use nvup_core::LaunchError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt as _};
    use tokio::net::TcpListener;
    use tokio::sync::watch;
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturingEmitter {
        events: Arc<Mutex<Vec<UpdateEvent>>>,
    }

    impl CapturingEmitter {
        fn download_events(&self) -> Vec<DownloadEvent> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    UpdateEvent::Download { event } => Some(event.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl UpdateEventEmitter for CapturingEmitter {
        fn emit(&self, event: UpdateEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn clone_box(&self) -> Box<dyn UpdateEventEmitter> {
            Box::new(self.clone())
        }
    }

    struct OkLauncher;

    #[async_trait]
    impl InstallerLauncher for OkLauncher {
        async fn launch(&self, _installer: &Path) -> Result<(), LaunchError> {
            Ok(())
        }
    }

    struct FailingLauncher;

    #[async_trait]
    impl InstallerLauncher for FailingLauncher {
        async fn launch(&self, _installer: &Path) -> Result<(), LaunchError> {
            Err(LaunchError::spawn("no such file"))
        }
    }

    fn controller(emitter: &CapturingEmitter) -> DownloadController {
        DownloadController::with_progress_interval(
            Arc::new(OkLauncher),
            Box::new(emitter.clone()),
            Duration::ZERO,
        )
    }

    fn request(url: String, target: PathBuf) -> (DownloadRequest, watch::Receiver<TransferProgress>) {
        let (progress_tx, progress_rx) = watch::channel(TransferProgress::default());
        (
            DownloadRequest {
                url,
                target_path: target,
                cancel: CancellationToken::new(),
                progress_tx,
            },
            progress_rx,
        )
    }

    /// One-shot HTTP server: replies to the first request with the given
    /// body, optionally stalling after a prefix until cancelled.
    async fn serve_once(body: Vec<u8>, stall_after: Option<usize>) -> (String, CancellationToken) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let release = CancellationToken::new();
        let release_server = release.clone();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(header.as_bytes()).await.unwrap();

            match stall_after {
                Some(prefix) => {
                    socket.write_all(&body[..prefix]).await.unwrap();
                    socket.flush().await.unwrap();
                    // Hold the connection open until the test releases it.
                    release_server.cancelled().await;
                }
                None => {
                    socket.write_all(&body).await.unwrap();
                }
            }
            let _ = socket.shutdown().await;
        });

        (format!("http://{addr}/driver.exe"), release)
    }

    #[tokio::test]
    async fn downloads_body_to_target_file() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("driver.exe");
        let body = vec![0xAB; 64 * 1024];
        let (url, _release) = serve_once(body.clone(), None).await;

        let emitter = CapturingEmitter::default();
        let controller = controller(&emitter);
        let (request, progress_rx) = request(url, target.clone());

        let path = controller.download(request).await.unwrap();
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), body);

        let events = emitter.download_events();
        assert!(matches!(events.first(), Some(DownloadEvent::Started { .. })));
        assert!(matches!(events.last(), Some(DownloadEvent::Completed { .. })));
        // The closing progress event reports the full byte count.
        assert!(events.iter().any(|e| matches!(
            e,
            DownloadEvent::Progress { received, percent: Some(100), .. } if *received == body.len() as u64
        )));

        let final_progress = progress_rx.borrow();
        assert_eq!(final_progress.received, body.len() as u64);
        assert_eq!(final_progress.total, Some(body.len() as u64));
    }

    #[tokio::test]
    async fn cancellation_keeps_partial_file_and_emits_terminal_cancelled() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("driver.exe");
        let body = vec![0xCD; 32 * 1024];
        let (url, release) = serve_once(body, Some(8 * 1024)).await;

        let emitter = CapturingEmitter::default();
        let controller = Arc::new(controller(&emitter));
        let (request, mut progress_rx) = request(url, target.clone());
        let cancel = request.cancel.clone();

        let handle = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.download(request).await })
        };

        // Wait until some bytes have arrived, then cancel.
        progress_rx.changed().await.unwrap();
        cancel.cancel();
        let result = handle.await.unwrap();
        release.cancel();

        assert_eq!(result.unwrap_err(), DownloadError::Cancelled);
        // Partial file is deliberately left in place.
        let on_disk = std::fs::metadata(&target).unwrap().len();
        assert!(on_disk > 0);

        let events = emitter.download_events();
        assert_eq!(events.last(), Some(&DownloadEvent::Cancelled));
        assert!(!events.iter().any(|e| matches!(e, DownloadEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn retry_overwrites_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("driver.exe");
        std::fs::write(&target, b"stale partial content from a cancelled run").unwrap();

        let body = vec![0x01; 1024];
        let (url, _release) = serve_once(body.clone(), None).await;

        let emitter = CapturingEmitter::default();
        let controller = controller(&emitter);
        let (request, _progress_rx) = request(url, target.clone());

        controller.download(request).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), body);
    }

    #[tokio::test]
    async fn watch_progress_is_non_decreasing() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("driver.exe");
        let (url, _release) = serve_once(vec![0x02; 128 * 1024], None).await;

        let emitter = CapturingEmitter::default();
        let controller = Arc::new(controller(&emitter));
        let (request, mut progress_rx) = request(url, target);

        let handle = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.download(request).await })
        };

        let mut last = 0u64;
        while progress_rx.changed().await.is_ok() {
            let current = progress_rx.borrow().received;
            assert!(current >= last, "progress went backwards: {last} -> {current}");
            last = current;
        }
        handle.await.unwrap().unwrap();
        assert_eq!(last, 128 * 1024);
    }

    #[tokio::test]
    async fn http_error_status_fails_without_creating_file() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            let _ = socket.shutdown().await;
        });

        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("driver.exe");
        let emitter = CapturingEmitter::default();
        let controller = controller(&emitter);
        let (request, _progress_rx) = request(format!("http://{addr}/missing.exe"), target.clone());

        let err = controller.download(request).await.unwrap_err();
        assert!(matches!(
            err,
            DownloadError::Network {
                status_code: Some(404),
                ..
            }
        ));
        assert!(!target.exists());
        assert!(matches!(
            emitter.download_events().last(),
            Some(DownloadEvent::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn install_emits_launched_event() {
        let emitter = CapturingEmitter::default();
        let controller = controller(&emitter);

        controller.install(Path::new("/tmp/driver.exe")).await.unwrap();
        assert!(matches!(
            emitter.download_events().last(),
            Some(DownloadEvent::InstallerLaunched { .. })
        ));
    }

    #[tokio::test]
    async fn install_failure_maps_launch_error() {
        let emitter = CapturingEmitter::default();
        let controller = DownloadController::with_progress_interval(
            Arc::new(FailingLauncher),
            Box::new(emitter.clone()),
            Duration::ZERO,
        );

        let err = controller.install(Path::new("/tmp/driver.exe")).await.unwrap_err();
        assert!(matches!(err, DownloadError::InstallerLaunch { .. }));
        assert!(matches!(
            emitter.download_events().last(),
            Some(DownloadEvent::Failed { .. })
        ));
    }
}
