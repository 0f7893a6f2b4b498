//! Terminal rendering for notifications and download progress.

use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};

use nvup_core::{DownloadEvent, Notification, Notifier, Severity, UpdateEvent, UpdateEventEmitter};

/// Prints notifications to the terminal: info to stdout, warnings and
/// errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.severity {
            Severity::Info => println!("{}: {}", notification.title, notification.body),
            Severity::Warning => {
                eprintln!("warning: {}: {}", notification.title, notification.body);
            }
            Severity::Error => {
                eprintln!("error: {}: {}", notification.title, notification.body);
            }
        }
    }
}

/// Renders download events as an indicatif progress bar.
///
/// Only download events are rendered here; state changes surface through
/// notifications instead.
#[derive(Clone, Default)]
pub struct ProgressEmitter {
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl ProgressEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn make_bar() -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
                )
                .expect("valid progress template")
                .progress_chars("█▓░"),
        );
        bar
    }

    fn handle(&self, event: &DownloadEvent) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        match event {
            DownloadEvent::Started { url } => {
                let bar = Self::make_bar();
                bar.set_message(format!("downloading {url}"));
                *slot = Some(bar);
            }
            DownloadEvent::Progress {
                received, total, ..
            } => {
                if let Some(bar) = slot.as_ref() {
                    if let Some(total) = total {
                        bar.set_length(*total);
                    }
                    bar.set_position(*received);
                }
            }
            DownloadEvent::Completed { path } => {
                if let Some(bar) = slot.take() {
                    bar.finish_with_message(format!("saved to {}", path.display()));
                }
            }
            DownloadEvent::InstallerLaunched { path } => {
                println!("installer running: {}", path.display());
            }
            DownloadEvent::Cancelled => {
                if let Some(bar) = slot.take() {
                    bar.abandon_with_message("download cancelled");
                }
            }
            DownloadEvent::Failed { error } => {
                if let Some(bar) = slot.take() {
                    bar.abandon_with_message(format!("download failed: {error}"));
                }
            }
        }
    }
}

impl UpdateEventEmitter for ProgressEmitter {
    fn emit(&self, event: UpdateEvent) {
        if let UpdateEvent::Download { event } = event {
            self.handle(&event);
        }
    }

    fn clone_box(&self) -> Box<dyn UpdateEventEmitter> {
        Box::new(self.clone())
    }
}
