//! Notification sink port.

use crate::update::Notification;

/// Port for the notification/presentation sink.
///
/// The core hands over `(title, body, severity, summary)` tuples; how they
/// are rendered is entirely the adapter's concern. Implementations must
/// not block.
pub trait Notifier: Send + Sync {
    /// Deliver a notification to the presentation surface.
    fn notify(&self, notification: &Notification);
}

/// A no-op sink for tests and headless contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) {
        // Intentionally do nothing
    }
}
