//! Update event emitter port.
//!
//! Abstracts event delivery so the state machine and download controller
//! can emit without coupling to a transport (channel, tray surface, CLI
//! renderer).

use crate::update::UpdateEvent;

/// Port for emitting update events.
///
/// Implementations should deliver asynchronously or buffer; `emit` must
/// not block the emitting task.
pub trait UpdateEventEmitter: Send + Sync {
    /// Emit an update event.
    fn emit(&self, event: UpdateEvent);

    /// Clone this emitter into a boxed trait object.
    ///
    /// Enables cloning `Arc<dyn UpdateEventEmitter>` holders without
    /// requiring `Clone` on the underlying type.
    fn clone_box(&self) -> Box<dyn UpdateEventEmitter>;
}

/// A no-op emitter for tests and contexts that poll state directly.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UpdateEventEmitter for NoopEmitter {
    fn emit(&self, _event: UpdateEvent) {
        // Intentionally do nothing
    }

    fn clone_box(&self) -> Box<dyn UpdateEventEmitter> {
        Box::new(self.clone())
    }
}
