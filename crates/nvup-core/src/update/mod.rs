//! Update lifecycle: states, events, and the orchestrating machine.

mod events;
mod machine;
mod state;

pub use events::{DownloadEvent, Notification, Severity, UpdateEvent};
pub use machine::{InstallAction, UpdateMachine, UpdateMachineDeps};
pub use state::{DriverInfo, SUMMARY_MAX_CHARS, UpdateState, clip_summary};
