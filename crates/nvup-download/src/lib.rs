#![doc = include_str!("../README.md")]

mod controller;
mod throttle;
mod unblock;

pub use controller::DownloadController;
pub use throttle::{DEFAULT_PROGRESS_INTERVAL, ProgressThrottle};
