#![doc = include_str!("../README.md")]

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod instance_lock;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use instance_lock::InstanceLock;
pub use parser::Cli;
