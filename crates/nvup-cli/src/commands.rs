//! Subcommand definitions.

use clap::Subcommand;

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one update check and print the result
    Check,

    /// Check for an update, then download and run the installer
    ///
    /// Ctrl-C while the download is running cancels it; the partial
    /// file is kept and a later attempt overwrites it.
    Install,

    /// Check periodically until interrupted
    Watch {
        /// Minutes between checks
        #[arg(long = "interval", default_value_t = 60)]
        interval_minutes: u64,
    },
}
