//! CLI bootstrap - the composition root.
//!
//! This is the ONLY place where concrete adapters are wired together:
//! the system probe and installer launcher (nvup-runtime), the catalog
//! client (nvup-catalog), and the download controller (nvup-download)
//! all meet the core state machine here.

use std::sync::Arc;

use nvup_catalog::{CatalogClientConfig, DefaultCatalogClient};
use nvup_core::{CatalogProfile, Settings, UpdateMachine, UpdateMachineDeps, UpdateEventEmitter};
use nvup_download::DownloadController;
use nvup_runtime::{ElevatedInstallerLauncher, SystemDriverProbe};

use crate::parser::Cli;
use crate::presentation::{ConsoleNotifier, ProgressEmitter};

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Core runtime settings.
    pub settings: Settings,
}

impl CliConfig {
    /// Derive configuration from the parsed command line.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let mut settings = Settings::new();
        if cli.notebook {
            settings = settings.with_profile(CatalogProfile::Notebook);
        }
        if let Some(dir) = &cli.download_dir {
            settings = settings.with_download_dir(dir);
        }
        Self { settings }
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// The update lifecycle orchestrator.
    pub machine: Arc<UpdateMachine>,
}

/// Bootstrap the CLI application.
#[must_use]
pub fn bootstrap(config: CliConfig) -> CliContext {
    let settings = config.settings;

    let probe = Arc::new(SystemDriverProbe::new().with_timeout(settings.probe_timeout));

    let catalog_config = CatalogClientConfig::for_profile(settings.profile)
        .with_timeout(settings.catalog_timeout);
    let catalog = Arc::new(DefaultCatalogClient::new(&catalog_config));

    let launcher = Arc::new(ElevatedInstallerLauncher::new());
    let emitter = ProgressEmitter::new();
    let controller = Arc::new(DownloadController::with_progress_interval(
        launcher,
        emitter.clone_box(),
        settings.progress_interval,
    ));

    let machine = Arc::new(UpdateMachine::new(UpdateMachineDeps {
        probe,
        catalog,
        controller,
        notifier: Arc::new(ConsoleNotifier),
        emitter: Arc::new(emitter),
        settings,
    }));

    CliContext { machine }
}
