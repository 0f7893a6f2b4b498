//! CLI entry point.
//!
//! Acquires the single-instance lock, composes the application through
//! bootstrap, and dispatches the subcommand.

use clap::Parser;

use nvup_cli::{Cli, CliConfig, Commands, InstanceLock, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // A second instance stands down without output or an error code.
    let Some(_lock) = InstanceLock::acquire()? else {
        tracing::debug!(target: "nvup.cli", "another instance holds the lock, exiting");
        return Ok(());
    };

    let ctx = bootstrap(CliConfig::from_cli(&cli));

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => handlers::handle_check(&ctx).await,
        Commands::Install => handlers::handle_install(&ctx).await,
        Commands::Watch { interval_minutes } => {
            handlers::handle_watch(&ctx, interval_minutes).await
        }
    }
}
