//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface definition for the driver update tool.
#[derive(Parser)]
#[command(name = "nvup")]
#[command(about = "Check for and install NVIDIA driver updates")]
#[command(version)]
pub struct Cli {
    /// Query the notebook driver catalog instead of the desktop one
    #[arg(long = "notebook", global = true)]
    pub notebook: bool,

    /// Override the installer download directory
    #[arg(long = "download-dir", global = true, env = "NVUP_DOWNLOAD_DIR")]
    pub download_dir: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_args_parse() {
        let cli = Cli::parse_from([
            "nvup",
            "--verbose",
            "--notebook",
            "--download-dir",
            "/tmp/drivers",
            "check",
        ]);
        assert!(cli.verbose);
        assert!(cli.notebook);
        assert_eq!(cli.download_dir, Some("/tmp/drivers".to_string()));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn watch_interval_defaults() {
        let cli = Cli::parse_from(["nvup", "watch"]);
        match cli.command {
            Some(Commands::Watch { interval_minutes }) => assert_eq!(interval_minutes, 60),
            other => panic!("expected watch command, got {other:?}"),
        }
    }
}
