use crate::config::LauncherConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "context-launcher")]
#[command(about = "Prepare the Research Assistant environment and start the chatbot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project directory containing app.py and requirements.txt
    #[arg(long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Path to a launcher TOML file (defaults to <dir>/launcher.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Skip the public address lookup
    #[arg(long, global = true)]
    pub no_public_ip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Bootstrap the environment and run the application (default)
    Start,
    /// Check that the project files, directories and dependencies are in place
    Verify,
    /// Check whether the application is ready for a production deployment
    CheckProduction {
        /// Apply the safe fixes to .env
        #[arg(long)]
        fix: bool,
    },
    /// Send a test prompt to the configured model endpoint
    TestConnection,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Start)
    }

    pub fn apply_overrides(&self, config: &mut LauncherConfig) {
        if self.no_public_ip {
            tracing::debug!("Public address lookup disabled from the command line");
            config.network.public_ip_lookup = false;
        }
    }
}
