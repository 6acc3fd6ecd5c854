//! CLI argument parsing module for autobump

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// Keep pinned runtime versions current through pull requests
#[derive(Parser, Debug, Clone)]
#[command(
    name = "autobump",
    version,
    about = "Keep pinned runtime versions current through pull requests"
)]
pub struct CliArgs {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - decision line only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Probe upstream for newer patch releases and reconcile pull requests
    Runtime(RunArgs),

    /// Replay the version changes of a commit from another checkout
    Port(PortArgs),

    /// Print the latest available version of every tracked component
    Probe(ProbeArgs),
}

/// Options shared by commands that may open or merge pull requests
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Project name from the configuration file
    pub project: String,

    /// Credential profile
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Merge an equivalent open PR once its checks pass
    #[arg(long)]
    pub auto_merge: bool,

    /// Dry run mode - report the decision without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PortArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Checkout containing the source commit
    #[arg(long)]
    pub from: PathBuf,

    /// Commit whose version changes are replayed
    #[arg(long)]
    pub commit: String,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Project name from the configuration file
    pub project: String,

    /// Credential profile
    #[arg(short, long)]
    pub profile: Option<String>,
}

impl CliArgs {
    /// Log filter directive derived from the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }

    /// Whether to color text output; never when stdout is not a terminal
    pub fn use_color(&self, stdout_is_terminal: bool) -> bool {
        !self.no_color && stdout_is_terminal
    }

    /// Whether to draw progress spinners
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
