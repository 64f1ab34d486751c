//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use repo_params::defaults::ROOT_ENV_VAR;
use repo_params::output::{ColorWhen, OutputConfig};

use crate::commands;

/// Repository Parameters - Compare pipeline parameters across git revisions
#[derive(Parser, Debug)]
#[command(name = "repo-params")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Repository root. Defaults to the current directory.
    #[arg(long, global = true, value_name = "DIR", env = ROOT_ENV_VAR)]
    repo: Option<PathBuf>,

    /// Colorize output
    #[arg(long, global = true, value_name = "WHEN", value_enum, default_value_t = ColorWhen::Auto)]
    color: ColorWhen,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: LevelFilter,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show parameters of the workspace and selected revisions
    Show(commands::show::ShowArgs),

    /// Show parameter changes between two revisions
    Diff(commands::diff::DiffArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub repo_root: PathBuf,
    pub output: OutputConfig,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level);

        let output = OutputConfig::from_env_and_flag(self.color);
        output.apply();

        let globals = GlobalOptions {
            repo_root: self
                .repo
                .unwrap_or_else(repo_params::defaults::default_repo_root),
            output,
        };

        match self.command {
            Commands::Show(args) => commands::show::execute(args, &globals),
            Commands::Diff(args) => commands::diff::execute(args, &globals),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A logger may already be installed when embedded
    let _ = builder.try_init();
}
