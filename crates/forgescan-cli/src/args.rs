use crate::types::LogLevel;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "forgescan")]
#[command(
    about = "Find errors, retries, corrections and clean workflows in agent session logs",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Directory holding one sub-directory per project (default: ~/.claude/projects)
    #[arg(long, global = true)]
    pub corpus: Option<String>,

    /// Configuration file (default: <config dir>/forgescan/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List all projects with session and line counts")]
    ListProjects,

    #[command(about = "List the sessions of projects matching a filter")]
    ListSessions {
        /// Case-insensitive substring of the project directory or decoded path
        project_filter: String,
    },

    #[command(about = "Scan every session for patterns and rank the most interesting ones")]
    Scan {
        #[arg(long)]
        project: Option<String>,

        /// Keep sessions starting on or after this date (YYYY-MM-DD)
        #[arg(long)]
        after: Option<String>,

        /// Keep sessions starting on or before this date (YYYY-MM-DD)
        #[arg(long)]
        before: Option<String>,
    },

    #[command(about = "Extract the messages around every pattern hit of one session")]
    Extract {
        session_id: String,

        /// Project directory to look in first
        project_dir: String,

        /// Messages of context on each side of a hit
        #[arg(long)]
        context: Option<usize>,
    },
}
