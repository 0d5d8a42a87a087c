//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// junctiond - intersection traversal coordinator
#[derive(Parser)]
#[command(
    name = "junctiond",
    about = "Coordinates vehicle control across road intersections",
    version,
    after_help = "Logs are written to: ~/.local/share/junctiond/logs/junctiond.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the coordinator on the stdio transport
    Run,

    /// Print the resolved turn profiles and exit
    Profiles,
}
