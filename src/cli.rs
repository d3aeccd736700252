use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "eventprint",
    version,
    about = "Carbon footprint of event travel"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the footprint of one submission (JSON or YAML file)
    Estimate { file: PathBuf },
    /// Aggregate an event's submissions into totals and breakdowns
    Report { file: PathBuf },
    /// List the emission factors in use
    Factors,
    /// Write a default config file
    Init {
        /// Destination (defaults to ~/.config/eventprint/config.yaml)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
