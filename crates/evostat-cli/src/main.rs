//! evostat CLI - aggregate and compare evolutionary-algorithm experiment logs.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use evostat_core::schema::TimeAxis;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "evostat")]
#[command(author, version, about = "evostat - Streaming statistics over evolutionary-algorithm logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default evostat.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Aggregate one or more logs and write the result tables
    Analyze(commands::analyze::AnalyzeArgs),

    /// Show the algorithm roster declared in a log's header
    Header {
        /// Log file
        path: PathBuf,
    },
}

/// Time axis selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AxisArg {
    Iteration,
    Generation,
}

impl From<AxisArg> for TimeAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Iteration => TimeAxis::Iteration,
            AxisArg::Generation => TimeAxis::Generation,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Analyze(args) => commands::analyze::run(args, cli.verbose),
        Commands::Header { path } => commands::header::run(&path),
    }
}
