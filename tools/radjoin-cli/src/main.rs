//! radjoin command line interface
//!
//! Runs approximate radius self-joins over binary dataset files.

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{info, join, scan};
use crate::error::Result;

/// radjoin command line interface
///
/// Find all pairs of points within a radius of each other, approximately
/// and with far fewer distance computations than a full scan.
#[derive(Parser, Debug)]
#[command(name = "radjoin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the dataset file
    #[arg(short, long, env = "RADJOIN_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Text,
    /// JSON document
    Json,
}

/// Candidate index used by the join
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IndexKind {
    /// Euclidean locality-sensitive hashing
    Lsh,
    /// Every point is a candidate of every other point
    Brute,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the approximate radius self-join
    Join(join::JoinArgs),

    /// Run the exact linear-scan join
    Scan {
        /// Distance threshold
        #[arg(short, long)]
        radius: f32,

        /// Print every pair found
        #[arg(long)]
        pairs: bool,
    },

    /// Show the dataset header
    Info,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("radjoin=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Join(args) => join::run(cli.data.as_deref(), &args, cli.format),
        Commands::Scan { radius, pairs } => scan::run(cli.data.as_deref(), radius, pairs, cli.format),
        Commands::Info => info::run(cli.data.as_deref(), cli.format),
    }
}
