//! Cyrisk CLI - command line operations for the risk engine.
//!
//! # Commands
//!
//! - `cyrisk run <file>` - simulate a scenario or portfolio document
//! - `cyrisk plan <file>` - resolve a portfolio and print the plan report
//! - `cyrisk check` - print build/configuration information
//!
//! The service layer stays thin: document parsing, FX config loading and
//! output formatting live here; everything with algorithmic content lives
//! in the engine crates.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod fx;
mod output;

pub use error::{CliError, Result};

/// Cyrisk risk engine CLI
#[derive(Parser)]
#[command(name = "cyrisk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// FX configuration file path (JSON)
    #[arg(long, global = true)]
    fx_config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a scenario or portfolio document
    Run {
        /// Path to the document (portfolio detected by its `portfolio` key)
        file: String,

        /// Number of Monte Carlo trials
        #[arg(short = 'n', long, default_value = "10000")]
        runs: usize,

        /// Seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format (text, json, envelope)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Resolve a portfolio into an execution plan and print the report
    Plan {
        /// Path to the portfolio document
        file: String,
    },

    /// Check build and configuration
    Check,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let fx = fx::load_fx_config(cli.fx_config.as_deref());

    match cli.command {
        Commands::Run {
            file,
            runs,
            seed,
            format,
        } => commands::run::run(&file, runs, seed, &format, fx),
        Commands::Plan { file } => commands::plan::run(&file),
        Commands::Check => commands::check::run(fx),
    }
}
