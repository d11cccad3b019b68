//! Command line shell for the gleaner keyword-combination paper search.
//!
//! This crate wraps the `gleaner` library in a small CLI. It supports:
//! - Writing a default settings file
//! - Searching keyword combinations and listing the deduplicated DOIs
//! - Full runs that download what they can and merge it into one PDF
//! - Merging local PDFs
//!
//! # Usage
//!
//! ```bash
//! # Write default settings to the platform config directory
//! gleaner init
//!
//! # List DOIs whose titles match every combination of the groups
//! gleaner search -k "laugh humor" -k "social evolution" --min-citations 10
//!
//! # Search, download and merge into ./out
//! gleaner run -k "laugh humor" -k "social evolution" --out ./out
//!
//! # Merge PDFs already on disk
//! gleaner merge a.pdf b.pdf -o merged.pdf
//! ```
//!
//! Progress is printed as it happens. Use `-v` (repeatable) to turn on logging.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  path::PathBuf,
  sync::atomic::{AtomicU32, Ordering},
};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use gleaner::{
  config::Settings, error::GleanerError, expand::CandidateSet, pipeline::RunOutcome, prelude::*,
  Gleaner,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Search papers by keyword combinations and merge what is found")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so they never mix with command output.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Entry point for the gleaner CLI application
///
/// Handles command line argument parsing, sets up logging, and executes the requested command.
///
/// # Errors
///
/// Returns `GleanerdError` for various failure conditions including:
/// - Invalid settings or keyword groups
/// - Settings files that cannot be read or written
/// - Nothing left to merge
/// - User interaction errors
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);
  trace!("Parsed command line");

  let terminal = Terminal::new(cli.accept_defaults);
  let result = match cli.command {
    Commands::Init(args) => init(&terminal, args).await,
    Commands::Search(args) => search(&terminal, args).await,
    Commands::Run(args) => run(&terminal, args).await,
    Commands::Merge(args) => merge(&terminal, args).await,
  };

  if let Err(e) = &result {
    eprintln!("{} {}", style(ERROR_PREFIX).red(), style(e).red());
  }
  result
}
