//! CLI argument parsing for stint.
//!
//! Uses clap derive macros for declarative argument definitions. The actual
//! run driver lives in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

/// Stint: sequential benchmark harness for external programs.
///
/// Runs every configured command against every input file for a fixed
/// number of repetitions, enforces a per-invocation wall-clock timeout
/// (killing the whole process tree on expiry), and exports timing reports.
#[derive(Parser, Debug)]
#[command(name = "stint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file for this run.
    pub config_file: PathBuf,

    /// Print every input file included in the benchmark before running.
    #[arg(long)]
    pub list_files: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
