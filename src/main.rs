//! Stint: sequential benchmark harness for external programs.
//!
//! This is the main entry point for the `stint` CLI. It parses arguments,
//! runs the benchmark described by the configuration file, and maps errors
//! to distinct exit codes.

mod cli;
mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod exec;
pub mod exit_codes;
pub mod placeholder;
pub mod report;
pub mod results;
pub mod runner;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::cmd_run(&cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
