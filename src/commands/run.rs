//! The run driver: configuration to reports, end to end.
//!
//! Wires the collaborators together in order: load and validate the config,
//! resolve the input file list, run the full traversal, aggregate, export.
//! The run date is captured exactly once here and threaded through every
//! placeholder context, so all substitutions in one run agree on it.

use crate::cli::Cli;
use crate::config::Config;
use crate::discovery;
use crate::error::Result;
use crate::events::RunJournal;
use crate::placeholder::{self, PlaceholderContext, RUN_DATE_FORMAT};
use crate::report;
use crate::results::ResultStore;
use crate::runner::RunOrchestrator;
use chrono::Local;
use std::path::PathBuf;

/// Execute a full benchmark run as described by the CLI arguments.
pub fn cmd_run(cli: &Cli) -> Result<()> {
    print_header();

    let run_date = Local::now().format(RUN_DATE_FORMAT).to_string();

    let config = Config::load(&cli.config_file)?;
    let files = discovery::collect_input_files(&config)?;
    print_info(&config, &files, cli.list_files || config.list_files);

    let date_ctx = PlaceholderContext::new(&run_date);
    let mut journal = match &config.event_log {
        Some(template) => {
            let path = PathBuf::from(placeholder::resolve(template, &date_ctx));
            Some(RunJournal::open(&path)?)
        }
        None => None,
    };

    let store = RunOrchestrator::new(
        &config.matrix,
        &files,
        &run_date,
        config.check_files,
        journal.as_mut(),
    )
    .run()?;

    export_reports(&config, &store, &date_ctx)?;
    print_summary(&store);

    Ok(())
}

/// Render every configured report. Aggregation runs once here, after the
/// traversal is complete and before anything is written.
fn export_reports(
    config: &Config,
    store: &ResultStore,
    date_ctx: &PlaceholderContext<'_>,
) -> Result<()> {
    if !config.reports.any_enabled() {
        return Ok(());
    }

    let aggregates = store.aggregate(config.matrix.average_policy);

    if let Some(template) = &config.reports.raw {
        let path = PathBuf::from(placeholder::resolve(template, date_ctx));
        report::write_raw_table(store, &path)?;
        println!("Wrote raw timings to '{}'.", path.display());
    }

    if let Some(template) = &config.reports.per_config {
        let path = PathBuf::from(placeholder::resolve(template, date_ctx));
        report::write_per_config_matrix(&aggregates, config.matrix.repetitions, &path)?;
        println!("Wrote per-configuration timings to '{}'.", path.display());
    }

    if let Some(template) = &config.reports.averages {
        let path = PathBuf::from(placeholder::resolve(template, date_ctx));
        report::write_averages(&aggregates, &path)?;
        println!("Wrote average timings to '{}'.", path.display());
    }

    Ok(())
}

fn print_header() {
    println!();
    println!("stint benchmark runner");
    println!("----------------------");
    println!();
}

fn print_info(config: &Config, files: &[PathBuf], list_files: bool) {
    println!("Configuration:");
    let names: Vec<&str> = config
        .matrix
        .configurations
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    println!("    Run configurations: {}", names.join(", "));
    println!("    Repetitions: {}", config.matrix.repetitions);
    match config.matrix.timeout {
        Some(timeout) => println!("    Timeout: {} seconds", timeout.as_secs()),
        None => println!("    Timeout: none"),
    }
    println!("    Print process output: {}", config.matrix.print_output);
    println!();

    println!("{} file(s) included in the benchmark.", files.len());
    if list_files {
        for file in files {
            println!("    {}", file.display());
        }
    }
    println!();
}

fn print_summary(store: &ResultStore) {
    println!("Collected {} data points.", store.measurements());
    if store.timeouts() > 0 {
        println!("{} measurement(s) hit the timeout.", store.timeouts());
    }
    if store.errors() > 0 {
        println!("{} measurement(s) exited with a nonzero code.", store.errors());
    }
}
