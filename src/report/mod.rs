//! Report export.
//!
//! Renders the result store into up to three delimiter-separated text files.
//! The header strings are reproduced verbatim for compatibility with
//! downstream analysis tooling; any change here breaks existing consumers.
//!
//! Lines are flushed as they are written so a tailing observer sees partial
//! progress. There is no transactional guarantee: a crash mid-export can
//! leave a partially written file.


use crate::error::{HarnessError, Result};
use crate::results::{Aggregates, ConfigSeries, ResultStore, SingleRunResult, MEAN_SENTINEL};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header of the raw table. Must stay bit-for-bit stable.
pub const RAW_HEADER: &str = "runtime [s]; input file; run configuration; exit code; timeout";

/// Write the raw table: one row per recorded invocation, in ingestion order
/// (file-major, then configuration, then repetition).
pub fn write_raw_table(store: &ResultStore, path: &Path) -> Result<()> {
    let mut writer = ReportWriter::create(path)?;
    writer.write_line(RAW_HEADER)?;

    for result in store.results() {
        writer.write_line(&format!(
            "{};{};{};{};{}",
            result.elapsed_seconds,
            result.input_file,
            result.config_name,
            exit_code_cell(result),
            result.timed_out
        ))?;
    }

    Ok(())
}

/// Write the per-file x per-configuration matrix.
///
/// Columns are grouped per configuration, sorted lexicographically by name;
/// rows come `repetitions` consecutive per file, one per repetition index.
pub fn write_per_config_matrix(
    aggregates: &Aggregates,
    repetitions: usize,
    path: &Path,
) -> Result<()> {
    let names = aggregates.config_names_sorted();

    let mut header = vec!["input file".to_string()];
    for name in &names {
        header.push(format!("{}, runtime [s]", name));
        header.push(format!("{}, exit condition", name));
        header.push(format!("{}, timeout", name));
    }

    let mut writer = ReportWriter::create(path)?;
    writer.write_line(&header.join(";"))?;

    for file in &aggregates.files {
        for repetition in 0..repetitions {
            let mut cells = vec![file.input_file.clone()];
            for name in &names {
                match series_run(&file.configs, name, repetition) {
                    Some(run) => {
                        cells.push(run.elapsed_seconds.to_string());
                        cells.push(exit_code_cell(run));
                        cells.push(run.timed_out.to_string());
                    }
                    None => {
                        // Incomplete pair; visible sentinels instead of a
                        // silently shifted row.
                        cells.push(MEAN_SENTINEL.to_string());
                        cells.push((-1).to_string());
                        cells.push(false.to_string());
                    }
                }
            }
            writer.write_line(&cells.join(";"))?;
        }
    }

    Ok(())
}

/// Write the per-file average runtimes, one row per file.
pub fn write_averages(aggregates: &Aggregates, path: &Path) -> Result<()> {
    let names = aggregates.config_names_sorted();

    let mut header = vec!["input file".to_string()];
    for name in &names {
        header.push(format!("{}, average runtime [s]", name));
    }

    let mut writer = ReportWriter::create(path)?;
    writer.write_line(&header.join(";"))?;

    for file in &aggregates.files {
        let mut cells = vec![file.input_file.clone()];
        for name in &names {
            let mean = file
                .configs
                .iter()
                .find(|series| &series.name == name)
                .map(|series| series.mean_runtime)
                .unwrap_or(MEAN_SENTINEL);
            cells.push(mean.to_string());
        }
        writer.write_line(&cells.join(";"))?;
    }

    Ok(())
}

fn exit_code_cell(result: &SingleRunResult) -> String {
    match result.exit_code {
        Some(code) => code.to_string(),
        None => (-1).to_string(),
    }
}

fn series_run<'a>(
    configs: &'a [ConfigSeries],
    name: &str,
    repetition: usize,
) -> Option<&'a SingleRunResult> {
    configs
        .iter()
        .find(|series| series.name == name)
        .and_then(|series| series.runs.get(repetition))
}

/// Line-oriented report file handle.
struct ReportWriter {
    path: PathBuf,
    file: File,
}

impl ReportWriter {
    /// Create the report file, creating parent directories as needed.
    fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    HarnessError::Write(format!(
                        "failed to create report directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            HarnessError::Write(format!(
                "failed to create report file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Write one record and flush it.
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.file, "{}", line).map_err(|e| {
            HarnessError::Write(format!(
                "failed to write report file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        self.file.flush().map_err(|e| {
            HarnessError::Write(format!(
                "failed to flush report file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}
