//! Sequential run orchestration.
//!
//! Walks files x configurations x repetitions in a fixed order: files in
//! discovery order (outer), configurations in matrix order (middle),
//! repetitions increasing (inner). Report export assumes this order, so it
//! is part of the contract. No two invocations ever overlap in time.
//!
//! Per (file, configuration) pair the orchestrator runs pre-round commands,
//! then exactly `repetitions` timed main-command invocations, then
//! post-round commands. Outcomes of the timed invocations are data and never
//! abort the run; pre/post-round commands are trusted setup steps whose
//! failure invalidates every later measurement of the pair and therefore
//! aborts everything.

#[cfg(test)]
mod tests;

use crate::config::types::{PeriodicCommands, RunConfiguration, RunMatrix};
use crate::error::{HarnessError, Result};
use crate::events::{Event, EventAction, RunJournal};
use crate::exec::{self, OutputSink};
use crate::placeholder::{self, PlaceholderContext};
use crate::results::{ResultStore, SingleRunResult};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Sequential driver for one benchmark run.
pub struct RunOrchestrator<'a> {
    matrix: &'a RunMatrix,
    files: &'a [PathBuf],
    run_date: &'a str,
    check_files: bool,
    journal: Option<&'a mut RunJournal>,
    store: ResultStore,
    jobs_issued: usize,
    jobs_total: usize,
}

impl<'a> RunOrchestrator<'a> {
    pub fn new(
        matrix: &'a RunMatrix,
        files: &'a [PathBuf],
        run_date: &'a str,
        check_files: bool,
        journal: Option<&'a mut RunJournal>,
    ) -> Self {
        let jobs_total = files.len() * matrix.configurations.len() * matrix.repetitions;
        Self {
            matrix,
            files,
            run_date,
            check_files,
            journal,
            store: ResultStore::new(),
            jobs_issued: 0,
            jobs_total,
        }
    }

    /// Execute the full traversal and return the filled result store.
    pub fn run(mut self) -> Result<ResultStore> {
        if self.check_files {
            self.check_input_files()?;
        }

        self.journal_event(
            Event::new(EventAction::RunStarted).with_details(json!({
                "files": self.files.len(),
                "configurations": self.matrix.configurations.len(),
                "repetitions": self.matrix.repetitions,
            })),
        )?;

        let matrix = self.matrix;
        let files = self.files;

        let mut files_done = 0usize;
        for file in files {
            for config in &matrix.configurations {
                self.run_round(file, config)?;
            }

            files_done += 1;
            if let Some(periodic) = &matrix.periodic {
                if files_done % periodic.every_files == 0 {
                    self.run_periodic(periodic)?;
                }
            }
        }

        self.journal_event(
            Event::new(EventAction::RunFinished).with_details(json!({
                "measurements": self.store.measurements(),
                "timeouts": self.store.timeouts(),
                "errors": self.store.errors(),
            })),
        )?;

        Ok(self.store)
    }

    /// Verify every input file is readable before any process is spawned.
    fn check_input_files(&self) -> Result<()> {
        for file in self.files {
            let metadata = fs::metadata(file).map_err(|e| {
                HarnessError::Setup(format!(
                    "input file '{}' is not accessible: {}",
                    file.display(),
                    e
                ))
            })?;
            if !metadata.is_file() {
                return Err(HarnessError::Setup(format!(
                    "input '{}' is not a regular file",
                    file.display()
                )));
            }
        }
        Ok(())
    }

    /// One (file, configuration) pair: pre-round, N measurements, post-round.
    fn run_round(&mut self, file: &Path, config: &'a RunConfiguration) -> Result<()> {
        for command in &config.pre_round_commands {
            self.run_setup_command(command, file, config, "pre-round")?;
        }

        for repetition in 0..self.matrix.repetitions {
            self.run_measurement(file, config, repetition)?;
        }

        for command in &config.post_round_commands {
            self.run_setup_command(command, file, config, "post-round")?;
        }

        Ok(())
    }

    /// Run a trusted setup/teardown command. Not recorded as data; any
    /// failure aborts the whole run.
    fn run_setup_command(
        &mut self,
        command: &[String],
        file: &Path,
        config: &RunConfiguration,
        stage: &str,
    ) -> Result<()> {
        let ctx = PlaceholderContext::new(self.run_date)
            .with_file(file)
            .with_config_name(&config.name);
        let argv = resolve_command(command, &ctx);

        let outcome = exec::execute(
            &argv,
            self.matrix.timeout,
            OutputSink::Inherit,
            OutputSink::Inherit,
        )
        .map_err(|e| {
            HarnessError::Setup(format!(
                "{} command for '{}' on '{}' could not run: {}",
                stage,
                config.name,
                file.display(),
                e
            ))
        })?;

        if outcome.timed_out {
            return Err(HarnessError::Setup(format!(
                "{} command for '{}' on '{}' timed out",
                stage,
                config.name,
                file.display()
            )));
        }
        if !outcome.is_success() {
            return Err(HarnessError::Setup(format!(
                "{} command for '{}' on '{}' exited with code {}",
                stage,
                config.name,
                file.display(),
                outcome.exit_code.unwrap_or(-1)
            )));
        }

        Ok(())
    }

    /// One timed main-command invocation. Always records exactly one result;
    /// a timeout or nonzero exit is a data point, never an abort.
    fn run_measurement(
        &mut self,
        file: &Path,
        config: &RunConfiguration,
        repetition: usize,
    ) -> Result<()> {
        let ctx = PlaceholderContext::new(self.run_date)
            .with_file(file)
            .with_repetition(repetition)
            .with_config_name(&config.name);

        let mut argv = resolve_command(&config.main_command, &ctx);

        // The input file goes last unless a placeholder already positions it.
        let positions_file = config
            .main_command
            .iter()
            .any(|arg| placeholder::mentions_input_file(arg));
        if !positions_file {
            argv.push(file.display().to_string());
        }

        self.jobs_issued += 1;
        println!(
            "[{}/{}] Running '{}' repetition {} of {}...",
            self.jobs_issued,
            self.jobs_total,
            argv.join(" "),
            repetition + 1,
            self.matrix.repetitions
        );

        let stdout = sink_for(
            self.matrix.stdout_file.as_deref(),
            self.matrix.print_output,
            &ctx,
        );
        let stderr = sink_for(
            self.matrix.stderr_file.as_deref(),
            self.matrix.print_output,
            &ctx,
        );

        let outcome = exec::execute(&argv, self.matrix.timeout, stdout, stderr)?;

        if outcome.timed_out {
            println!("Process was killed due to timeout!");
        } else if !outcome.is_success() {
            println!(
                "Process failed with nonzero exit code {}!",
                outcome.exit_code.unwrap_or(-1)
            );
        }
        println!(
            "Time elapsed: {:.3} seconds",
            outcome.elapsed.as_secs_f64()
        );
        println!();

        self.journal_event(
            Event::new(EventAction::Invocation).with_details(json!({
                "file": file.display().to_string(),
                "configuration": config.name,
                "repetition": repetition,
                "elapsed_seconds": outcome.elapsed.as_secs_f64(),
                "exit_code": outcome.exit_code,
                "timed_out": outcome.timed_out,
            })),
        )?;

        self.store.record(SingleRunResult {
            config_name: config.name.clone(),
            input_file: file.display().to_string(),
            elapsed_seconds: outcome.elapsed.as_secs_f64(),
            exit_code: outcome.exit_code,
            timed_out: outcome.timed_out,
        });

        Ok(())
    }

    /// Run the periodic maintenance command group. Observational only:
    /// failures (including launch failures) are logged, never stored and
    /// never fatal.
    fn run_periodic(&mut self, periodic: &PeriodicCommands) -> Result<()> {
        println!("Running periodic maintenance commands...");

        for command in &periodic.commands {
            let ctx = PlaceholderContext::new(self.run_date);
            let argv = resolve_command(command, &ctx);

            let detail = match exec::execute(
                &argv,
                self.matrix.timeout,
                OutputSink::Inherit,
                OutputSink::Inherit,
            ) {
                Ok(outcome) => {
                    if !outcome.is_success() {
                        println!(
                            "Warning: maintenance command '{}' did not succeed (timeout: {}, exit code: {}).",
                            argv.join(" "),
                            outcome.timed_out,
                            outcome.exit_code.unwrap_or(-1)
                        );
                    }
                    json!({
                        "command": argv,
                        "elapsed_seconds": outcome.elapsed.as_secs_f64(),
                        "exit_code": outcome.exit_code,
                        "timed_out": outcome.timed_out,
                    })
                }
                Err(e) => {
                    println!(
                        "Warning: maintenance command '{}' could not run: {}",
                        argv.join(" "),
                        e
                    );
                    json!({
                        "command": argv,
                        "error": e.to_string(),
                    })
                }
            };

            self.journal_event(Event::new(EventAction::Periodic).with_details(detail))?;
        }

        Ok(())
    }

    fn journal_event(&mut self, event: Event) -> Result<()> {
        if let Some(journal) = self.journal.as_deref_mut() {
            journal.append(&event)?;
        }
        Ok(())
    }
}

fn resolve_command(command: &[String], ctx: &PlaceholderContext<'_>) -> Vec<String> {
    command
        .iter()
        .map(|arg| placeholder::resolve(arg, ctx))
        .collect()
}

/// Pick the sink for one child stream: a configured template resolves to a
/// file; otherwise output is inherited when `print_output` is set, else
/// discarded.
fn sink_for(
    template: Option<&str>,
    print_output: bool,
    ctx: &PlaceholderContext<'_>,
) -> OutputSink {
    match template {
        Some(template) => OutputSink::File(PathBuf::from(placeholder::resolve(template, ctx))),
        None if print_output => OutputSink::Inherit,
        None => OutputSink::Discard,
    }
}
