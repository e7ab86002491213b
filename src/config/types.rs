//! Validated configuration model handed to the core.
//!
//! Everything in here is immutable once built by [`super::Config::load`];
//! the orchestrator, executor and exporter never see the raw YAML shapes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One named command template benchmarked against every input file.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// Unique name, used in reports and placeholder substitution.
    pub name: String,

    /// Main command as an ordered argument vector. Elements may contain
    /// placeholders; the benchmarked input file is appended as the final
    /// argument unless a file placeholder already positions it.
    pub main_command: Vec<String>,

    /// Setup commands run once per (file, configuration) pair, before the
    /// timed repetitions. Not recorded as data; failure aborts the run.
    pub pre_round_commands: Vec<Vec<String>>,

    /// Teardown commands run once per (file, configuration) pair, after the
    /// timed repetitions. Same failure semantics as pre-round commands.
    pub post_round_commands: Vec<Vec<String>>,
}

/// Maintenance command group fired after every K processed files.
#[derive(Debug, Clone)]
pub struct PeriodicCommands {
    /// Cadence: run the group after every this many files. Always >= 1.
    pub every_files: usize,

    /// The command group, run in order via the process executor.
    pub commands: Vec<Vec<String>>,
}

/// Policy for the per-(file, configuration) mean elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AveragePolicy {
    /// Every recorded repetition counts, including timeouts and nonzero
    /// exits (reference behavior, default).
    #[default]
    All,
    /// Only repetitions that finished with exit code 0 count; a pair with
    /// no finished repetition reports the -1 sentinel.
    Finished,
}

impl AveragePolicy {
    /// Parse an average policy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

/// Destination path templates for the three report files.
///
/// Each report is produced only if its path is configured. Paths may use
/// the `@date@` placeholder.
#[derive(Debug, Clone, Default)]
pub struct ReportPaths {
    /// Raw table: one row per recorded invocation.
    pub raw: Option<String>,

    /// Per-file x per-configuration matrix.
    pub per_config: Option<String>,

    /// Per-file average runtimes.
    pub averages: Option<String>,
}

impl ReportPaths {
    /// Whether any report output is configured at all.
    pub fn any_enabled(&self) -> bool {
        self.raw.is_some() || self.per_config.is_some() || self.averages.is_some()
    }
}

/// The full validated run matrix: what to run, how often, and under which
/// global settings.
#[derive(Debug, Clone)]
pub struct RunMatrix {
    /// Run configurations in execution order. Order is significant: it
    /// defines traversal order, and reports sort the names separately.
    pub configurations: Vec<RunConfiguration>,

    /// Timed repetitions per (file, configuration) pair. Always >= 1.
    pub repetitions: usize,

    /// Per-invocation wall-clock bound. Absent means unbounded wait.
    pub timeout: Option<Duration>,

    /// When set and no file template is configured, child output is
    /// inherited by the harness instead of discarded.
    pub print_output: bool,

    /// Optional stdout filename template for benchmarked invocations.
    pub stdout_file: Option<String>,

    /// Optional stderr filename template for benchmarked invocations.
    pub stderr_file: Option<String>,

    /// Optional periodic maintenance command group.
    pub periodic: Option<PeriodicCommands>,

    /// How per-pair mean runtimes treat timed-out or errored repetitions.
    pub average_policy: AveragePolicy,
}
