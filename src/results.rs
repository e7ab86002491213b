//! In-memory result model.
//!
//! The orchestrator feeds one [`SingleRunResult`] per benchmarked invocation
//! into the [`ResultStore`], in traversal order (file-major, then
//! configuration, then repetition). The store is append-only; derived
//! groupings and means are computed on demand by [`ResultStore::aggregate`]
//! and never mutate the store, so aggregation is idempotent by construction.

use crate::config::types::AveragePolicy;

/// Mean value exported for a (file, configuration) pair with no repetitions
/// eligible under the average policy.
pub const MEAN_SENTINEL: f64 = -1.0;

/// Outcome of one benchmarked invocation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleRunResult {
    /// Name of the run configuration that produced this measurement.
    pub config_name: String,

    /// Input file path as given, not normalized further.
    pub input_file: String,

    /// Wall-clock runtime in seconds. For timed-out invocations this is
    /// approximately the configured timeout bound.
    pub elapsed_seconds: f64,

    /// Exit code; `None` is the sentinel for a process that was killed or
    /// could not be waited on. Only meaningful when `timed_out` is false.
    pub exit_code: Option<i32>,

    /// Whether the invocation was killed at the deadline.
    pub timed_out: bool,
}

impl SingleRunResult {
    /// Whether this repetition finished on its own with exit code 0.
    pub fn finished_cleanly(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Append-only collection of all measurements of a run.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: Vec<SingleRunResult>,
    measurements: usize,
    timeouts: usize,
    errors: usize,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation outcome. Amortized O(1).
    pub fn record(&mut self, result: SingleRunResult) {
        self.measurements += 1;
        if result.timed_out {
            self.timeouts += 1;
        } else if result.exit_code != Some(0) {
            self.errors += 1;
        }
        self.results.push(result);
    }

    /// All recorded results in ingestion order.
    pub fn results(&self) -> &[SingleRunResult] {
        &self.results
    }

    /// Total number of recorded measurements.
    pub fn measurements(&self) -> usize {
        self.measurements
    }

    /// Number of measurements that hit the deadline.
    pub fn timeouts(&self) -> usize {
        self.timeouts
    }

    /// Number of measurements that exited nonzero (or could not be waited
    /// on) without timing out.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Build the derived per-(file, configuration) groupings and means.
    ///
    /// Pure: safe to call any number of times, always yielding the same
    /// tables for the same store contents. File order is ingestion order,
    /// configuration order within a file is first-seen order, repetition
    /// order is preserved.
    pub fn aggregate(&self, policy: AveragePolicy) -> Aggregates {
        let mut files: Vec<FileAggregate> = Vec::new();

        for result in &self.results {
            let file_index = match files
                .iter()
                .position(|f| f.input_file == result.input_file)
            {
                Some(index) => index,
                None => {
                    files.push(FileAggregate {
                        input_file: result.input_file.clone(),
                        configs: Vec::new(),
                    });
                    files.len() - 1
                }
            };
            let file = &mut files[file_index];

            let series_index = match file
                .configs
                .iter()
                .position(|series| series.name == result.config_name)
            {
                Some(index) => index,
                None => {
                    file.configs.push(ConfigSeries {
                        name: result.config_name.clone(),
                        runs: Vec::new(),
                        mean_runtime: MEAN_SENTINEL,
                    });
                    file.configs.len() - 1
                }
            };

            file.configs[series_index].runs.push(result.clone());
        }

        for file in &mut files {
            for series in &mut file.configs {
                series.mean_runtime = mean_elapsed(&series.runs, policy);
            }
        }

        Aggregates { files }
    }
}

/// All repetitions of one (file, configuration) pair, in repetition order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSeries {
    pub name: String,
    pub runs: Vec<SingleRunResult>,
    pub mean_runtime: f64,
}

/// Per-file grouping of configuration series.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAggregate {
    pub input_file: String,
    pub configs: Vec<ConfigSeries>,
}

/// Derived tables for export.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub files: Vec<FileAggregate>,
}

impl Aggregates {
    /// Every configuration name seen, sorted lexicographically. Reports use
    /// this order for their columns regardless of execution order.
    pub fn config_names_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for file in &self.files {
            for series in &file.configs {
                if !names.contains(&series.name) {
                    names.push(series.name.clone());
                }
            }
        }
        names.sort();
        names
    }
}

fn mean_elapsed(runs: &[SingleRunResult], policy: AveragePolicy) -> f64 {
    let eligible: Vec<f64> = runs
        .iter()
        .filter(|run| match policy {
            AveragePolicy::All => true,
            AveragePolicy::Finished => run.finished_cleanly(),
        })
        .map(|run| run.elapsed_seconds)
        .collect();

    if eligible.is_empty() {
        return MEAN_SENTINEL;
    }

    eligible.iter().sum::<f64>() / eligible.len() as f64
}
