//! Configuration loading for stint.
//!
//! The configuration file is YAML. Parsing is forward-compatible (unknown
//! fields are ignored) and every command line is written as a single string,
//! split into an argument vector with shell-words during validation. The
//! result is an immutable, validated [`Config`]; the core components never
//! re-check what validation already established (unique configuration names,
//! positive repetitions, parseable commands).

pub mod types;

use crate::error::{HarnessError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use types::{AveragePolicy, PeriodicCommands, ReportPaths, RunConfiguration, RunMatrix};

/// Fully validated harness configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Folder searched recursively for input files. Ignored when `files`
    /// is non-empty.
    pub test_folder: Option<PathBuf>,

    /// Input file extension filter for discovery (e.g. `.sil`).
    pub file_extension: Option<String>,

    /// Glob patterns excluding discovered files.
    pub ignore: Vec<String>,

    /// Explicit ordered input file list, bypassing discovery.
    pub files: Vec<PathBuf>,

    /// Verify every input file is readable before the run starts.
    pub check_files: bool,

    /// Print the resolved input file list before running.
    pub list_files: bool,

    /// Optional NDJSON run journal path template.
    pub event_log: Option<String>,

    /// Report destinations.
    pub reports: ReportPaths,

    /// The validated run matrix.
    pub matrix: RunMatrix,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!(
                "unable to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let raw: RawConfig = serde_yaml::from_str(&contents).map_err(|e| {
            HarnessError::Config(format!(
                "unable to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        raw.validate()
    }
}

// ============================================================================
// Raw YAML shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    test_folder: Option<PathBuf>,
    #[serde(default)]
    file_extension: Option<String>,
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default = "default_repetitions")]
    repetitions: usize,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    print_output: bool,
    #[serde(default)]
    stdout_file: Option<String>,
    #[serde(default)]
    stderr_file: Option<String>,
    #[serde(default)]
    check_files: bool,
    #[serde(default)]
    list_files: bool,
    #[serde(default)]
    average_policy: AveragePolicy,
    #[serde(default)]
    event_log: Option<String>,
    #[serde(default)]
    reports: RawReports,
    #[serde(default)]
    periodic: Option<RawPeriodic>,
    #[serde(default)]
    run_configurations: Vec<RawRunConfiguration>,
}

fn default_repetitions() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct RawRunConfiguration {
    #[serde(default)]
    name: Option<String>,
    command: String,
    #[serde(default)]
    pre_round: Vec<String>,
    #[serde(default)]
    post_round: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPeriodic {
    every_files: usize,
    #[serde(default)]
    commands: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawReports {
    #[serde(default)]
    raw: Option<String>,
    #[serde(default)]
    per_config: Option<String>,
    #[serde(default)]
    averages: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

impl RawConfig {
    fn validate(self) -> Result<Config> {
        if self.run_configurations.is_empty() {
            return Err(HarnessError::Config(
                "config defines no run_configurations; nothing to benchmark".to_string(),
            ));
        }

        if self.repetitions == 0 {
            return Err(HarnessError::Config(
                "repetitions must be a positive integer".to_string(),
            ));
        }

        if self.files.is_empty() && self.test_folder.is_none() {
            return Err(HarnessError::Config(
                "config must set either test_folder or an explicit files list".to_string(),
            ));
        }

        let mut configurations = Vec::with_capacity(self.run_configurations.len());
        for (index, raw) in self.run_configurations.into_iter().enumerate() {
            // Unnamed configurations get stable positional names.
            let name = raw
                .name
                .unwrap_or_else(|| format!("run_config_{}", index + 1));

            let main_command = split_command(&raw.command, &name)?;
            let pre_round_commands = split_commands(&raw.pre_round, &name)?;
            let post_round_commands = split_commands(&raw.post_round, &name)?;

            configurations.push(RunConfiguration {
                name,
                main_command,
                pre_round_commands,
                post_round_commands,
            });
        }

        for (i, a) in configurations.iter().enumerate() {
            for b in configurations.iter().skip(i + 1) {
                if a.name == b.name {
                    return Err(HarnessError::Config(format!(
                        "duplicate run configuration name '{}'",
                        a.name
                    )));
                }
            }
        }

        let periodic = match self.periodic {
            Some(raw) => {
                if raw.every_files == 0 {
                    return Err(HarnessError::Config(
                        "periodic.every_files must be a positive integer".to_string(),
                    ));
                }
                if raw.commands.is_empty() {
                    return Err(HarnessError::Config(
                        "periodic command group is empty".to_string(),
                    ));
                }
                Some(PeriodicCommands {
                    every_files: raw.every_files,
                    commands: split_commands(&raw.commands, "periodic")?,
                })
            }
            None => None,
        };

        Ok(Config {
            test_folder: self.test_folder,
            file_extension: self.file_extension,
            ignore: self.ignore,
            files: self.files,
            check_files: self.check_files,
            list_files: self.list_files,
            event_log: self.event_log,
            reports: ReportPaths {
                raw: self.reports.raw,
                per_config: self.reports.per_config,
                averages: self.reports.averages,
            },
            matrix: RunMatrix {
                configurations,
                repetitions: self.repetitions,
                timeout: self.timeout.map(Duration::from_secs),
                print_output: self.print_output,
                stdout_file: self.stdout_file,
                stderr_file: self.stderr_file,
                periodic,
                average_policy: self.average_policy,
            },
        })
    }
}

/// Split a command string into an argument vector.
fn split_command(command: &str, owner: &str) -> Result<Vec<String>> {
    let args = shell_words::split(command).map_err(|e| {
        HarnessError::Config(format!(
            "failed to parse command for '{}': {}\nCommand: {}\nFix: check for unmatched quotes or invalid escape sequences.",
            owner, e, command
        ))
    })?;

    if args.is_empty() {
        return Err(HarnessError::Config(format!(
            "command for '{}' is empty after parsing: '{}'",
            owner, command
        )));
    }

    Ok(args)
}

fn split_commands(commands: &[String], owner: &str) -> Result<Vec<Vec<String>>> {
    commands
        .iter()
        .map(|command| split_command(command, owner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(yaml: &str) -> Result<Config> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        Config::load(file.path())
    }

    const MINIMAL: &str = r#"
test_folder: tests/inputs
run_configurations:
  - name: fast
    command: "tool --fast"
"#;

    #[test]
    fn minimal_config_loads_with_defaults() {
        let config = load_str(MINIMAL).unwrap();
        assert_eq!(config.matrix.repetitions, 1);
        assert!(config.matrix.timeout.is_none());
        assert!(!config.matrix.print_output);
        assert_eq!(config.matrix.average_policy, AveragePolicy::All);
        assert!(!config.reports.any_enabled());

        let cfg = &config.matrix.configurations[0];
        assert_eq!(cfg.name, "fast");
        assert_eq!(cfg.main_command, vec!["tool", "--fast"]);
        assert!(cfg.pre_round_commands.is_empty());
        assert!(cfg.post_round_commands.is_empty());
    }

    #[test]
    fn quoted_arguments_survive_splitting() {
        let config = load_str(
            r#"
test_folder: t
run_configurations:
  - name: quoted
    command: "tool --label 'two words' @file_name@"
"#,
        )
        .unwrap();
        assert_eq!(
            config.matrix.configurations[0].main_command,
            vec!["tool", "--label", "two words", "@file_name@"]
        );
    }

    #[test]
    fn unnamed_configurations_get_positional_names() {
        let config = load_str(
            r#"
test_folder: t
run_configurations:
  - command: "a"
  - command: "b"
"#,
        )
        .unwrap();
        let names: Vec<_> = config
            .matrix
            .configurations
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["run_config_1", "run_config_2"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = load_str(
            r#"
test_folder: t
run_configurations:
  - name: same
    command: "a"
  - name: same
    command: "b"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate run configuration name"));
    }

    #[test]
    fn zero_repetitions_are_rejected() {
        let err = load_str(
            r#"
test_folder: t
repetitions: 0
run_configurations:
  - command: "a"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("repetitions"));
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = load_str(
            r#"
test_folder: t
run_configurations:
  - name: empty
    command: "   "
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty after parsing"));
    }

    #[test]
    fn missing_inputs_are_rejected() {
        let err = load_str(
            r#"
run_configurations:
  - command: "a"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("test_folder"));
    }

    #[test]
    fn no_configurations_is_rejected() {
        let err = load_str("test_folder: t\n").unwrap_err();
        assert!(err.to_string().contains("no run_configurations"));
    }

    #[test]
    fn periodic_cadence_must_be_positive() {
        let err = load_str(
            r#"
test_folder: t
periodic:
  every_files: 0
  commands: ["sync"]
run_configurations:
  - command: "a"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("every_files"));
    }

    #[test]
    fn full_config_round_trips() {
        let config = load_str(
            r#"
test_folder: benchmarks
file_extension: .sil
ignore:
  - "**/broken/**"
repetitions: 5
timeout: 60
print_output: true
stdout_file: "out/@path_name@_@file_name@_@rep@.stdout"
check_files: true
average_policy: finished
event_log: "journal-@date@.ndjson"
reports:
  raw: "results/raw-@date@.csv"
  per_config: "results/matrix-@date@.csv"
  averages: "results/avg-@date@.csv"
periodic:
  every_files: 10
  commands:
    - "sync"
run_configurations:
  - name: carbon
    command: "carbon --z3 @rep@"
    pre_round: ["sh -c 'echo setup'"]
    post_round: ["sh -c 'echo teardown'"]
  - name: silicon
    command: "silicon"
"#,
        )
        .unwrap();

        assert_eq!(config.matrix.repetitions, 5);
        assert_eq!(config.matrix.timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.matrix.average_policy, AveragePolicy::Finished);
        assert!(config.reports.any_enabled());
        assert_eq!(config.matrix.configurations.len(), 2);
        assert_eq!(
            config.matrix.configurations[0].pre_round_commands,
            vec![vec!["sh", "-c", "echo setup"]]
        );
        let periodic = config.matrix.periodic.as_ref().unwrap();
        assert_eq!(periodic.every_files, 10);
        assert_eq!(periodic.commands, vec![vec!["sync"]]);
    }
}
