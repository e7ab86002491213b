//! Tests for the run orchestrator.
//!
//! These drive real processes (sh, true, false), so they are Unix-only like
//! the executor tests they build on.
#![cfg(unix)]

use super::*;
use std::time::Duration;
use tempfile::TempDir;

fn config(name: &str, command: &[&str]) -> RunConfiguration {
    RunConfiguration {
        name: name.to_string(),
        main_command: command.iter().map(|s| s.to_string()).collect(),
        pre_round_commands: Vec::new(),
        post_round_commands: Vec::new(),
    }
}

fn matrix(configurations: Vec<RunConfiguration>, repetitions: usize) -> RunMatrix {
    RunMatrix {
        configurations,
        repetitions,
        timeout: Some(Duration::from_secs(10)),
        print_output: false,
        stdout_file: None,
        stderr_file: None,
        periodic: None,
        average_policy: Default::default(),
    }
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn run(matrix: &RunMatrix, files: &[PathBuf]) -> Result<ResultStore> {
    RunOrchestrator::new(matrix, files, "2026-08-06-12-00-00", false, None).run()
}

#[test]
fn every_pair_gets_exactly_its_repetitions() {
    // Config order deliberately not alphabetical.
    let matrix = matrix(vec![config("b", &["true"]), config("a", &["true"])], 3);
    let files = paths(&["f1", "f2"]);

    let store = run(&matrix, &files).unwrap();
    assert_eq!(store.measurements(), 12);

    for file in ["f1", "f2"] {
        for name in ["a", "b"] {
            let count = store
                .results()
                .iter()
                .filter(|r| r.input_file == file && r.config_name == name)
                .count();
            assert_eq!(count, 3, "pair ({}, {})", file, name);
        }
    }
}

#[test]
fn traversal_is_file_major_then_config_then_repetition() {
    let matrix = matrix(vec![config("b", &["true"]), config("a", &["true"])], 2);
    let files = paths(&["f1", "f2"]);

    let store = run(&matrix, &files).unwrap();
    let order: Vec<(String, String)> = store
        .results()
        .iter()
        .map(|r| (r.input_file.clone(), r.config_name.clone()))
        .collect();

    let expected: Vec<(String, String)> = [
        ("f1", "b"),
        ("f1", "b"),
        ("f1", "a"),
        ("f1", "a"),
        ("f2", "b"),
        ("f2", "b"),
        ("f2", "a"),
        ("f2", "a"),
    ]
    .iter()
    .map(|(f, c)| (f.to_string(), c.to_string()))
    .collect();

    assert_eq!(order, expected);
}

#[test]
fn nonzero_exit_is_recorded_and_run_continues() {
    let matrix = matrix(vec![config("failing", &["sh", "-c", "exit 2"])], 2);
    let files = paths(&["f1"]);

    let store = run(&matrix, &files).unwrap();
    assert_eq!(store.measurements(), 2);
    assert_eq!(store.errors(), 2);
    for result in store.results() {
        assert_eq!(result.exit_code, Some(2));
        assert!(!result.timed_out);
    }
}

#[test]
fn timeout_is_recorded_and_run_continues() {
    let mut matrix = matrix(vec![config("slow", &["sh", "-c", "sleep 30"])], 1);
    matrix.timeout = Some(Duration::from_secs(1));
    let files = paths(&["f1"]);

    let store = run(&matrix, &files).unwrap();
    assert_eq!(store.measurements(), 1);
    assert_eq!(store.timeouts(), 1);

    let result = &store.results()[0];
    assert!(result.timed_out);
    assert_eq!(result.exit_code, None);
    assert!(result.elapsed_seconds >= 1.0);
    assert!(result.elapsed_seconds < 5.0);
}

#[test]
fn pre_round_failure_aborts_the_run() {
    let mut cfg = config("guarded", &["true"]);
    cfg.pre_round_commands = vec![vec!["false".to_string()]];
    let matrix = matrix(vec![cfg], 2);

    let err = run(&matrix, &paths(&["f1"])).unwrap_err();
    assert!(matches!(err, HarnessError::Setup(_)));
    assert!(err.to_string().contains("pre-round"));
}

#[test]
fn post_round_failure_aborts_the_run() {
    let mut cfg = config("guarded", &["true"]);
    cfg.post_round_commands = vec![vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()]];
    let matrix = matrix(vec![cfg], 1);

    let err = run(&matrix, &paths(&["f1"])).unwrap_err();
    assert!(matches!(err, HarnessError::Setup(_)));
    assert!(err.to_string().contains("post-round"));
}

#[test]
fn missing_executable_aborts_the_run() {
    let matrix = matrix(vec![config("ghost", &["no-such-benchmark-binary-3a1c"])], 1);

    let err = run(&matrix, &paths(&["f1"])).unwrap_err();
    assert!(matches!(err, HarnessError::Launch(_)));
}

#[test]
fn inaccessible_input_fails_the_accessibility_check() {
    let matrix = matrix(vec![config("any", &["true"])], 1);
    let files = paths(&["definitely-missing-input.sil"]);

    let err = RunOrchestrator::new(&matrix, &files, "2026-08-06-12-00-00", true, None)
        .run()
        .unwrap_err();
    assert!(matches!(err, HarnessError::Setup(_)));
}

#[test]
fn input_file_is_appended_as_final_argument() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("captured");
    let script = format!("printf '%s' \"$1\" > '{}'", out.display());
    let matrix = matrix(vec![config("cap", &["sh", "-c", &script, "argv0"])], 1);

    run(&matrix, &paths(&["suite/test.sil"])).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "suite/test.sil");
}

#[test]
fn file_placeholder_suppresses_appending() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("captured");
    let script = format!("printf '%s' \"$1\" > '{}'", out.display());
    let matrix = matrix(
        vec![config("cap", &["sh", "-c", &script, "argv0", "@file_name@"])],
        1,
    );

    run(&matrix, &paths(&["suite/test.sil"])).unwrap();
    // The placeholder positioned the file, so $1 is the basename and no
    // extra path argument was appended.
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "test.sil");
}

#[test]
fn stdout_template_captures_output_per_invocation() {
    let temp = TempDir::new().unwrap();
    let template = format!("{}/@config_name@_@rep@.out", temp.path().display());
    let mut matrix = matrix(vec![config("echoing", &["sh", "-c", "echo payload"])], 2);
    matrix.stdout_file = Some(template);

    run(&matrix, &paths(&["f1"])).unwrap();

    for rep in 0..2 {
        let path = temp.path().join(format!("echoing_{}.out", rep));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "payload");
    }
}

#[test]
fn periodic_commands_fire_on_cadence() {
    let temp = TempDir::new().unwrap();
    let ticks = temp.path().join("ticks");
    let script = format!("echo tick >> '{}'", ticks.display());

    let mut matrix = matrix(vec![config("quick", &["true"])], 1);
    matrix.periodic = Some(PeriodicCommands {
        every_files: 2,
        commands: vec![vec!["sh".to_string(), "-c".to_string(), script]],
    });

    // Three files with a cadence of two: fires exactly once, after file 2.
    run(&matrix, &paths(&["f1", "f2", "f3"])).unwrap();

    let contents = std::fs::read_to_string(&ticks).unwrap();
    assert_eq!(contents.lines().count(), 1);
}

#[test]
fn periodic_failure_does_not_abort_the_run() {
    let mut matrix = matrix(vec![config("quick", &["true"])], 1);
    matrix.periodic = Some(PeriodicCommands {
        every_files: 1,
        commands: vec![vec!["no-such-maintenance-binary-77b0".to_string()]],
    });

    let store = run(&matrix, &paths(&["f1", "f2"])).unwrap();
    assert_eq!(store.measurements(), 2);
}

#[test]
fn journal_records_run_lifecycle() {
    let temp = TempDir::new().unwrap();
    let journal_path = temp.path().join("journal.ndjson");
    let mut journal = RunJournal::open(&journal_path).unwrap();

    let matrix = matrix(vec![config("quick", &["true"])], 2);
    let files = paths(&["f1"]);
    RunOrchestrator::new(&matrix, &files, "2026-08-06-12-00-00", false, Some(&mut journal))
        .run()
        .unwrap();

    let contents = std::fs::read_to_string(&journal_path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    // run_started, two invocations, run_finished.
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("run_started"));
    assert!(lines[1].contains("invocation"));
    assert!(lines[3].contains("run_finished"));
}
