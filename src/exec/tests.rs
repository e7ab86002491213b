//! Tests for the process executor.

use super::*;
use std::time::Duration;
use tempfile::TempDir;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn missing_executable_is_a_launch_error() {
    let err = execute(
        &argv(&["definitely-not-an-executable-1f9a"]),
        None,
        OutputSink::Discard,
        OutputSink::Discard,
    )
    .unwrap_err();

    assert!(matches!(err, HarnessError::Launch(_)));
    assert!(err.to_string().contains("definitely-not-an-executable-1f9a"));
}

#[test]
fn empty_command_is_a_launch_error() {
    let err = execute(&[], None, OutputSink::Discard, OutputSink::Discard).unwrap_err();
    assert!(matches!(err, HarnessError::Launch(_)));
}

#[cfg(unix)]
#[test]
fn successful_exit_reports_code_zero() {
    let outcome = execute(
        &argv(&["sh", "-c", "exit 0"]),
        Some(Duration::from_secs(10)),
        OutputSink::Discard,
        OutputSink::Discard,
    )
    .unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.exit_code, Some(0));
    assert!(!outcome.timed_out);
}

#[cfg(unix)]
#[test]
fn nonzero_exit_is_reported_not_failed() {
    let outcome = execute(
        &argv(&["sh", "-c", "exit 7"]),
        Some(Duration::from_secs(10)),
        OutputSink::Discard,
        OutputSink::Discard,
    )
    .unwrap();

    assert_eq!(outcome.exit_code, Some(7));
    assert!(!outcome.timed_out);
    assert!(!outcome.is_success());
}

#[cfg(unix)]
#[test]
fn file_sink_captures_output_and_creates_parents() {
    let temp = TempDir::new().unwrap();
    let out_path = temp.path().join("nested/dir/stdout.log");

    let outcome = execute(
        &argv(&["sh", "-c", "echo hello-sink"]),
        None,
        OutputSink::File(out_path.clone()),
        OutputSink::Discard,
    )
    .unwrap();

    assert!(outcome.is_success());
    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(contents.trim(), "hello-sink");
}

#[cfg(unix)]
#[test]
fn timeout_kills_and_reports_elapsed_near_deadline() {
    let outcome = execute(
        &argv(&["sh", "-c", "sleep 30"]),
        Some(Duration::from_secs(1)),
        OutputSink::Discard,
        OutputSink::Discard,
    )
    .unwrap();

    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code, None);
    assert!(outcome.elapsed >= Duration::from_secs(1));
    // Scheduling tolerance: well under the sleep duration.
    assert!(outcome.elapsed < Duration::from_secs(5));
}

#[cfg(unix)]
#[test]
fn fast_process_beats_its_deadline() {
    let outcome = execute(
        &argv(&["sh", "-c", "sleep 1"]),
        Some(Duration::from_secs(10)),
        OutputSink::Discard,
        OutputSink::Discard,
    )
    .unwrap();

    assert!(!outcome.timed_out);
    assert_eq!(outcome.exit_code, Some(0));
    assert!(outcome.elapsed < Duration::from_secs(5));
}

#[cfg(unix)]
#[test]
fn timeout_kills_descendants_too() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("leaked");

    // The wrapper backgrounds a grandchild that would create the marker
    // after 2 seconds, then blocks. The group kill at the 500ms deadline
    // must take the grandchild down with it.
    let script = format!(
        "(sleep 2; echo leaked > '{}') & sleep 30",
        marker.display()
    );
    let outcome = execute(
        &argv(&["sh", "-c", &script]),
        Some(Duration::from_millis(500)),
        OutputSink::Discard,
        OutputSink::Discard,
    )
    .unwrap();

    assert!(outcome.timed_out);

    // Give a survivor ample time to prove itself before asserting.
    std::thread::sleep(Duration::from_secs(3));
    assert!(
        !marker.exists(),
        "grandchild survived the process-group kill"
    );
}

#[cfg(unix)]
#[test]
fn unwritable_file_sink_is_a_write_error() {
    let err = execute(
        &argv(&["sh", "-c", "true"]),
        None,
        OutputSink::File(PathBuf::from("/proc/no-such-dir/out.log")),
        OutputSink::Discard,
    )
    .unwrap_err();

    assert!(matches!(err, HarnessError::Write(_)));
}
