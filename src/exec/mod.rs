//! Process execution with deadline enforcement.
//!
//! Spawns one external process at a time, redirects its output to the
//! requested sinks, and waits for it to exit within an optional wall-clock
//! bound. On Unix the child is spawned as the leader of its own process
//! group, so a timeout is enforced with a single group kill that reaches
//! every descendant the target may have forked. A benchmarked target is
//! often a wrapper script whose real work happens in grandchildren.
//!
//! A process that cannot be spawned at all is a [`HarnessError::Launch`]:
//! that is a harness configuration problem, not a measurement, and callers
//! must abort rather than record it.

#[cfg(test)]
mod tests;

use crate::error::{HarnessError, Result};
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// Destination for a child process output stream.
#[derive(Debug, Clone)]
pub enum OutputSink {
    /// Drop the stream.
    Discard,
    /// Share the harness's own stream.
    Inherit,
    /// Write to a file, creating parent directories as needed. The file is
    /// opened by the executor and closed when the invocation ends;
    /// inherited streams are never closed.
    File(PathBuf),
}

impl OutputSink {
    fn open(&self) -> Result<Stdio> {
        match self {
            OutputSink::Discard => Ok(Stdio::null()),
            OutputSink::Inherit => Ok(Stdio::inherit()),
            OutputSink::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).map_err(|e| {
                            HarnessError::Write(format!(
                                "failed to create output directory '{}': {}",
                                parent.display(),
                                e
                            ))
                        })?;
                    }
                }
                let file = File::create(path).map_err(|e| {
                    HarnessError::Write(format!(
                        "failed to create output file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(Stdio::from(file))
            }
        }
    }
}

/// Outcome of one executed invocation.
#[derive(Debug, Clone, Copy)]
pub struct ExecOutcome {
    /// Wall-clock time from spawn to reap. For a timed-out invocation this
    /// includes the kill itself: a process that had to be killed legitimately
    /// took at least the timeout duration.
    pub elapsed: Duration,

    /// Exit code of the process. `None` when the process was killed or
    /// could not be waited on; only meaningful when `timed_out` is false.
    pub exit_code: Option<i32>,

    /// Whether the invocation exceeded its deadline and was killed.
    pub timed_out: bool,
}

impl ExecOutcome {
    /// Whether the invocation finished on its own with exit code 0.
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Execute `command`, waiting at most `timeout` when one is given.
///
/// Blocks until the process has exited or been killed and reaped; at most
/// one benchmarked process exists at any time.
pub fn execute(
    command: &[String],
    timeout: Option<Duration>,
    stdout: OutputSink,
    stderr: OutputSink,
) -> Result<ExecOutcome> {
    let Some(program) = command.first() else {
        return Err(HarnessError::Launch("command is empty".to_string()));
    };

    let mut cmd = Command::new(program);
    cmd.args(&command[1..])
        .stdout(stdout.open()?)
        .stderr(stderr.open()?);

    // Own process group, so a timeout kill reaches every descendant.
    #[cfg(unix)]
    cmd.process_group(0);

    let start = Instant::now();
    let child = cmd.spawn().map_err(|e| {
        HarnessError::Launch(format!(
            "failed to launch '{}': {}\nFix: ensure the command is installed and in PATH.",
            program, e
        ))
    })?;

    let (exit_code, timed_out) = match timeout {
        Some(limit) => wait_with_deadline(child, limit),
        None => {
            let mut child = child;
            (wait_code(child.wait()), false)
        }
    };

    Ok(ExecOutcome {
        elapsed: start.elapsed(),
        exit_code,
        timed_out,
    })
}

/// Exit code from a wait result. A wait that fails after a successful spawn
/// maps to the `None` sentinel, as does death by signal.
fn wait_code(result: std::io::Result<std::process::ExitStatus>) -> Option<i32> {
    result.ok().and_then(|status| status.code())
}

/// Block on the child with a deadline; returns (exit_code, timed_out).
///
/// A dedicated thread performs the blocking `wait()` while this thread
/// blocks on a channel with the deadline. On expiry the whole process group
/// is killed once, then the waiter reaps the root and the kill time counts
/// toward the caller's elapsed measurement.
#[cfg(unix)]
fn wait_with_deadline(mut child: std::process::Child, limit: Duration) -> (Option<i32>, bool) {
    use std::sync::mpsc;
    use std::thread;

    let pid = child.id();
    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        let _ = tx.send(child.wait());
    });

    let outcome = match rx.recv_timeout(limit) {
        Ok(result) => (wait_code(result), false),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            kill_process_group(pid);
            // SIGKILL cannot be ignored; the waiter reaps the root promptly.
            let _ = rx.recv();
            (None, true)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => (None, false),
    };

    let _ = waiter.join();
    outcome
}

/// Fallback for platforms without process groups: poll, then kill the root.
/// On Windows the kill is TerminateProcess and does not cover descendants.
#[cfg(not(unix))]
fn wait_with_deadline(mut child: std::process::Child, limit: Duration) -> (Option<i32>, bool) {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (status.code(), false),
            Ok(None) => {
                if start.elapsed() >= limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    return (None, true);
                }
                std::thread::sleep(poll_interval);
            }
            Err(_) => return (None, false),
        }
    }
}

/// Kill the child's entire process group with one signal.
///
/// A nonzero return (ESRCH, EPERM) means the deadline raced with natural
/// exit and the tree is already gone; both are swallowed.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    unsafe {
        libc::killpg(pid as libc::pid_t, libc::SIGKILL);
    }
}
