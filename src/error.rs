//! Error types for the stint CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for harness operations.
///
/// Each variant maps to a distinct exit code. Failures of the benchmarked
/// process itself (nonzero exit, timeout) are *not* errors: they are recorded
/// as data points and never surface through this type.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The configuration file or CLI usage is invalid.
    #[error("{0}")]
    Config(String),

    /// A trusted setup step failed: inaccessible input file, unreadable
    /// test folder, or a pre/post-round command that did not succeed.
    #[error("Setup failed: {0}")]
    Setup(String),

    /// A benchmarked executable could not be spawned at all. This is a
    /// harness configuration problem, not a data point.
    #[error("Launch failed: {0}")]
    Launch(String),

    /// A report file or the run journal could not be opened or written.
    #[error("Write failed: {0}")]
    Write(String),
}

impl HarnessError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::Config(_) => exit_codes::CONFIG_ERROR,
            HarnessError::Setup(_) => exit_codes::SETUP_FAILURE,
            HarnessError::Launch(_) => exit_codes::LAUNCH_FAILURE,
            HarnessError::Write(_) => exit_codes::WRITE_FAILURE,
        }
    }
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_has_correct_exit_code() {
        let err = HarnessError::Config("bad repetitions".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn setup_error_has_correct_exit_code() {
        let err = HarnessError::Setup("input file missing".to_string());
        assert_eq!(err.exit_code(), exit_codes::SETUP_FAILURE);
    }

    #[test]
    fn launch_error_has_correct_exit_code() {
        let err = HarnessError::Launch("no such executable".to_string());
        assert_eq!(err.exit_code(), exit_codes::LAUNCH_FAILURE);
    }

    #[test]
    fn write_error_has_correct_exit_code() {
        let err = HarnessError::Write("disk full".to_string());
        assert_eq!(err.exit_code(), exit_codes::WRITE_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = HarnessError::Setup("pre-round command exited with code 3".to_string());
        assert_eq!(
            err.to_string(),
            "Setup failed: pre-round command exited with code 3"
        );

        let err = HarnessError::Launch("'carbonx' not found in PATH".to_string());
        assert_eq!(err.to_string(), "Launch failed: 'carbonx' not found in PATH");
    }
}
