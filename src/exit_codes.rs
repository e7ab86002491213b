//! Exit code constants for the stint CLI.
//!
//! - 0: Success
//! - 1: Configuration error (bad args, unreadable or invalid config file)
//! - 2: Setup failure (inaccessible input, pre/post-round command failure)
//! - 3: Launch failure (benchmarked executable missing or not startable)
//! - 4: Write failure (report file or journal could not be written)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Configuration error: bad arguments, unreadable or inconsistent config file.
pub const CONFIG_ERROR: i32 = 1;

/// Setup failure: inaccessible input file, unreadable test folder, or a
/// pre/post-round command that timed out or exited nonzero.
pub const SETUP_FAILURE: i32 = 2;

/// Launch failure: a benchmarked executable could not be spawned at all.
pub const LAUNCH_FAILURE: i32 = 3;

/// Write failure: a report file or the run journal could not be opened or written.
pub const WRITE_FAILURE: i32 = 4;
