//! Command implementations for stint.

mod run;

pub use run::cmd_run;
