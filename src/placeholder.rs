//! Placeholder substitution for command and output-path templates.
//!
//! Command arguments and report/output file names may contain `@token@`
//! placeholders that are resolved against the current run context:
//!
//! - `@date@` - the run date, captured once at harness start
//! - `@file_name@` - basename of the current input file
//! - `@path_name@` - parent directory segments of the input file joined
//!   with `_`, used to build collision-free output names without deep
//!   directory nesting
//! - `@rep@` - the zero-based repetition index
//! - `@config_name@` - the name of the current run configuration
//!
//! Resolution is a single left-to-right scan: replacement text is never
//! re-scanned for further tokens, so a value that happens to contain a token
//! string comes through literally. A token whose value is not present in the
//! context is left visible in the output, which makes mis-use easy to spot
//! in generated file names.

use std::path::{Component, Path};

pub const TOKEN_DATE: &str = "@date@";
pub const TOKEN_FILE_NAME: &str = "@file_name@";
pub const TOKEN_PATH_NAME: &str = "@path_name@";
pub const TOKEN_REPETITION: &str = "@rep@";
pub const TOKEN_CONFIG_NAME: &str = "@config_name@";

/// Format string for `@date@`, applied once per harness invocation.
pub const RUN_DATE_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Values available for substitution at a given point of the run.
///
/// The run date is mandatory and shared by every substitution in a run;
/// the remaining fields are filled in as the orchestrator walks files,
/// configurations and repetitions.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderContext<'a> {
    pub run_date: &'a str,
    pub input_file: Option<&'a Path>,
    pub repetition: Option<usize>,
    pub config_name: Option<&'a str>,
}

impl<'a> PlaceholderContext<'a> {
    /// Create a context holding only the run date.
    pub fn new(run_date: &'a str) -> Self {
        Self {
            run_date,
            input_file: None,
            repetition: None,
            config_name: None,
        }
    }

    /// Set the current input file.
    pub fn with_file(mut self, file: &'a Path) -> Self {
        self.input_file = Some(file);
        self
    }

    /// Set the current zero-based repetition index.
    pub fn with_repetition(mut self, repetition: usize) -> Self {
        self.repetition = Some(repetition);
        self
    }

    /// Set the current run configuration name.
    pub fn with_config_name(mut self, name: &'a str) -> Self {
        self.config_name = Some(name);
        self
    }
}

/// Resolve all placeholders in `template` against `ctx`.
///
/// Deterministic: identical inputs always produce identical output, and a
/// template containing no tokens is returned unchanged.
pub fn resolve(template: &str, ctx: &PlaceholderContext<'_>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find('@') {
        result.push_str(&rest[..at]);
        rest = &rest[at..];

        match match_token(rest, ctx) {
            Some((token_len, replacement)) => {
                result.push_str(&replacement);
                rest = &rest[token_len..];
            }
            None => {
                // Not a recognized token; emit the '@' and keep scanning,
                // so it may still open the next token.
                result.push('@');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Whether a template references the current input file.
///
/// The orchestrator appends the input file path as the final main-command
/// argument unless some argument already positions the file via one of
/// these tokens.
pub fn mentions_input_file(template: &str) -> bool {
    template.contains(TOKEN_FILE_NAME) || template.contains(TOKEN_PATH_NAME)
}

/// All parent directory segments of `file` joined with `_`, root dropped.
///
/// `a/b/c/test.in` yields `a_b_c`; a bare filename yields the empty string.
pub fn path_derived_name(file: &Path) -> String {
    let Some(parent) = file.parent() else {
        return String::new();
    };

    let segments: Vec<String> = parent
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    segments.join("_")
}

/// Try to match a known token at the start of `input`.
///
/// Returns the token length and its replacement, or `None` when no token
/// matches or the token's value is absent from the context (the token then
/// stays visible in the output).
fn match_token(input: &str, ctx: &PlaceholderContext<'_>) -> Option<(usize, String)> {
    if input.starts_with(TOKEN_DATE) {
        return Some((TOKEN_DATE.len(), ctx.run_date.to_string()));
    }

    if input.starts_with(TOKEN_FILE_NAME) {
        let file = ctx.input_file?;
        let name = file.file_name()?;
        return Some((TOKEN_FILE_NAME.len(), name.to_string_lossy().into_owned()));
    }

    if input.starts_with(TOKEN_PATH_NAME) {
        let file = ctx.input_file?;
        return Some((TOKEN_PATH_NAME.len(), path_derived_name(file)));
    }

    if input.starts_with(TOKEN_REPETITION) {
        let repetition = ctx.repetition?;
        return Some((TOKEN_REPETITION.len(), repetition.to_string()));
    }

    if input.starts_with(TOKEN_CONFIG_NAME) {
        let name = ctx.config_name?;
        return Some((TOKEN_CONFIG_NAME.len(), name.to_string()));
    }

    None
}
