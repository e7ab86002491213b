//! Input file discovery.
//!
//! Walks the configured test folder recursively, keeping files that match
//! the configured extension and are not excluded by the ignore globs.
//! Directory entries are sorted before descending, so the resulting list has
//! a stable order on every platform; the traversal and report layout both
//! depend on that order. A configuration with an explicit `files` list skips
//! discovery entirely and uses the list as given.

use crate::config::Config;
use crate::error::{HarnessError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the ordered input file list for a run.
pub fn collect_input_files(config: &Config) -> Result<Vec<PathBuf>> {
    if !config.files.is_empty() {
        return Ok(config.files.clone());
    }

    // validate() guarantees test_folder is set when files is empty.
    let Some(folder) = config.test_folder.as_ref() else {
        return Err(HarnessError::Config(
            "config must set either test_folder or an explicit files list".to_string(),
        ));
    };

    let ignore = build_globset(&config.ignore)?;
    let mut files = Vec::new();
    walk_folder(folder, config.file_extension.as_deref(), &ignore, &mut files)?;
    Ok(files)
}

/// Recursively collect matching files under `dir`, sorted per directory.
fn walk_folder(
    dir: &Path,
    extension: Option<&str>,
    ignore: &GlobSet,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| {
        HarnessError::Setup(format!(
            "failed to read test folder '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            HarnessError::Setup(format!("failed to read directory entry: {}", e))
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk_folder(&path, extension, ignore, files)?;
            continue;
        }

        if let Some(ext) = extension {
            if !path.to_string_lossy().ends_with(ext) {
                continue;
            }
        }

        if ignore.is_match(&path) {
            continue;
        }

        files.push(path);
    }

    Ok(())
}

/// Build a GlobSet from a list of ignore patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            HarnessError::Config(format!("invalid ignore pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| {
        HarnessError::Config(format!("failed to build ignore pattern set: {}", e))
    })
}
