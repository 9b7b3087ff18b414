//! Filesystem utilities for klean.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Create a directory and all parent directories if they do not exist.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), UtilError> {
    std::fs::create_dir_all(path).map_err(|source| UtilError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Remove a directory and all its contents. No error if the directory is absent.
///
/// # Errors
/// Returns an error if the directory exists but cannot be removed.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<(), UtilError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(UtilError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Return the klean home directory (`~/.klean`).
///
/// Resolves via `HOME` (Unix) or `USERPROFILE` (Windows).
///
/// # Errors
/// Returns an error if neither environment variable is set.
pub fn klean_home() -> Result<PathBuf, UtilError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .map_err(|_| UtilError::NoHomeDir)?;
    Ok(home.join(".klean"))
}

/// Collect all files under `root` matching a target glob, sorted by path.
///
/// The pattern is interpreted relative to `root` (e.g. `"**/*.kt"` or
/// `"*.gradle.kts"`). Directories are skipped; only plain files match.
///
/// # Errors
/// Returns an error if the glob pattern is invalid.
pub fn collect_matching(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, UtilError> {
    let full_pattern = root.join(pattern).display().to_string();

    let mut files: Vec<PathBuf> = glob::glob(&full_pattern)
        .map_err(|e| UtilError::GlobPattern {
            pattern: full_pattern.clone(),
            message: e.to_string(),
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    files.sort();
    Ok(files)
}
