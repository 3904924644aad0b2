//! File globbing for directory conversion.
//!
//! # Examples
//!
//! ```no_run
//! use csv_splitter::io::glob::{csv_files_under, expand_glob};
//!
//! let exports = expand_glob("exports/2024-*/*.csv")?;
//! let everything = csv_files_under("exports")?;
//! # use anyhow::Error; Ok::<(), Error>(())
//! ```

use anyhow::{Context, Result};
use glob::{Pattern, glob};
use std::path::{Path, PathBuf};

/// Expand a glob pattern into a sorted vector of matching **files**.
///
/// Directories matching the pattern are left out. Zero matches is not an error.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or a directory entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path =
            entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }

    result.sort();
    Ok(result)
}

/// Every `*.csv` file below `dir`, recursively, in sorted order.
///
/// Glob metacharacters in `dir` itself are escaped.
///
/// # Errors
///
/// See [`expand_glob`].
pub fn csv_files_under(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let root = Pattern::escape(&dir.to_string_lossy());
    expand_glob(&format!("{root}/**/*.csv"))
}
