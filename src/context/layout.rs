//! Run directory naming
//!
//! `<results_root>/<program stem>/<YYYY-MM-DD_HH-MM-SS>/<run index>`

use crate::{Error, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Timestamp format of the run directory segment
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Program name used as the experiment segment: the file name of
/// `program_path` cut at its first `.`.
///
/// # Errors
///
/// Returns error if the path has no file name or the stem is empty
pub fn program_stem(program_path: &Path) -> Result<String> {
    let file_name = program_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Program path {} has no UTF-8 file name",
                program_path.display()
            ))
        })?;

    let stem = file_name.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        return Err(Error::InvalidInput(format!(
            "Program path {} has an empty stem",
            program_path.display()
        )));
    }
    Ok(stem.to_string())
}

/// Check that `segment` names exactly one entry inside its parent.
///
/// # Errors
///
/// Returns error if `segment` is empty, `.`/`..`, or contains a separator
/// (which also rules out absolute paths)
pub fn validate_segment(what: &str, segment: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(&['/', '\\'][..])
    {
        return Err(Error::InvalidInput(format!(
            "{what} '{segment}' is not a single path segment"
        )));
    }
    Ok(())
}

/// Check that a rendered run index is usable as a single path segment.
///
/// # Errors
///
/// Returns error if the index is empty, `.`/`..`, or contains a separator
pub fn validate_run_index(run_index: &str) -> Result<()> {
    validate_segment("Run index", run_index)
}

/// Result directory for a run.
#[must_use]
pub fn result_dir(
    results_root: &Path,
    stem: &str,
    started_at: NaiveDateTime,
    run_index: &str,
) -> PathBuf {
    results_root
        .join(stem)
        .join(started_at.format(TIMESTAMP_FORMAT).to_string())
        .join(run_index)
}
