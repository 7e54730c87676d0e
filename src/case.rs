use crate::error::{Result, ViscosityError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// A time directory of the case, e.g. `0.5/`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDirectory {
    pub time: f64,
    pub path: PathBuf,
}

/// Subdirectories of `case_dir` whose names parse as a time value, in
/// ascending time order.
pub fn discover_time_dirs(case_dir: &Path) -> Result<Vec<TimeDirectory>> {
    let entries = fs::read_dir(case_dir).map_err(|e| ViscosityError::io(case_dir, e))?;

    let mut time_dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ViscosityError::io(case_dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name();
        match name.to_string_lossy().parse::<f64>() {
            Ok(time) if time.is_finite() => time_dirs.push(TimeDirectory { time, path }),
            _ => debug!("Skipping non-time directory {:?}", path),
        }
    }

    time_dirs.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(time_dirs)
}

/// First file in `time_dir`, by name, whose name starts with `prefix`.
pub fn find_rate_file(time_dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(time_dir).map_err(|e| ViscosityError::io(time_dir, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ViscosityError::io(time_dir, e))?;
        let path = entry.path();
        if path.is_file() && entry.file_name().to_string_lossy().starts_with(prefix) {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.into_iter().next())
}
