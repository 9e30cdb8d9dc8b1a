//! Event-file discovery.
//!
//! The upstream collector drops seismic exports into the data directory with
//! a timestamp-prefixed filename (e.g. `2024-06-17 10_32_00.csv`). Discovery
//! orders candidates by that embedded timestamp; filesystem modification
//! time is only a fallback, because mtime does not survive copy or sync
//! between hosts. The fallback is logged as a degraded mode.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no event file matching '{prefix}*.csv' in {dir}")]
    NoCandidates { prefix: String, dir: String },

    #[error("failed to read directory {dir}: {source}")]
    ReadDir {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not stat any event candidate in {dir}")]
    Unreadable { dir: String },
}

/// Pick the newest event export in `dir` whose filename starts with `prefix`.
///
/// Read-only: nothing in `dir` is touched.
pub fn latest_event_file(dir: &Path, prefix: &str) -> Result<PathBuf, DiscoveryError> {
    let entries = fs::read_dir(dir).map_err(|e| DiscoveryError::ReadDir {
        dir: dir.display().to_string(),
        source: e,
    })?;

    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(prefix) && name.to_lowercase().ends_with(".csv") {
            candidates.push(path);
        }
    }

    if candidates.is_empty() {
        return Err(DiscoveryError::NoCandidates {
            prefix: prefix.to_string(),
            dir: dir.display().to_string(),
        });
    }

    // Primary key: the timestamp embedded in the filename. Ties (identical
    // digit strings) break by path so the result never depends on directory
    // iteration order.
    let stamped: Vec<(String, PathBuf)> = candidates
        .iter()
        .filter_map(|p| filename_timestamp(p).map(|ts| (ts, p.clone())))
        .collect();

    if let Some((_, path)) = stamped
        .into_iter()
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
    {
        return Ok(path);
    }

    warn!(
        dir = %dir.display(),
        "no filename timestamp among event candidates; falling back to mtime \
         (not portable across copy/sync)"
    );

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for path in candidates {
        let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) else {
            continue;
        };
        let newer = match &best {
            Some((held, held_path)) => {
                modified > *held || (modified == *held && path > *held_path)
            }
            None => true,
        };
        if newer {
            best = Some((modified, path));
        }
    }

    best.map(|(_, path)| path).ok_or(DiscoveryError::Unreadable {
        dir: dir.display().to_string(),
    })
}

/// Extract a sortable timestamp from a filename: the stem's digits, in
/// order, when they amount to at least a full `YYYYMMDD` date.
fn filename_timestamp(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 8 {
        Some(digits)
    } else {
        None
    }
}
