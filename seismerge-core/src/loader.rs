//! CSV loading into long-format records.
//!
//! The per-instrument price files and the event log share one path: read the
//! header, resolve canonical roles, then emit one record per data row. Dates
//! are normalized to a UTC calendar day; numeric cells are parsed coercively
//! (unparseable text becomes a missing value, not a fatal error). A row
//! whose date cell cannot be parsed is skipped with a warning — it cannot be
//! keyed.

use crate::records::{EventRecord, InstrumentRecord};
use crate::schema::{self, CanonicalRole, SchemaError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },
}

/// Load one instrument's price file into long-format records.
pub fn load_instrument(
    path: &Path,
    instrument_id: &str,
) -> Result<Vec<InstrumentRecord>, LoadError> {
    let rows = read_rows(path, [CanonicalRole::Date, CanonicalRole::Close])?;
    Ok(rows
        .into_iter()
        .map(|(date_key, close)| InstrumentRecord {
            instrument_id: instrument_id.to_string(),
            date_key,
            close,
        })
        .collect())
}

/// Load the discovered event log.
pub fn load_events(path: &Path) -> Result<Vec<EventRecord>, LoadError> {
    let rows = read_rows(path, [CanonicalRole::Date, CanonicalRole::Magnitude])?;
    Ok(rows
        .into_iter()
        .map(|(date_key, magnitude)| EventRecord {
            date_key,
            magnitude,
        })
        .collect())
}

/// Shared row reader: resolve `[Date, value-role]`, then emit one
/// `(date_key, value)` per data row, preserving file order.
fn read_rows(
    path: &Path,
    required: [CanonicalRole; 2],
) -> Result<Vec<(NaiveDate, Option<f64>)>, LoadError> {
    let display_path = path.display().to_string();

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| LoadError::Open {
            path: display_path.clone(),
            source: e,
        })?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Read {
            path: display_path.clone(),
            source: e,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let roles = schema::normalize(&header, &required).map_err(|e| LoadError::Schema {
        path: display_path.clone(),
        source: e,
    })?;
    let date_idx = roles[&required[0]];
    let value_idx = roles[&required[1]];

    let mut out = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| LoadError::Read {
            path: display_path.clone(),
            source: e,
        })?;

        // Header is line 1; data rows start at line 2.
        let line = row + 2;
        let Some(raw_date) = record.get(date_idx) else {
            warn!(file = %display_path, line, "short row, skipping");
            continue;
        };

        match parse_date_key(raw_date) {
            Some(date_key) => {
                let value = record.get(value_idx).and_then(parse_number);
                out.push((date_key, value));
            }
            None => {
                warn!(file = %display_path, line, value = raw_date, "unparseable date, skipping row");
            }
        }
    }

    Ok(out)
}

/// Normalize a raw timestamp cell to a UTC calendar day.
///
/// Accepted shapes, tried in order:
/// - RFC 3339 / ISO with offset (`2024-06-18T07:30:00+08:00`)
/// - datetime with offset, space-separated (`2024-06-18 07:30:00+0800`)
/// - naive datetime (`2024-06-17 10:32:00`, `2024/06/17 10:32`) — read as UTC
/// - bare date (`2024-06-17`, `2024/06/17`)
///
/// An offset-carrying timestamp is converted to UTC before truncation, so
/// `2024-06-18T07:30:00+08:00` keys to 2024-06-17.
pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }

    None
}

/// Coercive numeric parse: trimmed text to f64, or `None`.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
