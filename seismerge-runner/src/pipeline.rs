//! Batch orchestration: discover → load → pivot → aggregate → merge → persist.
//!
//! One call runs the whole reconciliation. Instrument files are loaded under
//! the partial-failure policy — a file that cannot be opened or whose header
//! has no recognizable date/close column is skipped with a warning, and the
//! run proceeds with whatever loaded. The run aborts only when configuration
//! or discovery fails, zero instrument files load, or the final write fails.

use crate::config::{ConfigError, PipelineConfig};
use crate::sink::{SinkError, SqliteSink};
use seismerge_core::records::WideRow;
use seismerge_core::{
    aggregate, latest_event_file, load_events, load_instrument, merge, pivot, DiscoveryError,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("no instrument file loaded successfully ({attempted} attempted)")]
    NoInstruments { attempted: usize },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// What one batch run did, instrument by instrument.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// The discovered event export.
    pub event_file: String,
    /// Raw event rows read, before per-day aggregation.
    pub event_rows: usize,
    /// Distinct days with at least one recorded magnitude.
    pub event_days: usize,
    /// Why the event file contributed nothing, when it didn't.
    pub event_error: Option<String>,
    /// Instrument → loaded row count.
    pub loaded: BTreeMap<String, usize>,
    /// Instrument → skip reason.
    pub skipped: BTreeMap<String, String>,
    /// Rows in the merged table (the price-date union).
    pub output_rows: usize,
    /// Price columns in the merged table (loaded instruments).
    pub price_columns: usize,
    /// BLAKE3 fingerprint of the merged rows.
    pub dataset_hash: String,
    /// False in check mode.
    pub persisted: bool,
}

/// Run the full pipeline and replace the destination table.
///
/// The connection string is resolved before any file I/O; its absence is a
/// configuration error, not a mid-run failure.
pub fn run(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    let database_url = config.resolve_database_url()?;

    let (instruments, rows, mut summary) = reconcile(config)?;

    let mut sink = SqliteSink::open(&database_url, &config.pipeline.table_name)?;
    sink.replace(&instruments, &rows)?;
    summary.persisted = true;

    Ok(summary)
}

/// Run everything except persistence — a dry run that prints what a real
/// run would write. No connection string is required.
pub fn check(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    let (_, _, summary) = reconcile(config)?;
    Ok(summary)
}

fn reconcile(
    config: &PipelineConfig,
) -> Result<(Vec<String>, Vec<WideRow>, RunSummary), PipelineError> {
    let data_dir = &config.pipeline.data_dir;

    let event_file = latest_event_file(data_dir, &config.pipeline.event_file_prefix)?;
    info!(file = %event_file.display(), "event file discovered");

    // The discovered export falls under the same per-file skip policy as the
    // instruments: a log that cannot be loaded yields an all-sentinel run,
    // not an aborted one.
    let mut event_error = None;
    let events = match load_events(&event_file) {
        Ok(events) => events,
        Err(e) => {
            warn!(file = %event_file.display(), error = %e, "event file skipped");
            event_error = Some(e.to_string());
            Vec::new()
        }
    };
    let event_rows = events.len();

    let mut loaded = BTreeMap::new();
    let mut skipped = BTreeMap::new();
    let mut records = Vec::new();
    for (instrument_id, filename) in &config.instruments {
        let path = data_dir.join(filename);
        match load_instrument(&path, instrument_id) {
            Ok(file_records) => {
                info!(instrument = %instrument_id, rows = file_records.len(), "instrument loaded");
                loaded.insert(instrument_id.clone(), file_records.len());
                records.extend(file_records);
            }
            Err(e) => {
                warn!(instrument = %instrument_id, error = %e, "instrument skipped");
                skipped.insert(instrument_id.clone(), e.to_string());
            }
        }
    }

    if loaded.is_empty() {
        return Err(PipelineError::NoInstruments {
            attempted: config.instruments.len(),
        });
    }

    let wide = pivot(&records);
    let by_day = aggregate(&events);
    let event_days = by_day.len();
    let rows = merge(wide, &by_day);

    // Column set and order: the loaded instruments, sorted by id.
    let instruments: Vec<String> = loaded.keys().cloned().collect();
    let dataset_hash = fingerprint(&instruments, &rows);

    info!(
        rows = rows.len(),
        instruments = instruments.len(),
        event_days,
        "reconciliation complete"
    );

    let summary = RunSummary {
        event_file: event_file.display().to_string(),
        event_rows,
        event_days,
        event_error,
        price_columns: instruments.len(),
        output_rows: rows.len(),
        dataset_hash,
        loaded,
        skipped,
        persisted: false,
    };

    Ok((instruments, rows, summary))
}

/// Deterministic BLAKE3 hash over the merged rows.
///
/// Covers the instrument column order, every date, every close cell
/// (absent cells hash a marker byte, so NULL and 0.0 differ), and every
/// magnitude — identical output regardless of map iteration order.
fn fingerprint(instruments: &[String], rows: &[WideRow]) -> String {
    let mut hasher = blake3::Hasher::new();

    for instrument in instruments {
        hasher.update(instrument.as_bytes());
    }
    for row in rows {
        hasher.update(row.date_key.to_string().as_bytes());
        for instrument in instruments {
            match row.closes.get(instrument) {
                Some(close) => hasher.update(&close.to_le_bytes()),
                None => hasher.update(&[0xff]),
            };
        }
        hasher.update(&row.max_magnitude.to_le_bytes());
    }

    hasher.finalize().to_hex().to_string()
}
