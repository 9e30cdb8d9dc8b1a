//! Long- and wide-format record types shared across the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One instrument-day observation in long format.
///
/// `close` is `None` when the source cell did not parse as a number; the
/// date still participates in the output date union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub instrument_id: String,
    pub date_key: NaiveDate,
    pub close: Option<f64>,
}

/// One raw event-log row keyed to a UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub date_key: NaiveDate,
    pub magnitude: Option<f64>,
}

/// One row of the final wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub date_key: NaiveDate,
    /// Instrument id → close. An absent entry persists as NULL, never zero.
    pub closes: HashMap<String, f64>,
    /// Aggregated magnitude, or `0.0` for days with no recorded event.
    pub max_magnitude: f64,
}
