//! Long → wide reshaping of instrument records.

use crate::records::InstrumentRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Wide price table in progress: date → (instrument → close), dates sorted
/// ascending by construction.
pub type WideTable = BTreeMap<NaiveDate, HashMap<String, f64>>;

/// Pivot long-format records into one row per date.
///
/// Dates are the union across all instruments — the table is never
/// restricted to dates where every instrument has data. When the same
/// (date, instrument) pair appears more than once, the last record in input
/// order wins: the collector's newest export row for a day supersedes
/// earlier ones. A record with a missing close contributes its date to the
/// union but occupies no cell.
pub fn pivot(records: &[InstrumentRecord]) -> WideTable {
    let mut wide = WideTable::new();
    for record in records {
        let row = wide.entry(record.date_key).or_default();
        if let Some(close) = record.close {
            row.insert(record.instrument_id.clone(), close);
        }
    }
    wide
}
