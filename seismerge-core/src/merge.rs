//! Left outer merge of the wide price table with aggregated events.

use crate::pivot::WideTable;
use crate::records::WideRow;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Sentinel magnitude for days with no recorded event.
pub const NO_EVENT_MAGNITUDE: f64 = 0.0;

/// Attach a magnitude to every price-union date.
///
/// The price table is the left side: a date present only in the event data
/// is dropped, not inserted. Days absent from `events` get the sentinel.
/// Rows come out in ascending date order.
pub fn merge(wide: WideTable, events: &BTreeMap<NaiveDate, f64>) -> Vec<WideRow> {
    wide.into_iter()
        .map(|(date_key, closes)| WideRow {
            date_key,
            closes,
            max_magnitude: events
                .get(&date_key)
                .copied()
                .unwrap_or(NO_EVENT_MAGNITUDE),
        })
        .collect()
}
