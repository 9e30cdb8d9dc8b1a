//! Per-day event aggregation.

use crate::records::EventRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Collapse raw event rows to one magnitude per day: the maximum.
///
/// The scan runs in input order and replaces the held value only when a
/// later record is strictly greater, so equal magnitudes resolve to the
/// first occurrence — stable, and independent of any hash iteration order.
/// Records with a missing magnitude are ignored; a day with only missing
/// magnitudes gets no entry (and therefore the sentinel at merge time).
pub fn aggregate(records: &[EventRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        let Some(magnitude) = record.magnitude else {
            continue;
        };
        match by_day.get_mut(&record.date_key) {
            Some(held) => {
                if magnitude > *held {
                    *held = magnitude;
                }
            }
            None => {
                by_day.insert(record.date_key, magnitude);
            }
        }
    }
    by_day
}
