//! Property tests for the reconciliation invariants.
//!
//! Uses proptest to verify:
//! 1. Union property — the pivoted date set equals the union of input dates
//! 2. Cell provenance — every wide cell comes from some input record
//! 3. Aggregation — each entry is the maximum recorded magnitude for its day
//! 4. Merge contract — dates preserved exactly, sentinel only on event-free
//!    days, and the whole chain is deterministic

use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::BTreeSet;
use seismerge_core::records::{EventRecord, InstrumentRecord};
use seismerge_core::{aggregate, merge, pivot, NO_EVENT_MAGNITUDE};

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn arb_instrument() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["TSM", "AAPL", "NVDA", "AMD", "QCOM"])
        .prop_map(|s| s.to_string())
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..60).prop_map(|offset| base_day() + chrono::Duration::days(offset))
}

fn arb_records() -> impl Strategy<Value = Vec<InstrumentRecord>> {
    prop::collection::vec(
        (arb_instrument(), arb_date(), prop::option::of(1.0..1000.0f64)).prop_map(
            |(instrument_id, date_key, close)| InstrumentRecord {
                instrument_id,
                date_key,
                close,
            },
        ),
        0..100,
    )
}

fn arb_events() -> impl Strategy<Value = Vec<EventRecord>> {
    prop::collection::vec(
        (arb_date(), prop::option::of(0.0..9.0f64)).prop_map(|(date_key, magnitude)| {
            EventRecord {
                date_key,
                magnitude,
            }
        }),
        0..100,
    )
}

// ── 1 & 2. Pivot ─────────────────────────────────────────────────────

proptest! {
    /// The pivoted date set is exactly the union of the input dates.
    #[test]
    fn pivot_dates_are_the_input_union(records in arb_records()) {
        let wide = pivot(&records);

        let expected: BTreeSet<NaiveDate> = records.iter().map(|r| r.date_key).collect();
        let actual: BTreeSet<NaiveDate> = wide.keys().copied().collect();
        prop_assert_eq!(actual, expected);
    }

    /// Every cell in the wide table is the close of some input record for
    /// that (date, instrument) pair — pivoting invents no values.
    #[test]
    fn pivot_cells_come_from_the_input(records in arb_records()) {
        let wide = pivot(&records);

        for (date, row) in &wide {
            for (instrument, close) in row {
                let found = records.iter().any(|r| {
                    r.date_key == *date
                        && &r.instrument_id == instrument
                        && r.close == Some(*close)
                });
                prop_assert!(found, "cell ({date}, {instrument}) = {close} has no source record");
            }
        }
    }
}

// ── 3. Aggregation ───────────────────────────────────────────────────

proptest! {
    /// Each aggregated entry equals the maximum recorded magnitude for its
    /// day, and a day appears iff it has at least one recorded magnitude.
    #[test]
    fn aggregate_keeps_the_daily_maximum(events in arb_events()) {
        let by_day = aggregate(&events);

        let days: BTreeSet<NaiveDate> = events
            .iter()
            .filter(|e| e.magnitude.is_some())
            .map(|e| e.date_key)
            .collect();
        prop_assert_eq!(by_day.keys().copied().collect::<BTreeSet<_>>(), days);

        for (day, magnitude) in &by_day {
            let max = events
                .iter()
                .filter(|e| e.date_key == *day)
                .filter_map(|e| e.magnitude)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(*magnitude, max);
        }
    }
}

// ── 4. Merge contract ────────────────────────────────────────────────

proptest! {
    /// Merging preserves the price-union dates exactly and attaches either
    /// the aggregated magnitude or the sentinel — never anything else.
    #[test]
    fn merge_is_a_left_outer_join(records in arb_records(), events in arb_events()) {
        let by_day = aggregate(&events);
        let rows = merge(pivot(&records), &by_day);

        let expected: BTreeSet<NaiveDate> = records.iter().map(|r| r.date_key).collect();
        let actual: BTreeSet<NaiveDate> = rows.iter().map(|r| r.date_key).collect();
        prop_assert_eq!(actual, expected);

        for row in &rows {
            match by_day.get(&row.date_key) {
                Some(magnitude) => prop_assert_eq!(row.max_magnitude, *magnitude),
                None => prop_assert_eq!(row.max_magnitude, NO_EVENT_MAGNITUDE),
            }
        }
    }

    /// The full reconcile chain is deterministic: the same inputs always
    /// produce the same rows.
    #[test]
    fn reconcile_chain_is_deterministic(records in arb_records(), events in arb_events()) {
        let first = merge(pivot(&records), &aggregate(&events));
        let second = merge(pivot(&records), &aggregate(&events));
        prop_assert_eq!(first, second);
    }
}
