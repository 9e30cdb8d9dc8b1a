//! Seismerge Core — the reconciliation engine.
//!
//! Two independently produced datasets — per-instrument daily price files and
//! a seismic-event log with inconsistent column naming — are reconciled into
//! one date-aligned wide table:
//! - Canonical column roles and header normalization
//! - Event-file discovery (filename timestamp first, mtime as fallback)
//! - CSV loading into long-format records with UTC calendar-day keys
//! - Wide pivot over the union of dates
//! - Per-day event aggregation with a stable tie-break
//! - Left outer merge with the sentinel-zero magnitude contract

pub mod aggregate;
pub mod discover;
pub mod loader;
pub mod merge;
pub mod pivot;
pub mod records;
pub mod schema;

pub use aggregate::aggregate;
pub use discover::{latest_event_file, DiscoveryError};
pub use loader::{load_events, load_instrument, LoadError};
pub use merge::{merge, NO_EVENT_MAGNITUDE};
pub use pivot::{pivot, WideTable};
pub use records::{EventRecord, InstrumentRecord, WideRow};
pub use schema::{normalize, role_for, CanonicalRole, SchemaError};
