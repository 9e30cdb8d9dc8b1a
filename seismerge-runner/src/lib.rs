//! Seismerge Runner — batch orchestration on top of `seismerge-core`.
//!
//! This crate wires the reconciliation engine into a runnable batch:
//! - TOML configuration with a `DATABASE_URL` environment override
//! - The discover → load → pivot → aggregate → merge → persist sequence
//! - Partial-failure accounting (skipped instruments never abort the run)
//! - A SQLite sink that replaces the training table transactionally
//! - A run summary with a BLAKE3 fingerprint of the merged rows

pub mod config;
pub mod pipeline;
pub mod sink;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{check, run, PipelineError, RunSummary};
pub use sink::{SinkError, SqliteSink};
