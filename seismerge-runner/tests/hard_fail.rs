//! Tests for the failure modes that must abort a run.
//!
//! The partial-failure policy tolerates individual bad files; these tests
//! pin down the conditions that are genuinely fatal — missing configuration,
//! failed discovery, zero usable instruments, and an unwritable destination.

use seismerge_runner::config::{ConfigError, PipelineConfig, PipelineSection};
use seismerge_runner::pipeline::{self, PipelineError};
use std::path::Path;

fn config_for(data_dir: &Path, database_url: Option<String>) -> PipelineConfig {
    // The connection string must come from the fixture, not the ambient env.
    std::env::remove_var("DATABASE_URL");
    PipelineConfig {
        pipeline: PipelineSection {
            data_dir: data_dir.to_path_buf(),
            database_url,
            ..PipelineSection::default()
        },
        instruments: [("TSM".to_string(), "TSM_weekly_data.csv".to_string())]
            .into_iter()
            .collect(),
    }
}

fn write_valid_fixture(dir: &Path) {
    std::fs::write(
        dir.join("TSM_weekly_data.csv"),
        "Date,Close\n2024-06-03,100.0\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("2024-06-17 10_32_00.csv"),
        "Origin Date,ML\n2024-06-03 01:12:00,4.2\n",
    )
    .unwrap();
}

#[test]
fn missing_connection_string_aborts_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    // No fixture files at all: config must fail before discovery would.
    let config = config_for(dir.path(), None);

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::MissingDatabaseUrl)
    ));
}

#[test]
fn no_event_candidate_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("TSM_weekly_data.csv"),
        "Date,Close\n2024-06-03,100.0\n",
    )
    .unwrap();

    let db = dir.path().join("out.db");
    let config = config_for(dir.path(), Some(db.display().to_string()));

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Discovery(_)));
    assert!(!db.exists());
}

#[test]
fn zero_loaded_instruments_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("2024-06-17 10_32_00.csv"),
        "Origin Date,ML\n2024-06-03 01:12:00,4.2\n",
    )
    .unwrap();
    // The one configured instrument file does not exist.
    let db = dir.path().join("out.db");
    let config = config_for(dir.path(), Some(db.display().to_string()));

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::NoInstruments { attempted: 1 }
    ));
    assert!(!db.exists());
}

#[test]
fn unwritable_destination_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_valid_fixture(dir.path());

    let config = config_for(
        dir.path(),
        Some("/nonexistent-dir/subdir/out.db".to_string()),
    );

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Sink(_)));
}

#[test]
fn a_failed_run_leaves_the_previous_table_intact() {
    let dir = tempfile::tempdir().unwrap();
    write_valid_fixture(dir.path());

    let db = dir.path().join("out.db");
    let config = config_for(dir.path(), Some(db.display().to_string()));
    pipeline::run(&config).unwrap();

    // Second run fails at discovery: the event export is gone.
    std::fs::remove_file(dir.path().join("2024-06-17 10_32_00.csv")).unwrap();
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Discovery(_)));

    let conn = rusqlite::Connection::open(&db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM processed_training_data", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(count, 1);
}
