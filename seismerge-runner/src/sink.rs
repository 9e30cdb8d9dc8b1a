//! SQLite sink: transactional full replace of the training table.
//!
//! The merged rows supersede any prior table contents entirely — drop,
//! recreate with this run's column set, insert, commit. Everything happens
//! inside one transaction, so a failed run leaves the previous table intact
//! and a reader never observes a half-written replacement. The connection is
//! dropped with the sink, success or error.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use seismerge_core::records::WideRow;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open database {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to replace table {table}: {source}")]
    Replace {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Destination for the merged wide table.
#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
    table: String,
}

impl SqliteSink {
    /// Open (creating if needed) the destination database.
    ///
    /// Accepts a bare filesystem path, `:memory:`, or a `sqlite://` URL as
    /// produced by ORM-style connection strings.
    pub fn open(database_url: &str, table: &str) -> Result<Self, SinkError> {
        let path = database_url
            .strip_prefix("sqlite:///")
            .or_else(|| database_url.strip_prefix("sqlite://"))
            .unwrap_or(database_url);

        let conn = Connection::open(path).map_err(|e| SinkError::Open {
            url: database_url.to_string(),
            source: e,
        })?;

        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Replace the table with this run's rows.
    ///
    /// `instruments` fixes the column set and order: one `<id>_Close` REAL
    /// column per successfully loaded instrument, alongside `merge_date`
    /// (TEXT, the primary key) and `max_magnitude` (REAL NOT NULL). A date
    /// an instrument has no close for stores NULL in that cell, never zero.
    pub fn replace(&mut self, instruments: &[String], rows: &[WideRow]) -> Result<(), SinkError> {
        let table = self.table.clone();
        self.replace_inner(instruments, rows)
            .map_err(|e| SinkError::Replace { table, source: e })
    }

    fn replace_inner(
        &mut self,
        instruments: &[String],
        rows: &[WideRow],
    ) -> Result<(), rusqlite::Error> {
        let table = quote_ident(&self.table);

        let mut columns = vec!["merge_date TEXT NOT NULL PRIMARY KEY".to_string()];
        for instrument in instruments {
            columns.push(format!("{} REAL", quote_ident(&close_column(instrument))));
        }
        columns.push("max_magnitude REAL NOT NULL".to_string());

        let mut names = vec!["merge_date".to_string()];
        names.extend(instruments.iter().map(|i| quote_ident(&close_column(i))));
        names.push("max_magnitude".to_string());
        let placeholders = vec!["?"; names.len()].join(", ");
        let insert = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            names.join(", ")
        );

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({});",
            columns.join(", ")
        ))?;

        {
            let mut stmt = tx.prepare(&insert)?;
            for row in rows {
                let mut values: Vec<Value> = Vec::with_capacity(instruments.len() + 2);
                values.push(Value::Text(format_date(row.date_key)));
                for instrument in instruments {
                    values.push(match row.closes.get(instrument) {
                        Some(close) => Value::Real(*close),
                        None => Value::Null,
                    });
                }
                values.push(Value::Real(row.max_magnitude));
                stmt.execute(params_from_iter(values))?;
            }
        }

        tx.commit()?;
        info!(
            table = %self.table,
            rows = rows.len(),
            instruments = instruments.len(),
            "training table replaced"
        );
        Ok(())
    }
}

/// Output column for an instrument's close price.
pub fn close_column(instrument_id: &str) -> String {
    format!("{instrument_id}_Close")
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
