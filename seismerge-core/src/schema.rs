//! Canonical column roles and header normalization.
//!
//! Input files name their columns freely (`Date`, ` date `, `Close_Price`,
//! `ML`). Loading never matches on literal names — only on which column
//! plays which semantic role. `role_for` classifies a single header cell;
//! `normalize` resolves a whole header against the roles a file must provide.

use std::collections::HashMap;
use thiserror::Error;

/// Semantic meaning of a column, independent of its literal header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalRole {
    Date,
    Close,
    Magnitude,
}

impl CanonicalRole {
    /// Stable lowercase name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalRole::Date => "date",
            CanonicalRole::Close => "close",
            CanonicalRole::Magnitude => "magnitude",
        }
    }
}

/// Classify a header cell, or `None` when it carries no recognized role.
///
/// Matching is case-insensitive and substring-based after trimming
/// whitespace: `date` → Date, `close` → Close, `mag` or `ml` → Magnitude
/// (the seismic database exports local magnitude as `ML`). A cell that
/// matches several patterns takes the first role in that order.
pub fn role_for(column_name: &str) -> Option<CanonicalRole> {
    let name = column_name.trim().to_lowercase();
    if name.contains("date") {
        Some(CanonicalRole::Date)
    } else if name.contains("close") {
        Some(CanonicalRole::Close)
    } else if name.contains("mag") || name.contains("ml") {
        Some(CanonicalRole::Magnitude)
    } else {
        None
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no column matches required role '{role}' (header: {header:?})")]
    MissingRole {
        role: &'static str,
        header: Vec<String>,
    },
}

/// Resolve a header against the roles a file must provide.
///
/// Every column is classified in file-declared order and the first match per
/// role wins. Returns role → column index. A required role with no matching
/// column fails, naming the role.
pub fn normalize(
    columns: &[String],
    required: &[CanonicalRole],
) -> Result<HashMap<CanonicalRole, usize>, SchemaError> {
    let mut mapping: HashMap<CanonicalRole, usize> = HashMap::new();
    for (idx, column) in columns.iter().enumerate() {
        if let Some(role) = role_for(column) {
            mapping.entry(role).or_insert(idx);
        }
    }

    for role in required {
        if !mapping.contains_key(role) {
            return Err(SchemaError::MissingRole {
                role: role.name(),
                header: columns.to_vec(),
            });
        }
    }

    Ok(mapping)
}
