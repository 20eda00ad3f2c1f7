use std::collections::{HashMap, HashSet};

use crate::error::{AlignError, TableSide};
use crate::model::{DedupeOutcome, Scalar, Table};
use crate::normalize::normalize_keys;

/// Concatenate tables in order under the union of their columns.
///
/// Columns appear in first-seen order; a row gets `Null` for every column its
/// source table lacks. Needs at least two tables.
pub fn combine(tables: &[Table]) -> Result<Table, AlignError> {
    if tables.len() < 2 {
        return Err(AlignError::InsufficientInput {
            required: 2,
            actual: tables.len(),
        });
    }

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for table in tables {
        for name in table.columns() {
            if !positions.contains_key(name.as_str()) {
                positions.insert(name, columns.len());
                columns.push(name.clone());
            }
        }
    }

    let total: usize = tables.iter().map(|t| t.len()).sum();
    let mut rows = Vec::with_capacity(total);
    for table in tables {
        let targets: Vec<usize> = table.columns().iter().map(|c| positions[c.as_str()]).collect();
        for row in table.rows() {
            let mut out = vec![Scalar::Null; columns.len()];
            for (value, &target) in row.iter().zip(&targets) {
                out[target] = value.clone();
            }
            rows.push(out);
        }
    }

    log::debug!("combined {} tables: {} columns, {} rows", tables.len(), columns.len(), rows.len());
    Ok(Table::from_parts(columns, rows))
}

/// Keep the first row for every normalized key value.
///
/// Rows whose key is missing are never duplicates of one another, so all of
/// them are kept.
pub fn dedupe(table: &Table, unique_key: &str) -> Result<Table, AlignError> {
    dedupe_with_report(table, unique_key).map(|outcome| outcome.table)
}

/// [`dedupe`] plus what was removed.
pub fn dedupe_with_report(table: &Table, unique_key: &str) -> Result<DedupeOutcome, AlignError> {
    let keys = normalize_keys(table, unique_key, TableSide::Combined)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut duplicate_keys = Vec::new();
    let mut rows = Vec::new();
    let mut removed = 0;

    for (row, key) in table.rows().iter().zip(&keys) {
        match key.as_str() {
            Some(k) if !seen.insert(k) => {
                removed += 1;
                if reported.insert(k) {
                    duplicate_keys.push(k.to_string());
                }
            }
            _ => rows.push(row.clone()),
        }
    }

    log::debug!(
        "dedupe on '{unique_key}': kept {}, removed {removed} ({} duplicated keys)",
        rows.len(),
        duplicate_keys.len(),
    );

    Ok(DedupeOutcome {
        table: Table::from_parts(table.columns().to_vec(), rows),
        removed,
        duplicate_keys,
    })
}

/// `combine` followed by `dedupe` on `unique_key`.
pub fn combine_and_dedupe(tables: &[Table], unique_key: &str) -> Result<DedupeOutcome, AlignError> {
    let combined = combine(tables)?;
    dedupe_with_report(&combined, unique_key)
}
