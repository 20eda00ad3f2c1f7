use std::collections::HashSet;

use serde::Serialize;

use crate::model::{DedupeOutcome, ResultSet};

/// Row counts for one alignment, derived from its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignSummary {
    pub template_rows: usize,
    pub input_rows: usize,
    /// Rows in the matched table (pairs, so duplicates multiply).
    pub matched: usize,
    pub template_rows_matched: usize,
    pub input_rows_matched: usize,
    pub template_only: usize,
    pub input_only: usize,
}

impl AlignSummary {
    pub fn of(result: &ResultSet) -> Self {
        let p = &result.provenance;
        let template_rows_matched = p.matched.iter().map(|(t, _)| *t).collect::<HashSet<_>>().len();
        let input_rows_matched = p.matched.iter().map(|(_, i)| *i).collect::<HashSet<_>>().len();
        Self {
            template_rows: template_rows_matched + p.template_only.len(),
            input_rows: input_rows_matched + p.input_only.len(),
            matched: p.matched.len(),
            template_rows_matched,
            input_rows_matched,
            template_only: p.template_only.len(),
            input_only: p.input_only.len(),
        }
    }

    pub fn is_fully_matched(&self) -> bool {
        self.template_only == 0 && self.input_only == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupeSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub removed: usize,
    pub duplicated_keys: usize,
}

impl DedupeSummary {
    pub fn of(outcome: &DedupeOutcome) -> Self {
        Self {
            rows_in: outcome.table.len() + outcome.removed,
            rows_out: outcome.table.len(),
            removed: outcome.removed,
            duplicated_keys: outcome.duplicate_keys.len(),
        }
    }
}
