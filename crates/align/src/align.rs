use std::collections::{HashMap, HashSet};

use crate::config::AlignOptions;
use crate::error::{AlignError, TableSide};
use crate::model::{Provenance, ResultSet, Scalar, Table};
use crate::normalize::{normalize_keys, NormalizedKey};

/// Align `input` against `template` on `key` with default column suffixes.
pub fn align(template: &Table, input: &Table, key: &str) -> Result<ResultSet, AlignError> {
    align_with(template, input, key, &AlignOptions::default())
}

/// Full outer join on the normalized key.
///
/// Output order: template keys in first-occurrence order (matched pairs are
/// template-row-major, then input order), then unmatched input keys in their
/// first-occurrence order. Rows with a missing key never match.
pub fn align_with(
    template: &Table,
    input: &Table,
    key: &str,
    options: &AlignOptions,
) -> Result<ResultSet, AlignError> {
    options.validate()?;
    let template_keys = normalize_keys(template, key, TableSide::Template)?;
    let input_keys = normalize_keys(input, key, TableSide::Input)?;

    let template_groups = group_rows(&template_keys);
    let input_groups = group_rows(&input_keys);
    let input_index: HashMap<&str, usize> = input_groups
        .iter()
        .enumerate()
        .filter_map(|(gi, g)| g.key.map(|k| (k, gi)))
        .collect();

    let layout = MatchedLayout::build(template, input, key, options);

    let mut matched = Vec::new();
    let mut template_only = Vec::new();
    let mut input_only = Vec::new();
    let mut provenance = Provenance::default();
    let mut input_group_used = vec![false; input_groups.len()];

    for group in &template_groups {
        match group.key.and_then(|k| input_index.get(k)) {
            Some(&gi) => {
                input_group_used[gi] = true;
                for &t in &group.rows {
                    for &i in &input_groups[gi].rows {
                        matched.push(layout.combine(&template.rows()[t], &input.rows()[i]));
                        provenance.matched.push((t, i));
                    }
                }
            }
            None => {
                for &t in &group.rows {
                    template_only.push(template.rows()[t].clone());
                    provenance.template_only.push(t);
                }
            }
        }
    }

    for (gi, group) in input_groups.iter().enumerate() {
        if input_group_used[gi] {
            continue;
        }
        for &i in &group.rows {
            input_only.push(input.rows()[i].clone());
            provenance.input_only.push(i);
        }
    }

    log::debug!(
        "align on '{key}': {} template rows, {} input rows -> {} matched, {} template-only, {} input-only",
        template.len(),
        input.len(),
        matched.len(),
        template_only.len(),
        input_only.len(),
    );

    Ok(ResultSet {
        key: key.to_string(),
        matched: Table::from_parts(layout.columns, matched),
        template_only: Table::from_parts(template.columns().to_vec(), template_only),
        input_only: Table::from_parts(input.columns().to_vec(), input_only),
        provenance,
    })
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Rows sharing one normalized key. A missing key is always its own group.
struct KeyGroup<'a> {
    key: Option<&'a str>,
    rows: Vec<usize>,
}

fn group_rows(keys: &[NormalizedKey]) -> Vec<KeyGroup<'_>> {
    let mut groups: Vec<KeyGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (row, key) in keys.iter().enumerate() {
        match key.as_str() {
            Some(k) => match index.get(k) {
                Some(&gi) => groups[gi].rows.push(row),
                None => {
                    index.insert(k, groups.len());
                    groups.push(KeyGroup { key: Some(k), rows: vec![row] });
                }
            },
            None => groups.push(KeyGroup { key: None, rows: vec![row] }),
        }
    }

    groups
}

// ---------------------------------------------------------------------------
// Matched schema
// ---------------------------------------------------------------------------

/// Column plan for matched rows: every template column, then the input's
/// non-key columns.
struct MatchedLayout {
    columns: Vec<String>,
    input_cols: Vec<usize>,
}

impl MatchedLayout {
    fn build(template: &Table, input: &Table, key: &str, options: &AlignOptions) -> Self {
        let template_names: HashSet<&str> = template.columns().iter().map(|c| c.as_str()).collect();
        let input_names: HashSet<&str> = input.columns().iter().map(|c| c.as_str()).collect();
        let collides =
            |name: &str| name != key && template_names.contains(name) && input_names.contains(name);

        // (output name, qualified)
        let mut plan: Vec<(String, bool)> = Vec::new();
        for name in template.columns() {
            if collides(name) {
                plan.push((format!("{name}{}", options.template_suffix), true));
            } else {
                plan.push((name.clone(), false));
            }
        }

        let mut input_cols = Vec::new();
        for (idx, name) in input.columns().iter().enumerate() {
            if name == key {
                continue;
            }
            input_cols.push(idx);
            if collides(name) {
                plan.push((format!("{name}{}", options.input_suffix), true));
            } else {
                plan.push((name.clone(), false));
            }
        }

        // Qualified names yield to pass-through names they would shadow.
        let mut used: HashSet<String> =
            plan.iter().filter(|(_, q)| !q).map(|(n, _)| n.clone()).collect();
        for (name, _) in plan.iter_mut().filter(|(_, q)| *q) {
            let base = name.clone();
            let mut n = 2;
            while used.contains(name.as_str()) {
                *name = format!("{base}_{n}");
                n += 1;
            }
            used.insert(name.clone());
        }

        Self {
            columns: plan.into_iter().map(|(n, _)| n).collect(),
            input_cols,
        }
    }

    fn combine(&self, template_row: &[Scalar], input_row: &[Scalar]) -> Vec<Scalar> {
        let mut row = Vec::with_capacity(self.columns.len());
        row.extend_from_slice(template_row);
        row.extend(self.input_cols.iter().map(|&c| input_row[c].clone()));
        row
    }
}
