//! One template against many inputs. Every pairing is independent: a failed
//! input is reported in its own outcome and never stops the others.

use serde::Serialize;

use crate::align::align_with;
use crate::config::AlignOptions;
use crate::error::AlignError;
use crate::model::{NamedTable, ResultSet, Table};

#[derive(Debug)]
pub struct BatchOutcome {
    pub input: String,
    pub result: Result<ResultSet, AlignError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub inputs: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(outcomes: &[BatchOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
        Self {
            inputs: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

/// Align each input in order on the calling thread.
pub fn align_batch(
    template: &Table,
    inputs: &[NamedTable],
    key: &str,
    options: &AlignOptions,
) -> Vec<BatchOutcome> {
    inputs
        .iter()
        .map(|input| BatchOutcome {
            input: input.name.clone(),
            result: align_with(template, &input.table, key, options),
        })
        .collect()
}

/// Align each input on its own scoped thread. Outcomes come back in input order.
pub fn align_batch_parallel(
    template: &Table,
    inputs: &[NamedTable],
    key: &str,
    options: &AlignOptions,
) -> Vec<BatchOutcome> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let handle =
                    scope.spawn(move || align_with(template, &input.table, key, options));
                (input.name.clone(), handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(name, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(AlignError::WorkerPanic { input: name.clone() }));
                BatchOutcome { input: name, result }
            })
            .collect()
    })
}
