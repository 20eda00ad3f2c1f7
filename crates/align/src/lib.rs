//! `docalign-align`: key-based record alignment and deduplication engine.
//!
//! Pure engine crate: receives already-loaded tables, returns classified or
//! deduplicated tables. No CLI or IO dependencies.

pub mod align;
pub mod batch;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod model;
pub mod normalize;
pub mod summary;

pub use align::{align, align_with};
pub use batch::{align_batch, align_batch_parallel, BatchOutcome, BatchSummary};
pub use config::{AlignOptions, Job};
pub use dedupe::{combine, combine_and_dedupe, dedupe, dedupe_with_report};
pub use error::{AlignError, TableSide};
pub use model::{DedupeOutcome, NamedTable, Provenance, ResultSet, Scalar, Table};
pub use normalize::{normalize_keys, NormalizedKey};
pub use summary::{AlignSummary, DedupeSummary};
