//! `docalign-io`: table loading and result export.
//!
//! Reads CSV/TSV, Excel-family workbooks and JSON into [`docalign_align::Table`]s,
//! and writes alignment results back out as XLSX, CSV or JSON.

pub mod cache;
pub mod csv;
pub mod error;
pub mod export;
mod header;
pub mod json;
pub mod loader;
pub mod xlsx;

pub use cache::{AlignCache, ContentHash, LoadCache, LoadedFile, TableRef};
pub use error::{ExportError, LoadError};
pub use loader::{load_bytes, load_path, select_sheet, source_name, LoadOptions, TableFormat};
