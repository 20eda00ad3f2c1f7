//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad arguments, unknown sheet, bad suffixes) |
//! | 3    | IO error (unreadable input, unwritable output)           |
//! | 4    | Parse error or unsupported file format                   |
//! | 5    | Key column missing from a table                          |
//! | 6    | Not enough tables for the operation                      |
//! | 7    | Batch partially failed (some inputs failed, some passed) |
//! | 8    | Invalid job file                                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the mapping functions below

use docalign_align::AlignError;
use docalign_io::{ExportError, LoadError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Data (3-8)
// =============================================================================

/// Input file unreadable or output unwritable.
pub const EXIT_IO: u8 = 3;

/// Malformed file content, or an extension no loader handles.
pub const EXIT_PARSE: u8 = 4;

/// The key column is absent from the template, an input, or the combined table.
pub const EXIT_MISSING_KEY: u8 = 5;

/// `combine` given fewer than two tables.
pub const EXIT_INSUFFICIENT_INPUT: u8 = 6;

/// Some batch inputs failed while others succeeded.
/// Successful inputs still have their output written.
pub const EXIT_PARTIAL: u8 = 7;

/// Job file could not be parsed or failed validation.
pub const EXIT_INVALID_JOB: u8 = 8;

// =============================================================================
// Error Mapping
// =============================================================================

pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::UnsupportedFormat(_) | LoadError::Parse { .. } => EXIT_PARSE,
        LoadError::SheetNotFound { .. } => EXIT_USAGE,
        LoadError::Io(_) => EXIT_IO,
    }
}

pub fn align_exit_code(err: &AlignError) -> u8 {
    match err {
        AlignError::MissingKey { .. } => EXIT_MISSING_KEY,
        AlignError::InsufficientInput { .. } => EXIT_INSUFFICIENT_INPUT,
        AlignError::InvalidTable(_) => EXIT_PARSE,
        AlignError::InvalidOptions(_) => EXIT_USAGE,
        AlignError::ConfigParse(_) | AlignError::ConfigValidation(_) => EXIT_INVALID_JOB,
        AlignError::WorkerPanic { .. } => EXIT_ERROR,
    }
}

/// Every export failure means the result never reached disk.
pub fn export_exit_code(_err: &ExportError) -> u8 {
    EXIT_IO
}
