use std::fmt;

/// Which table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSide {
    Template,
    Input,
    /// The concatenated table produced by `combine`.
    Combined,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Input => write!(f, "input"),
            Self::Combined => write!(f, "combined"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// Key column absent from a table the operation needs it in.
    MissingKey { side: TableSide, key: String },
    /// Combine called with too few tables.
    InsufficientInput { required: usize, actual: usize },
    /// Table shape violates the header invariant (duplicate column, ragged row).
    InvalidTable(String),
    /// Invalid alignment options (empty or equal suffixes).
    InvalidOptions(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Job file validation error.
    ConfigValidation(String),
    /// A batch worker thread panicked while aligning this input.
    WorkerPanic { input: String },
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey { side, key } => {
                write!(f, "{side} table: missing key column '{key}'")
            }
            Self::InsufficientInput { required, actual } => {
                write!(f, "at least {required} tables are required, got {actual}")
            }
            Self::InvalidTable(msg) => write!(f, "invalid table: {msg}"),
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::WorkerPanic { input } => write!(f, "worker aligning '{input}' panicked"),
        }
    }
}

impl std::error::Error for AlignError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_names_side_and_column() {
        let err = AlignError::MissingKey { side: TableSide::Input, key: "sku".into() };
        assert_eq!(err.to_string(), "input table: missing key column 'sku'");
    }

    #[test]
    fn insufficient_input_message() {
        let err = AlignError::InsufficientInput { required: 2, actual: 1 };
        assert!(err.to_string().contains("got 1"));
    }
}
