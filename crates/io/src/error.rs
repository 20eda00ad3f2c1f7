use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// File extension / format hint not recognized.
    UnsupportedFormat(String),
    /// Malformed content.
    Parse { source_name: String, message: String },
    /// Requested sheet not present in the loaded file.
    SheetNotFound { sheet: String, available: Vec<String> },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(what) => write!(f, "unsupported format: {what}"),
            Self::Parse { source_name, message } => {
                write!(f, "{source_name}: parse error: {message}")
            }
            Self::SheetNotFound { sheet, available } => {
                if available.is_empty() {
                    write!(f, "sheet '{sheet}' not found (file has no sheets)")
                } else {
                    write!(f, "sheet '{sheet}' not found (available: {})", available.join(", "))
                }
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    Xlsx(String),
    Csv(String),
    Json(String),
    Io(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xlsx(msg) => write!(f, "XLSX export error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV export error: {msg}"),
            Self::Json(msg) => write!(f, "JSON export error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}
