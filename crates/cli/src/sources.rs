//! Input files and how the CLI loads them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docalign_align::NamedTable;
use docalign_io::{select_sheet, source_name, LoadCache, LoadOptions};

use crate::CliError;

pub(crate) fn load_options(raw_strings: bool) -> LoadOptions {
    LoadOptions { infer_types: !raw_strings }
}

/// A file plus the sheet to take from it (first sheet when `None`).
#[derive(Debug, Clone)]
pub(crate) struct Source {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

impl Source {
    pub fn new(path: PathBuf, sheet: Option<String>) -> Self {
        Self { path, sheet }
    }

    /// Job files name paths relative to their own directory.
    pub fn relative_to(base: &Path, file: &str, sheet: Option<String>) -> Self {
        Self::new(base.join(file), sheet)
    }

    pub fn label(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("{}[{sheet}]", self.path.display()),
            None => self.path.display().to_string(),
        }
    }

    pub fn stem(&self) -> String {
        source_name(&self.path)
    }
}

/// Loads through a [`LoadCache`], so a file named twice is parsed once.
pub(crate) struct Loader {
    cache: LoadCache,
    options: LoadOptions,
}

impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Self { cache: LoadCache::new(), options }
    }

    pub fn load_all(&mut self, path: &Path) -> Result<Arc<Vec<NamedTable>>, CliError> {
        let loaded = self.cache.load_path(path, &self.options).map_err(|e| CliError::load(&e))?;
        log::debug!("{}: {} sheet(s), blake3 {}", path.display(), loaded.tables.len(), loaded.hash);
        Ok(loaded.tables)
    }

    pub fn load(&mut self, source: &Source) -> Result<NamedTable, CliError> {
        let tables = self.load_all(&source.path)?;
        let table = select_sheet(&tables, source.sheet.as_deref()).map_err(|e| {
            let mut err = CliError::load(&e);
            err.message = format!("{}: {}", source.path.display(), err.message);
            err
        })?;
        Ok(table.clone())
    }

    pub fn cache_stats(&self) -> (usize, usize) {
        (self.cache.hits(), self.cache.misses())
    }
}
