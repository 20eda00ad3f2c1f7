// Content-addressed caches for loaded files and alignment results
//
// Entries are keyed by a BLAKE3 hash of the file bytes, so an edited file
// misses even when its path and modification time are unchanged.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use docalign_align::{align_with, AlignError, AlignOptions, NamedTable, ResultSet, Table};

use crate::error::LoadError;
use crate::loader::{load_bytes, source_name, LoadOptions, TableFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(blake3::Hash);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ----------------------------------------------------------------------------
// Load cache
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub hash: ContentHash,
    pub tables: Arc<Vec<NamedTable>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LoadKey {
    hash: ContentHash,
    format: TableFormat,
    name: String,
    options: LoadOptions,
}

/// Parsed files by content. A template shared across a batch is parsed once.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<LoadKey, Arc<Vec<NamedTable>>>,
    hits: usize,
    misses: usize,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        format: TableFormat,
        name: &str,
        options: &LoadOptions,
    ) -> Result<LoadedFile, LoadError> {
        let hash = ContentHash::of(bytes);
        let key = LoadKey {
            hash,
            format,
            name: name.to_string(),
            options: *options,
        };

        if let Some(tables) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("load cache hit: {name} ({})", &hash.to_hex()[..12]);
            return Ok(LoadedFile { hash, tables: Arc::clone(tables) });
        }

        self.misses += 1;
        let tables = Arc::new(load_bytes(bytes, format, name, options)?);
        self.entries.insert(key, Arc::clone(&tables));
        Ok(LoadedFile { hash, tables })
    }

    pub fn load_path(&mut self, path: &Path, options: &LoadOptions) -> Result<LoadedFile, LoadError> {
        let format = TableFormat::from_path(path)?;
        let bytes = std::fs::read(path)
            .map_err(|e| LoadError::Io(format!("cannot read {}: {e}", path.display())))?;
        self.load_bytes(&bytes, format, &source_name(path), options)
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Alignment cache
// ----------------------------------------------------------------------------

/// One side of an alignment: file content, the sheet taken from it and the
/// options it was loaded with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub hash: ContentHash,
    pub sheet: String,
    pub options: LoadOptions,
}

impl TableRef {
    pub fn new(hash: ContentHash, sheet: impl Into<String>, options: LoadOptions) -> Self {
        Self { hash, sheet: sheet.into(), options }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AlignKey {
    template: TableRef,
    input: TableRef,
    key: String,
    template_suffix: String,
    input_suffix: String,
}

/// Alignment results by (template content, input content, key, options).
#[derive(Debug, Default)]
pub struct AlignCache {
    entries: HashMap<AlignKey, Arc<ResultSet>>,
    hits: usize,
    misses: usize,
}

impl AlignCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result or compute, store and return it. Errors are
    /// not cached.
    pub fn get_or_align(
        &mut self,
        template: (&TableRef, &Table),
        input: (&TableRef, &Table),
        key: &str,
        options: &AlignOptions,
    ) -> Result<Arc<ResultSet>, AlignError> {
        let cache_key = AlignKey {
            template: template.0.clone(),
            input: input.0.clone(),
            key: key.to_string(),
            template_suffix: options.template_suffix.clone(),
            input_suffix: options.input_suffix.clone(),
        };

        if let Some(result) = self.entries.get(&cache_key) {
            self.hits += 1;
            return Ok(Arc::clone(result));
        }

        self.misses += 1;
        let result = Arc::new(align_with(template.1, input.1, key, options)?);
        self.entries.insert(cache_key, Arc::clone(&result));
        Ok(result)
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
