//! `docalign combine`: concatenate tables and keep the first row per key.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use docalign_align::config::OutputFormat;
use docalign_align::{combine_and_dedupe, DedupeSummary, Table};
use docalign_io::export::{export_json, export_table_csv, write_bytes, write_table_xlsx};
use docalign_io::{ExportError, LoadOptions};
use serde::Serialize;

use crate::sources::{Loader, Source};
use crate::{missing_key, CliError};

pub(crate) const COMBINED_SHEET: &str = "Combined";

pub(crate) struct CombineRequest {
    pub inputs: Vec<Source>,
    pub key: String,
    pub load: LoadOptions,
    pub output: PathBuf,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct CombineReport<'a> {
    engine_version: &'static str,
    run_at: String,
    key: &'a str,
    inputs: Vec<String>,
    output: String,
    summary: DedupeSummary,
    duplicate_keys: &'a [String],
}

/// Output path and format from optional flags. An explicit format wins, then
/// the output's extension, then xlsx.
pub(crate) fn resolve_output(output: Option<PathBuf>, format: Option<OutputFormat>) -> (PathBuf, OutputFormat) {
    let format = format
        .or_else(|| output.as_deref().and_then(format_from_extension))
        .unwrap_or_default();
    let output = output.unwrap_or_else(|| PathBuf::from(format!("combined.{}", format.extension())));
    (output, format)
}

fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "xlsx" => Some(OutputFormat::Xlsx),
        "csv" => Some(OutputFormat::Csv),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}

pub(crate) fn run_combine(req: CombineRequest, json_output: bool) -> Result<(), CliError> {
    if req.key.is_empty() {
        return Err(CliError::usage("--key must not be empty"));
    }

    let mut loader = Loader::new(req.load);
    let mut tables = Vec::with_capacity(req.inputs.len());
    for source in &req.inputs {
        let loaded = loader.load(source)?;
        if !loaded.table.has_column(&req.key) {
            return Err(missing_key(source, &req.key, loaded.table.columns()));
        }
        tables.push(loaded.table);
    }

    let outcome = combine_and_dedupe(&tables, &req.key).map_err(|e| CliError::align(&e))?;
    write_output(&outcome.table, &req.output, req.format).map_err(|e| CliError::export(&e))?;

    let summary = DedupeSummary::of(&outcome);
    eprintln!(
        "combined {} table(s): {} rows -> {} rows ({} duplicate(s) removed) -> {}",
        tables.len(),
        summary.rows_in,
        summary.rows_out,
        summary.removed,
        req.output.display(),
    );

    if json_output {
        let report = CombineReport {
            engine_version: env!("CARGO_PKG_VERSION"),
            run_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            key: &req.key,
            inputs: req.inputs.iter().map(Source::label).collect(),
            output: req.output.display().to_string(),
            summary,
            duplicate_keys: &outcome.duplicate_keys,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    Ok(())
}

fn write_output(table: &Table, path: &Path, format: OutputFormat) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ExportError::Io(format!("cannot create {}: {e}", parent.display())))?;
    }
    match format {
        OutputFormat::Xlsx => write_table_xlsx(table, COMBINED_SHEET, path),
        OutputFormat::Csv => write_bytes(path, &export_table_csv(table, b',')?),
        OutputFormat::Json => write_bytes(path, &export_json(table)?),
    }
}
