//! `docalign align`: one template against one or more inputs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use docalign_align::config::OutputFormat;
use docalign_align::{
    align_batch, align_batch_parallel, AlignOptions, AlignSummary, BatchSummary, NamedTable, ResultSet,
};
use docalign_io::export::{
    alignment_file_name, export_json, write_bytes, write_result_csv, write_result_xlsx,
};
use docalign_io::{ExportError, LoadOptions};
use serde::Serialize;

use crate::exit_codes::{EXIT_ERROR, EXIT_PARTIAL};
use crate::sources::{Loader, Source};
use crate::{missing_key, CliError};

pub(crate) struct AlignRequest {
    pub template: Source,
    pub inputs: Vec<Source>,
    pub key: String,
    pub options: AlignOptions,
    pub load: LoadOptions,
    pub parallel: bool,
    pub out_dir: PathBuf,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct AlignReport {
    engine_version: &'static str,
    run_at: String,
    key: String,
    template: String,
    format: &'static str,
    batch: BatchSummary,
    inputs: Vec<InputReport>,
}

#[derive(Serialize)]
struct InputReport {
    input: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<AlignSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip)]
    failure: Option<CliError>,
}

impl InputReport {
    fn succeeded(source: &Source, summary: AlignSummary, outputs: &[PathBuf]) -> Self {
        Self {
            input: source.label(),
            ok: true,
            summary: Some(summary),
            outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
            error: None,
            failure: None,
        }
    }

    fn failed(source: &Source, err: CliError) -> Self {
        Self {
            input: source.label(),
            ok: false,
            summary: None,
            outputs: Vec::new(),
            error: Some(err.message.clone()),
            failure: Some(err),
        }
    }
}

pub(crate) fn run_align(req: AlignRequest, json_output: bool) -> Result<(), CliError> {
    if req.key.is_empty() {
        return Err(CliError::usage("--key must not be empty"));
    }
    req.options.validate().map_err(|e| CliError::align(&e))?;

    let mut loader = Loader::new(req.load);
    let template = loader.load(&req.template)?;
    if !template.table.has_column(&req.key) {
        return Err(missing_key(&req.template, &req.key, template.table.columns()));
    }

    std::fs::create_dir_all(&req.out_dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", req.out_dir.display())))?;

    eprintln!(
        "{}: aligning {} input(s) on '{}'",
        req.template.label(),
        req.inputs.len(),
        req.key
    );

    // Per input: a load failure now, or the alignment outcome after the batch
    let mut results: Vec<Option<Result<ResultSet, CliError>>> = Vec::with_capacity(req.inputs.len());
    let mut loaded: Vec<NamedTable> = Vec::new();
    let mut positions: Vec<usize> = Vec::new();
    for (i, source) in req.inputs.iter().enumerate() {
        match loader.load(source) {
            Ok(table) => {
                positions.push(i);
                loaded.push(NamedTable::new(source.label(), table.table));
                results.push(None);
            }
            Err(err) => results.push(Some(Err(err))),
        }
    }

    let outcomes = if req.parallel {
        align_batch_parallel(&template.table, &loaded, &req.key, &req.options)
    } else {
        align_batch(&template.table, &loaded, &req.key, &req.options)
    };
    for (pos, outcome) in positions.into_iter().zip(outcomes) {
        results[pos] = Some(outcome.result.map_err(|e| CliError::align(&e)));
    }

    let (hits, misses) = loader.cache_stats();
    log::debug!("load cache: {hits} hit(s), {misses} miss(es)");

    let stems = output_stems(&req.inputs);
    let mut reports = Vec::with_capacity(req.inputs.len());
    for ((source, stem), result) in req.inputs.iter().zip(&stems).zip(results) {
        let result = result.unwrap_or_else(|| Err(CliError::new(EXIT_ERROR, "input was not aligned")));
        let report = match result {
            Ok(result) => match write_outputs(&result, &req.out_dir, stem, req.format) {
                Ok(paths) => {
                    let summary = AlignSummary::of(&result);
                    eprintln!(
                        "  {}: {} matched, {} template-only, {} input-only -> {}",
                        source.label(),
                        summary.matched,
                        summary.template_only,
                        summary.input_only,
                        paths
                            .iter()
                            .map(|p| p.display().to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                    );
                    InputReport::succeeded(source, summary, &paths)
                }
                Err(e) => InputReport::failed(source, CliError::export(&e)),
            },
            Err(err) => InputReport::failed(source, err),
        };
        if let Some(error) = &report.error {
            eprintln!("  {}: failed: {error}", source.label());
        }
        reports.push(report);
    }

    let succeeded = reports.iter().filter(|r| r.ok).count();
    let batch = BatchSummary {
        inputs: reports.len(),
        succeeded,
        failed: reports.len() - succeeded,
    };
    eprintln!("aligned {} of {} input(s)", batch.succeeded, batch.inputs);

    if json_output {
        let report = AlignReport {
            engine_version: env!("CARGO_PKG_VERSION"),
            run_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            key: req.key.clone(),
            template: req.template.label(),
            format: req.format.extension(),
            batch: batch.clone(),
            inputs: reports,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
        return batch_result(&batch, first_failure(report.inputs));
    }

    batch_result(&batch, first_failure(reports))
}

fn first_failure(reports: Vec<InputReport>) -> Option<CliError> {
    reports.into_iter().find_map(|r| r.failure)
}

/// Exit status for a finished batch: partial failure is its own code; when
/// nothing succeeded the first failure's code is used.
fn batch_result(batch: &BatchSummary, first: Option<CliError>) -> Result<(), CliError> {
    let Some(first) = first else {
        return Ok(());
    };
    let message = format!("{} of {} input(s) failed", batch.failed, batch.inputs);
    if batch.succeeded > 0 {
        return Err(CliError::new(EXIT_PARTIAL, message));
    }
    Err(CliError { code: first.code, message, hint: first.hint })
}

/// File stems for each input's output, made unique with `_2`, `_3`, ...
fn output_stems(inputs: &[Source]) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|source| {
            let base = source.stem();
            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.clone()) {
                stem = format!("{base}_{n}");
                n += 1;
            }
            stem
        })
        .collect()
}

fn write_outputs(
    result: &ResultSet,
    dir: &Path,
    stem: &str,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    match format {
        OutputFormat::Xlsx => {
            let path = dir.join(alignment_file_name(stem, format.extension()));
            write_result_xlsx(result, &path)?;
            Ok(vec![path])
        }
        OutputFormat::Csv => write_result_csv(result, dir, &format!("alignment_{stem}")),
        OutputFormat::Json => {
            let path = dir.join(alignment_file_name(stem, format.extension()));
            write_bytes(&path, &export_json(result)?)?;
            Ok(vec![path])
        }
    }
}
