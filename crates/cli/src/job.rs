//! `docalign run` / `docalign validate`: TOML job files.

use std::path::{Path, PathBuf};

use docalign_align::config::{AlignJob, CombineJob};
use docalign_align::Job;

use crate::align::{run_align, AlignRequest};
use crate::combine::{resolve_output, run_combine, CombineRequest};
use crate::exit_codes::EXIT_IO;
use crate::sources::{load_options, Source};
use crate::CliError;

fn read_job(path: &Path) -> Result<Job, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot read job file {}: {e}", path.display())))?;
    Job::from_toml(&text).map_err(|e| CliError::align(&e).with_hint(format!("in {}", path.display())))
}

fn base_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

pub(crate) fn cmd_run(path: PathBuf, json_output: bool) -> Result<(), CliError> {
    let job = read_job(&path)?;
    let base = base_dir(&path);
    eprintln!("job '{}'", job.name());

    match job {
        Job::Align(job) => run_align(align_request(&job, base), json_output),
        Job::Combine(job) => run_combine(combine_request(&job, base), json_output),
    }
}

pub(crate) fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    match read_job(&path)? {
        Job::Align(job) => eprintln!(
            "valid: align job '{}' on '{}' with {} input(s)",
            job.name,
            job.key,
            job.inputs.len()
        ),
        Job::Combine(job) => eprintln!(
            "valid: combine job '{}' on '{}' with {} input(s)",
            job.name,
            job.key,
            job.inputs.len()
        ),
    }
    Ok(())
}

fn output_dir(base: &Path, dir: Option<&str>) -> PathBuf {
    match dir {
        Some(dir) => base.join(dir),
        None => base.to_path_buf(),
    }
}

fn align_request(job: &AlignJob, base: &Path) -> AlignRequest {
    AlignRequest {
        template: Source::relative_to(base, &job.template.file, job.template.sheet.clone()),
        inputs: job
            .inputs
            .iter()
            .map(|s| Source::relative_to(base, &s.file, s.sheet.clone()))
            .collect(),
        key: job.key.clone(),
        options: job.options.align_options(),
        load: load_options(job.options.raw_strings),
        parallel: job.options.parallel,
        out_dir: output_dir(base, job.output.dir.as_deref()),
        format: job.output.format.unwrap_or_default(),
    }
}

fn combine_request(job: &CombineJob, base: &Path) -> CombineRequest {
    let dir = output_dir(base, job.output.dir.as_deref());
    let (file, format) = resolve_output(job.output.file.as_ref().map(PathBuf::from), job.output.format);
    CombineRequest {
        inputs: job
            .inputs
            .iter()
            .map(|s| Source::relative_to(base, &s.file, s.sheet.clone()))
            .collect(),
        key: job.key.clone(),
        load: load_options(job.options.raw_strings),
        output: dir.join(file),
        format,
    }
}
