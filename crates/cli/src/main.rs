// docalign CLI - key-based alignment and deduplication of tabular files

mod align;
mod combine;
mod exit_codes;
mod job;
mod sources;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use docalign_align::config::OutputFormat;
use docalign_align::{AlignError, AlignOptions};
use docalign_io::{ExportError, LoadError, LoadOptions};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use exit_codes::{
    align_exit_code, export_exit_code, load_exit_code, EXIT_IO, EXIT_MISSING_KEY, EXIT_SUCCESS,
    EXIT_USAGE,
};
use sources::{load_options, Loader, Source};

#[derive(Parser)]
#[command(name = "docalign")]
#[command(about = "Align spreadsheets against a template by key column, or merge and deduplicate them")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (overridden by DOCALIGN_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align one or more input files against a template on a key column
    #[command(after_help = "\
Examples:
  docalign align template.xlsx sales.csv --key vendor_id
  docalign align template.xlsx q1.csv q2.csv q3.csv --key id --out-dir aligned
  docalign align master.xlsx data.xlsx --key id --template-sheet Master --sheet Data
  docalign align template.csv input.csv --key id --format csv --json")]
    Align {
        /// Template file (reference table)
        template: PathBuf,

        /// Input files to align against the template
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Key column present in the template and every input
        #[arg(long, short = 'k')]
        key: String,

        /// Template sheet for multi-sheet files (default: first sheet)
        #[arg(long)]
        template_sheet: Option<String>,

        /// Input sheet for multi-sheet files (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Directory for alignment_<input>.<ext> files
        #[arg(long, short = 'o', default_value = ".")]
        out_dir: PathBuf,

        /// Output file format
        #[arg(long, short = 'f', value_enum, default_value_t = FormatArg::Xlsx)]
        format: FormatArg,

        /// Print a JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Keep every cell as text (no number/boolean inference)
        #[arg(long)]
        raw_strings: bool,

        /// Align inputs on worker threads
        #[arg(long)]
        parallel: bool,

        /// Suffix for template columns whose name also appears in the input
        #[arg(long, default_value = "_template")]
        template_suffix: String,

        /// Suffix for input columns whose name also appears in the template
        #[arg(long, default_value = "_input")]
        input_suffix: String,
    },

    /// Concatenate files and drop rows whose key was already seen
    #[command(after_help = "\
Examples:
  docalign combine jan.csv feb.csv mar.csv --key invoice_id
  docalign combine a.xlsx b.xlsx --key id --output merged.csv")]
    Combine {
        /// Files to combine, in order (earlier files win on duplicate keys)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Key column used for deduplication
        #[arg(long, short = 'k')]
        key: String,

        /// Output file (default: combined.<format>)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format (default: from --output extension, else xlsx)
        #[arg(long, short = 'f', value_enum)]
        format: Option<FormatArg>,

        /// Print a JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Keep every cell as text (no number/boolean inference)
        #[arg(long)]
        raw_strings: bool,
    },

    /// Run an align or combine job file
    #[command(after_help = "\
Examples:
  docalign run vendors.job.toml
  docalign run vendors.job.toml --json")]
    Run {
        /// Path to the .toml job file
        job: PathBuf,

        /// Print a JSON report to stdout
        #[arg(long)]
        json: bool,
    },

    /// Check a job file without running it
    Validate {
        /// Path to the .toml job file
        job: PathBuf,
    },

    /// List sheets and column names of a file (key candidates)
    #[command(after_help = "\
Examples:
  docalign columns template.xlsx
  docalign columns template.xlsx --sheet Master --json")]
    Columns {
        file: PathBuf,

        /// Only this sheet
        #[arg(long)]
        sheet: Option<String>,

        /// Print JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Xlsx,
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("DOCALIGN_GIT_HASH"), ")",
        "\nengine:  docalign-align ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("DOCALIGN_TARGET"),
    )
}

/// Install the stderr log subscriber. `DOCALIGN_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("DOCALIGN_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Align {
            template,
            inputs,
            key,
            template_sheet,
            sheet,
            out_dir,
            format,
            json,
            raw_strings,
            parallel,
            template_suffix,
            input_suffix,
        } => align::run_align(
            align::AlignRequest {
                template: Source::new(template, template_sheet),
                inputs: inputs.into_iter().map(|p| Source::new(p, sheet.clone())).collect(),
                key,
                options: AlignOptions { template_suffix, input_suffix },
                load: load_options(raw_strings),
                parallel,
                out_dir,
                format: format.into(),
            },
            json,
        ),
        Commands::Combine { files, key, output, format, json, raw_strings } => {
            let (output, format) = combine::resolve_output(output, format.map(Into::into));
            combine::run_combine(
                combine::CombineRequest {
                    inputs: files.into_iter().map(|p| Source::new(p, None)).collect(),
                    key,
                    load: load_options(raw_strings),
                    output,
                    format,
                },
                json,
            )
        }
        Commands::Run { job, json } => job::cmd_run(job, json),
        Commands::Validate { job } => job::cmd_validate(job),
        Commands::Columns { file, sheet, json } => cmd_columns(file, sheet, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn load(err: &LoadError) -> Self {
        let e = Self::new(load_exit_code(err), err.to_string());
        match err {
            LoadError::UnsupportedFormat(_) => {
                e.with_hint("supported: csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods, json")
            }
            LoadError::SheetNotFound { .. } => e.with_hint("list sheets with: docalign columns <file>"),
            _ => e,
        }
    }

    pub fn align(err: &AlignError) -> Self {
        Self::new(align_exit_code(err), err.to_string())
    }

    pub fn export(err: &ExportError) -> Self {
        Self::new(export_exit_code(err), err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Error for a key column absent from a loaded table, listing what is there.
pub(crate) fn missing_key(source: &Source, key: &str, columns: &[String]) -> CliError {
    CliError::new(EXIT_MISSING_KEY, format!("{}: missing key column '{key}'", source.label()))
        .with_hint(format!("available columns: {}", columns.join(", ")))
}

// ============================================================================
// columns
// ============================================================================

#[derive(Serialize)]
struct SheetColumns {
    sheet: String,
    rows: usize,
    columns: Vec<String>,
}

fn cmd_columns(file: PathBuf, sheet: Option<String>, json_output: bool) -> Result<(), CliError> {
    let mut loader = Loader::new(LoadOptions::default());
    let tables = match sheet {
        Some(name) => vec![loader.load(&Source::new(file, Some(name)))?],
        None => loader.load_all(&file)?.to_vec(),
    };

    let sheets: Vec<SheetColumns> = tables
        .into_iter()
        .map(|t| SheetColumns {
            rows: t.table.len(),
            columns: t.table.columns().to_vec(),
            sheet: t.name,
        })
        .collect();

    if json_output {
        let json = serde_json::to_string_pretty(&sheets)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    for sheet in &sheets {
        println!("{} ({} rows)", sheet.sheet, sheet.rows);
        for column in &sheet.columns {
            println!("  {column}");
        }
    }
    Ok(())
}
