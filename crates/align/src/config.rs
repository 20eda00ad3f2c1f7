use serde::Deserialize;

use crate::error::AlignError;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Column naming used when both sides carry a non-key column of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct AlignOptions {
    #[serde(default = "default_template_suffix")]
    pub template_suffix: String,
    #[serde(default = "default_input_suffix")]
    pub input_suffix: String,
}

fn default_template_suffix() -> String {
    "_template".into()
}

fn default_input_suffix() -> String {
    "_input".into()
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            template_suffix: default_template_suffix(),
            input_suffix: default_input_suffix(),
        }
    }
}

impl AlignOptions {
    pub fn validate(&self) -> Result<(), AlignError> {
        if self.template_suffix.is_empty() || self.input_suffix.is_empty() {
            return Err(AlignError::InvalidOptions("column suffixes must not be empty".into()));
        }
        if self.template_suffix == self.input_suffix {
            return Err(AlignError::InvalidOptions(format!(
                "template and input suffixes must differ, both are '{}'",
                self.template_suffix
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Job files
// ---------------------------------------------------------------------------

/// A parsed `.toml` job file.
#[derive(Debug, Clone)]
pub enum Job {
    Align(AlignJob),
    Combine(CombineJob),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlignJob {
    pub name: String,
    pub key: String,
    pub template: SourceConfig,
    pub inputs: Vec<SourceConfig>,
    #[serde(default)]
    pub options: JobOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CombineJob {
    pub name: String,
    pub key: String,
    pub inputs: Vec<SourceConfig>,
    #[serde(default)]
    pub options: JobOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

/// One file to load. `sheet` picks a worksheet; the first sheet otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobOptions {
    #[serde(default = "default_template_suffix")]
    pub template_suffix: String,
    #[serde(default = "default_input_suffix")]
    pub input_suffix: String,
    /// Keep every cell as text instead of inferring numbers and booleans.
    #[serde(default)]
    pub raw_strings: bool,
    /// Align inputs on worker threads.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            template_suffix: default_template_suffix(),
            input_suffix: default_input_suffix(),
            raw_strings: false,
            parallel: false,
        }
    }
}

impl JobOptions {
    pub fn align_options(&self) -> AlignOptions {
        AlignOptions {
            template_suffix: self.template_suffix.clone(),
            input_suffix: self.input_suffix.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory for per-input alignment files.
    #[serde(default)]
    pub dir: Option<String>,
    /// Target file for a combine job.
    #[serde(default)]
    pub file: Option<String>,
    /// Explicit output format. Unset means the file extension decides, then xlsx.
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

/// Read the `kind` field, defaulting to "align".
fn probe_kind(input: &str) -> Result<String, AlignError> {
    #[derive(Deserialize)]
    struct KindProbe {
        #[serde(default = "default_kind")]
        kind: String,
    }
    fn default_kind() -> String {
        "align".into()
    }

    toml::from_str::<KindProbe>(input)
        .map(|p| p.kind)
        .map_err(|e| AlignError::ConfigParse(e.to_string()))
}

impl Job {
    pub fn from_toml(input: &str) -> Result<Self, AlignError> {
        let job = match probe_kind(input)?.as_str() {
            "align" => Job::Align(
                toml::from_str(input).map_err(|e| AlignError::ConfigParse(e.to_string()))?,
            ),
            "combine" => Job::Combine(
                toml::from_str(input).map_err(|e| AlignError::ConfigParse(e.to_string()))?,
            ),
            other => {
                return Err(AlignError::ConfigValidation(format!(
                    "unknown job kind \"{other}\" (expected \"align\" or \"combine\")"
                )))
            }
        };
        job.validate()?;
        Ok(job)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Align(j) => &j.name,
            Self::Combine(j) => &j.name,
        }
    }

    pub fn validate(&self) -> Result<(), AlignError> {
        match self {
            Self::Align(job) => {
                validate_common(&job.key, &job.options)?;
                if job.inputs.is_empty() {
                    return Err(AlignError::ConfigValidation(
                        "align job needs at least 1 input".into(),
                    ));
                }
                if job.output.file.is_some() {
                    return Err(AlignError::ConfigValidation(
                        "align jobs write one file per input; use output.dir, not output.file".into(),
                    ));
                }
                Ok(())
            }
            Self::Combine(job) => {
                validate_common(&job.key, &job.options)?;
                if job.inputs.len() < 2 {
                    return Err(AlignError::ConfigValidation(format!(
                        "combine job needs at least 2 inputs, found {}",
                        job.inputs.len()
                    )));
                }
                Ok(())
            }
        }
    }
}

fn validate_common(key: &str, options: &JobOptions) -> Result<(), AlignError> {
    if key.is_empty() {
        return Err(AlignError::ConfigValidation("key must not be empty".into()));
    }
    options
        .align_options()
        .validate()
        .map_err(|e| AlignError::ConfigValidation(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
