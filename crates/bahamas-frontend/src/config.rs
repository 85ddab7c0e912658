//! TOML run configuration.
//!
//! A configuration document carries a `[BBN]` section, a `[CCF]` section, or
//! both. Omitted keys take the defaults below; unknown keys are rejected.
//!
//! ```toml
//! [BBN.params]
//! seed = 42
//! samples = 10000
//!
//! [BBN.files]
//! defect = "defect"
//! task = "tasks"
//!
//! [BBN.analysis]
//! type = "precise"
//!
//! [CCF.files]
//! structure = "components.csv"
//!
//! [CCF.generate]
//! output_file_base = "cccg"
//! double = true
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FrontendError;
use crate::validate::validate_config;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SAMPLES: usize = 10_000;
pub const DEFAULT_OUTPUT_FILE_BASE: &str = "cccg";
pub const DEFAULT_OUTPUT_TYPE: &str = "csv";

/// How per-stage failure likelihoods are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    /// Propagate human error modes listed in a task workbook.
    Precise,
    /// Use a per-stage `(mean, std)` summary.
    Approx,
}

impl AnalysisType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisType::Precise => "precise",
            AnalysisType::Approx => "approx",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = FrontendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "precise" => Ok(AnalysisType::Precise),
            "approx" => Ok(AnalysisType::Approx),
            other => Err(FrontendError::invalid_key(
                "BBN",
                "analysis.type",
                format!("unknown analysis type '{}', expected 'precise' or 'approx'", other),
            )),
        }
    }
}

/// Whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(rename = "BBN", default, skip_serializing_if = "Option::is_none")]
    pub bbn: Option<BbnConfig>,
    #[serde(rename = "CCF", default, skip_serializing_if = "Option::is_none")]
    pub ccf: Option<CcfConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BbnConfig {
    #[serde(default)]
    pub params: BbnParams,
    #[serde(default)]
    pub files: BbnFiles,
    #[serde(default)]
    pub analysis: AnalysisSection,
}

impl BbnConfig {
    /// Parsed `analysis.type`.
    pub fn analysis_type(&self) -> Result<AnalysisType, FrontendError> {
        self.analysis.kind.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BbnParams {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_samples")]
    pub samples: usize,
}

impl Default for BbnParams {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            samples: DEFAULT_SAMPLES,
        }
    }
}

/// Workbook locations. Each entry is a directory of `<Sheet Name>.csv` files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BbnFiles {
    pub defect: Option<PathBuf>,
    pub task: Option<PathBuf>,
    pub approx: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSection {
    #[serde(rename = "type", default = "default_analysis_type")]
    pub kind: String,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            kind: default_analysis_type(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CcfConfig {
    #[serde(default)]
    pub files: CcfFiles,
    #[serde(default)]
    pub generate: GenerateOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CcfFiles {
    /// Component table (CSV).
    pub structure: Option<PathBuf>,
}

/// Which CCCG views to write and where.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateOptions {
    #[serde(default = "default_output_file_base")]
    pub output_file_base: String,
    #[serde(default = "default_output_type")]
    pub output_type: String,
    #[serde(rename = "final", default = "default_true")]
    pub final_view: bool,
    #[serde(default)]
    pub single: bool,
    #[serde(default)]
    pub double: bool,
    #[serde(default)]
    pub triple: bool,
    #[serde(default)]
    pub function_all: bool,
    #[serde(default)]
    pub input_all: bool,
    #[serde(default)]
    pub design_all: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_file_base: default_output_file_base(),
            output_type: default_output_type(),
            final_view: true,
            single: false,
            double: false,
            triple: false,
            function_all: false,
            input_all: false,
            design_all: false,
        }
    }
}

impl GenerateOptions {
    /// Names of the requested views in output order.
    pub fn requested_views(&self) -> Vec<&'static str> {
        [
            ("final", self.final_view),
            ("single", self.single),
            ("double", self.double),
            ("triple", self.triple),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_analysis_type() -> String {
    AnalysisType::Precise.as_str().to_string()
}

fn default_output_file_base() -> String {
    DEFAULT_OUTPUT_FILE_BASE.to_string()
}

fn default_output_type() -> String {
    DEFAULT_OUTPUT_TYPE.to_string()
}

fn default_true() -> bool {
    true
}

/// Parse and validate configuration text. Relative file paths are resolved
/// against `base_dir`.
pub fn parse_config(text: &str, base_dir: &Path) -> Result<Config, FrontendError> {
    let mut config: Config =
        toml::from_str(text).map_err(|e| FrontendError::Toml(e.to_string()))?;
    config.resolve_paths(base_dir);
    validate_config(&config)?;
    Ok(config)
}

/// Read, parse and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config, FrontendError> {
    let text = fs::read_to_string(path).map_err(|source| FrontendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&text, base_dir)
}

impl Config {
    fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut Option<PathBuf>| {
            if let Some(path) = p {
                if path.is_relative() {
                    *path = base_dir.join(&*path);
                }
            }
        };
        if let Some(bbn) = &mut self.bbn {
            resolve(&mut bbn.files.defect);
            resolve(&mut bbn.files.task);
            resolve(&mut bbn.files.approx);
        }
        if let Some(ccf) = &mut self.ccf {
            resolve(&mut ccf.files.structure);
        }
    }
}
