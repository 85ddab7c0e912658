//! End-to-end runs driven by a validated configuration.
//!
//! A [`Workflow`] runs the BBN analysis when the configuration has a `[BBN]`
//! section and CCCG generation when it has a `[CCF]` section, BBN first.

use std::path::{Path, PathBuf};

use bahamas_frontend::config::{BbnConfig, CcfConfig};
use bahamas_frontend::parser::{read_component_table, read_defect_workbook, read_stage_workbook};
use bahamas_frontend::{validate_config, AnalysisType, Config};
#[cfg(feature = "tracing")]
use bahamas_frontend::UcaType;

use crate::cccg::{CccgGenerator, CccgView};
use crate::engine::bbn::{BbnModel, BbnOptions, BbnResult};
use crate::engine::errors::ExecError;
use crate::metrics::SummaryTable;
use crate::storage::{write_bbn_summary, write_cccg_views};

/// Where a run writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutputs {
    /// BBN summary CSV; not written when `None`.
    pub bbn_summary: Option<PathBuf>,
    /// Directory receiving the `<base>_<view>.csv` files.
    pub cccg_dir: PathBuf,
}

impl Default for WorkflowOutputs {
    fn default() -> Self {
        Self {
            bbn_summary: None,
            cccg_dir: PathBuf::from("."),
        }
    }
}

/// Outcome of the BBN part of a run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BbnReport {
    pub analysis: &'static str,
    pub seed: u64,
    pub num_samples: usize,
    pub summary: SummaryTable,
    pub summary_path: Option<PathBuf>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub result: BbnResult,
}

/// Outcome of the CCCG part of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CcfReport {
    /// `(view, group count)` for every view.
    pub group_counts: Vec<(String, usize)>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WorkflowReport {
    pub bbn: Option<BbnReport>,
    pub ccf: Option<CcfReport>,
}

#[derive(Debug, Clone)]
pub struct Workflow {
    config: Config,
}

impl Workflow {
    /// Validate `config`; nothing is read until [`Self::run`].
    pub fn new(config: Config) -> Result<Self, ExecError> {
        #[cfg(feature = "tracing")]
        tracing::info!("Initialization");

        validate_config(&config)?;
        Ok(Self { config })
    }

    /// Load, validate and wrap a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ExecError> {
        Self::new(bahamas_frontend::load_config(path)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self, outputs: &WorkflowOutputs) -> Result<WorkflowReport, ExecError> {
        let mut report = WorkflowReport::default();
        if let Some(bbn) = &self.config.bbn {
            #[cfg(feature = "tracing")]
            tracing::info!("Start BBN Calculation ...");

            report.bbn = Some(run_bbn(bbn, outputs.bbn_summary.as_deref())?);

            #[cfg(feature = "tracing")]
            tracing::info!("End BBN Calculation");
        }
        if let Some(ccf) = &self.config.ccf {
            #[cfg(feature = "tracing")]
            tracing::info!("Start CCCGs generation");

            report.ccf = Some(run_ccf(ccf, &outputs.cccg_dir)?);

            #[cfg(feature = "tracing")]
            tracing::info!("End CCCGs generation");
        }
        Ok(report)
    }
}

/// Run the configured BBN analysis and optionally write its summary.
pub fn run_bbn(config: &BbnConfig, summary_path: Option<&Path>) -> Result<BbnReport, ExecError> {
    let defect_dir = config
        .files
        .defect
        .as_deref()
        .ok_or_else(|| ExecError::MissingInput("BBN analysis requires files.defect".to_string()))?;
    let model = BbnModel::from_defect_workbook(&read_defect_workbook(defect_dir)?)?;
    let options = BbnOptions {
        num_samples: config.params.samples,
        seed: config.params.seed,
    };

    let analysis = config.analysis_type()?;
    let result = match analysis {
        AnalysisType::Precise => {
            let tasks = config.files.task.as_deref().map(read_stage_workbook).transpose()?;
            model.run_precise(tasks.as_ref(), options)?
        }
        AnalysisType::Approx => {
            let dir = config.files.approx.as_deref().ok_or_else(|| {
                ExecError::MissingInput("approximate analysis requires files.approx".to_string())
            })?;
            model.run_approx(&read_stage_workbook(dir)?, options)?
        }
    };

    #[cfg(feature = "tracing")]
    {
        let total = result.total_failure_probability();
        tracing::info!("Software total failure: {} with std {}", total.mean, total.std);
        for uca in UcaType::ALL {
            let summary = result.uca(uca);
            tracing::info!("UCA type: {}, Mean: {}, STD: {}", uca, summary.mean, summary.std);
        }
    }

    let summary = result.summary_table();
    if let Some(path) = summary_path {
        write_bbn_summary(path, &summary)?;
    }
    Ok(BbnReport {
        analysis: analysis.as_str(),
        seed: options.seed,
        num_samples: options.num_samples,
        summary,
        summary_path: summary_path.map(Path::to_path_buf),
        result,
    })
}

/// Generate CCCGs and write the requested views into `dir`.
pub fn run_ccf(config: &CcfConfig, dir: &Path) -> Result<CcfReport, ExecError> {
    let structure = config
        .files
        .structure
        .as_deref()
        .ok_or_else(|| ExecError::MissingInput("CCCG generation requires files.structure".to_string()))?;
    let generator = CccgGenerator::generate(read_component_table(structure)?);
    let files = write_cccg_views(&generator, &config.generate, dir)?;
    let group_counts = CccgView::ALL
        .into_iter()
        .map(|view| (view.to_string(), generator.groups(view).len()))
        .collect();
    Ok(CcfReport { group_counts, files })
}
