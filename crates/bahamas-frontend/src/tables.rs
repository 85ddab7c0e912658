//! Typed input tables.
//!
//! These are the already-parsed forms of the stage task sheets, the defect
//! workbook (`HEMD`, `ODC`, `UCA Correlation`) and the component table. The
//! engine only ever sees these types; how they were read is the parser's
//! business.

use crate::taxonomy::{CouplingFactor, DefectCategory, Stage, UcaType};

/// Column names used by stage sheets.
pub mod columns {
    pub const TASK_NUMBER: &str = "Task Number";
    pub const HUMAN_ERROR_MODE: &str = "Human Error Mode";
    pub const HEP_MEAN: &str = "Human Error Probability (Mean)";
    pub const HEP_STD: &str = "Human Error Probability (STD)";
    pub const REVIEW_NUMBER: &str = "Review Number";
    pub const TRIGGER_COVERAGE: &str = "Trigger Coverage";

    pub const HEMD_KEY: &str = "key";
    pub const HEMD_MU: &str = "mu";
    pub const HEMD_SIGMA: &str = "sigma";

    pub const ODC_STAGES: &str = "Stages";
    pub const ODC_TOTAL: &str = "Total";
}

/// Sheet names of the defect workbook.
pub mod sheets {
    pub const HEMD: &str = "HEMD";
    pub const ODC: &str = "ODC";
    pub const UCA_CORRELATION: &str = "UCA Correlation";
}

/// One row of a stage sheet. Every cell is optional; which ones are present
/// depends on whether the sheet is a precise task list or an approximate
/// summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageRow {
    pub task_number: Option<f64>,
    pub human_error_mode: Option<String>,
    pub hep_mean: Option<f64>,
    pub hep_std: Option<f64>,
    pub review_number: Option<f64>,
    pub trigger_coverage: Option<f64>,
}

/// All rows of one stage sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSheet {
    pub stage: Stage,
    pub rows: Vec<StageRow>,
}

impl StageSheet {
    pub fn new(stage: Stage, rows: Vec<StageRow>) -> Self {
        Self { stage, rows }
    }

    /// `(task number, human error mode)` pairs of rows where both are present.
    pub fn human_error_tasks(&self) -> impl Iterator<Item = (f64, &str)> + '_ {
        self.rows.iter().filter_map(|row| {
            match (row.task_number, row.human_error_mode.as_deref()) {
                (Some(task), Some(mode)) => Some((task, mode)),
                _ => None,
            }
        })
    }

    /// `(review number, trigger coverage)` pairs of rows where both are present.
    pub fn review_trigger_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rows
            .iter()
            .filter_map(|row| match (row.review_number, row.trigger_coverage) {
                (Some(review), Some(trigger)) => Some((review, trigger)),
                _ => None,
            })
    }

    /// First `(mean, std)` human error probability pair with both cells present.
    pub fn first_hep_summary(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .find_map(|row| match (row.hep_mean, row.hep_std) {
                (Some(mean), Some(std)) => Some((mean, std)),
                _ => None,
            })
    }
}

/// One sheet per lifecycle stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageWorkbook {
    sheets: Vec<StageSheet>,
}

impl StageWorkbook {
    pub fn new(sheets: Vec<StageSheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, stage: Stage) -> Option<&StageSheet> {
        self.sheets.iter().find(|s| s.stage == stage)
    }

    pub fn sheets(&self) -> &[StageSheet] {
        &self.sheets
    }

    pub fn insert(&mut self, sheet: StageSheet) {
        self.sheets.retain(|s| s.stage != sheet.stage);
        self.sheets.push(sheet);
    }
}

/// Log-normal parameters for one human error mode.
#[derive(Debug, Clone, PartialEq)]
pub struct HemdRow {
    pub key: String,
    pub mu: f64,
    pub sigma: f64,
}

/// Observed defect counts for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct OdcRow {
    pub stage: Stage,
    pub total: f64,
    /// Indexed by [`DefectCategory::index`].
    pub counts: [f64; DefectCategory::COUNT],
}

impl OdcRow {
    pub fn count(&self, defect: DefectCategory) -> f64 {
        self.counts[defect.index()]
    }
}

/// Correlation coefficients between one defect category and every UCA type.
#[derive(Debug, Clone, PartialEq)]
pub struct UcaCorrelationRow {
    pub defect: DefectCategory,
    /// Indexed by [`UcaType::index`].
    pub means: [f64; UcaType::COUNT],
    /// Indexed by [`UcaType::index`].
    pub sigmas: [f64; UcaType::COUNT],
}

impl UcaCorrelationRow {
    pub fn coefficient(&self, uca: UcaType) -> (f64, f64) {
        (self.means[uca.index()], self.sigmas[uca.index()])
    }
}

/// Parsed defect workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectWorkbook {
    /// Empty when the workbook carries no `HEMD` sheet.
    pub hemd: Vec<HemdRow>,
    pub odc: Vec<OdcRow>,
    pub uca_correlation: Vec<UcaCorrelationRow>,
}

/// One component of the system structure table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRecord {
    /// Descriptive cells, aligned with [`ComponentTable::columns`].
    pub attributes: Vec<Option<String>>,
    /// Raw coupling-factor cells indexed by [`CouplingFactor::index`].
    pub configs: [Option<String>; CouplingFactor::COUNT],
}

impl ComponentRecord {
    pub fn config(&self, factor: CouplingFactor) -> Option<&str> {
        self.configs[factor.index()].as_deref()
    }

    /// Split a coupling-factor cell into its trimmed, non-empty values.
    pub fn config_values(&self, factor: CouplingFactor) -> Vec<&str> {
        split_config(self.config(factor))
    }
}

/// Split a semicolon-delimited coupling-factor cell.
pub fn split_config(cell: Option<&str>) -> Vec<&str> {
    cell.map(|raw| {
        raw.split(';')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// System structure table: descriptive columns plus the three coupling-factor
/// columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentTable {
    /// Descriptive (pass-through) column names in input order.
    pub columns: Vec<String>,
    pub components: Vec<ComponentRecord>,
}

impl ComponentTable {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
