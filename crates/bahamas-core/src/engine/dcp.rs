//! Defect conditional probability (DCP).
//!
//! `DCP = G · exp(-4 · mean(review number) · mean(trigger coverage))`, a point
//! estimate per stage that scales the stage's sampled failure likelihood.

use bahamas_frontend::{Stage, StageSheet, StageWorkbook};

use super::errors::ExecError;
use super::indexed::ByStage;
use super::numeric_kernels::kahan_sum;

/// Normalization constant `G`.
pub const DCP_NORMALIZATION: f64 = 0.25;

/// DCP for an already-averaged review number and trigger coverage.
pub fn defect_conditional_probability(review: f64, trigger: f64) -> f64 {
    DCP_NORMALIZATION * (-4.0 * review * trigger).exp()
}

/// DCP of one stage sheet. Rows missing either value are ignored.
pub fn stage_dcp(sheet: &StageSheet) -> Result<f64, ExecError> {
    #[cfg(feature = "tracing")]
    tracing::info!("Calculate DCP for SDLC \"{}\" stage", sheet.stage);

    let pairs: Vec<(f64, f64)> = sheet.review_trigger_pairs().collect();
    if pairs.is_empty() {
        return Err(ExecError::MissingInput(format!(
            "stage '{}' has no rows with both Review Number and Trigger Coverage",
            sheet.stage
        )));
    }
    let n = pairs.len() as f64;
    let review = kahan_sum(pairs.iter().map(|p| p.0)) / n;
    let trigger = kahan_sum(pairs.iter().map(|p| p.1)) / n;
    Ok(defect_conditional_probability(review, trigger))
}

/// DCP for every stage of a workbook.
pub fn stage_dcp_table(workbook: &StageWorkbook) -> Result<ByStage<f64>, ExecError> {
    ByStage::try_from_fn(|stage| stage_dcp(require_sheet(workbook, stage)?))
}

pub(crate) fn require_sheet(workbook: &StageWorkbook, stage: Stage) -> Result<&StageSheet, ExecError> {
    workbook
        .sheet(stage)
        .ok_or_else(|| ExecError::MissingInput(format!("no sheet for stage '{}'", stage)))
}
