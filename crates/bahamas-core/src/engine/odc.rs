//! ODC conditional model: `P(defect category | stage)`.
//!
//! Each (stage, category) pair gets a Beta posterior from the observed counts
//! with a Jeffreys prior: `Beta(0.5 + count, 0.5 + total - count)`.

use rand::Rng;

use bahamas_frontend::{DefectCategory, OdcRow, Stage};

use super::distribution::{ConditionalDistribution, DistributionKind};
use super::errors::ExecError;
use super::indexed::{ByDefect, ByStage};
use super::numeric_kernels::SampleVector;

pub const ODC_PRIOR_ALPHA: f64 = 0.5;
pub const ODC_PRIOR_BETA: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct OdcConditionalModel {
    table: ByStage<ByDefect<ConditionalDistribution>>,
}

impl OdcConditionalModel {
    /// Build from `ODC` rows. Every stage needs a row; when a stage appears
    /// more than once the last row wins. Only `beta` is supported.
    pub fn from_rows(rows: &[OdcRow], kind: DistributionKind) -> Result<Self, ExecError> {
        kind.require(DistributionKind::Beta, "the ODC conditional model")?;

        #[cfg(feature = "tracing")]
        tracing::info!("Construct ODC Conditional Distribution for each SDLC stage");

        let table = ByStage::try_from_fn(|stage| {
            let row = rows
                .iter()
                .rev()
                .find(|r| r.stage == stage)
                .ok_or_else(|| ExecError::MissingInput(format!("ODC sheet has no row for stage '{}'", stage)))?;
            ByDefect::try_from_fn(|defect| {
                let count = row.count(defect);
                ConditionalDistribution::beta(
                    ODC_PRIOR_ALPHA + count,
                    ODC_PRIOR_BETA + row.total - count,
                )
                .map_err(|e| {
                    ExecError::Numerical(format!(
                        "ODC counts for '{}'/'{}' (count {}, total {}): {}",
                        stage, defect, count, row.total, e
                    ))
                })
            })
        })?;
        Ok(Self { table })
    }

    pub fn distribution(&self, stage: Stage, defect: DefectCategory) -> &ConditionalDistribution {
        &self.table[stage][defect]
    }

    /// Draw `n` samples for every pair, stage-major then category.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> ByStage<ByDefect<SampleVector>> {
        ByStage::from_fn(|stage| ByDefect::from_fn(|defect| self.table[stage][defect].sample_n(n, rng)))
    }
}
