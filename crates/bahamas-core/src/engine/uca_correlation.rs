//! Correlation between defect categories and unsafe control actions.
//!
//! Each (UCA type, defect category) coefficient is a normal truncated to
//! `[0, 1]`. A coefficient given as exactly `(0, 0)` becomes a uniform on
//! `[0, 1e-14)`, which is a point mass at zero for all practical purposes.

use rand::Rng;

use bahamas_frontend::{DefectCategory, UcaCorrelationRow, UcaType};

use super::distribution::{ConditionalDistribution, DistributionKind};
use super::errors::ExecError;
use super::indexed::{ByDefect, ByUca};
use super::numeric_kernels::SampleVector;

/// Width of the uniform used for zero coefficients.
pub const ZERO_COEFFICIENT_WIDTH: f64 = 1e-14;

#[derive(Debug, Clone, PartialEq)]
pub struct UcaDefectCorrelationModel {
    table: ByUca<ByDefect<ConditionalDistribution>>,
}

impl UcaDefectCorrelationModel {
    /// Build from `UCA Correlation` rows. Every defect category needs a row.
    /// Only `norm` is supported.
    pub fn from_rows(rows: &[UcaCorrelationRow], kind: DistributionKind) -> Result<Self, ExecError> {
        kind.require(DistributionKind::Norm, "the UCA defect correlation model")?;

        #[cfg(feature = "tracing")]
        tracing::info!("Construct UCA ODC defect correlation distribution");

        let by_defect = ByDefect::try_from_fn(|defect| {
            rows.iter().rev().find(|r| r.defect == defect).ok_or_else(|| {
                ExecError::MissingInput(format!(
                    "UCA Correlation sheet has no row for defect category '{}'",
                    defect
                ))
            })
        })?;

        let table = ByUca::try_from_fn(|uca| {
            ByDefect::try_from_fn(|defect| {
                let (mean, sigma) = by_defect[defect].coefficient(uca);
                coefficient_distribution(mean, sigma).map_err(|e| {
                    ExecError::Numerical(format!("correlation '{}'/'{}': {}", uca, defect, e))
                })
            })
        })?;
        Ok(Self { table })
    }

    pub fn distribution(&self, uca: UcaType, defect: DefectCategory) -> &ConditionalDistribution {
        &self.table[uca][defect]
    }

    /// Draw `n` samples for every pair, UCA-major then category.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> ByUca<ByDefect<SampleVector>> {
        ByUca::from_fn(|uca| ByDefect::from_fn(|defect| self.table[uca][defect].sample_n(n, rng)))
    }
}

fn coefficient_distribution(mean: f64, sigma: f64) -> Result<ConditionalDistribution, ExecError> {
    if mean == 0.0 && sigma == 0.0 {
        ConditionalDistribution::uniform(0.0, ZERO_COEFFICIENT_WIDTH)
    } else {
        ConditionalDistribution::truncated_unit_normal(mean, sigma)
    }
}
