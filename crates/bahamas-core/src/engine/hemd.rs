//! Human error mode distributions (HEMD).
//!
//! One log-normal per human error mode, read from the `HEMD` sheet.

use rustc_hash::FxHashMap;

use bahamas_frontend::{HemdRow, HumanErrorMode};

use super::distribution::{ConditionalDistribution, DistributionKind};
use super::errors::ExecError;

/// Log-normal distribution for each human error mode present in the sheet.
#[derive(Debug, Clone, Default)]
pub struct HumanErrorModeDistributions {
    by_mode: FxHashMap<HumanErrorMode, ConditionalDistribution>,
}

impl HumanErrorModeDistributions {
    /// Build from `HEMD` rows. Only `lognorm` is supported.
    pub fn from_rows(rows: &[HemdRow], kind: DistributionKind) -> Result<Self, ExecError> {
        kind.require(DistributionKind::LogNorm, "human error mode distributions")?;
        let mut by_mode = FxHashMap::default();
        for row in rows {
            let mode: HumanErrorMode = row.key.parse()?;
            by_mode.insert(mode, ConditionalDistribution::log_normal(row.mu, row.sigma)?);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("Built {} human error mode distributions", by_mode.len());
        Ok(Self { by_mode })
    }

    pub fn get(&self, mode: HumanErrorMode) -> Option<&ConditionalDistribution> {
        self.by_mode.get(&mode)
    }

    /// Resolve a `Human Error Mode` cell.
    pub fn resolve(&self, label: &str) -> Result<&ConditionalDistribution, ExecError> {
        let mode: HumanErrorMode = label
            .parse()
            .map_err(|_| ExecError::InvalidArgument(format!("unknown human error mode '{}'", label.trim())))?;
        self.get(mode).ok_or_else(|| {
            ExecError::MissingInput(format!(
                "no HEMD distribution for human error mode '{}'",
                mode
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.by_mode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mode.is_empty()
    }
}
