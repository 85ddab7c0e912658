//! Bayesian belief network propagation.
//!
//! The network topology is fixed: six lifecycle stages feed eight defect
//! categories, which feed four UCA types. A run is a pure pipeline:
//!
//! 1. sample every stage ([`StageSampler`]) and compute its DCP
//! 2. sample every ODC conditional (stage-major, then category)
//! 3. sample every UCA correlation (UCA-major, then category)
//! 4. `marginal[stage][defect] = odc · stage · dcp`
//! 5. per defect category, sum the products over all 2⁶ stage
//!    present/absent assignments except the all-absent one
//! 6. `uca[u] = Σ_defect defect_prob · correlation[u][defect]`, and the total
//!    is the sum over UCA types
//!
//! All draws come from one `StdRng` seeded from [`BbnOptions::seed`] and happen
//! before step 4, so the same seed and inputs give bit-identical outputs with
//! or without the `parallel` feature.

use rand::rngs::StdRng;
use rand::SeedableRng;

use bahamas_frontend::{DefectCategory, DefectWorkbook, Stage, StageWorkbook, UcaType};

use super::distribution::DistributionKind;
use super::errors::ExecError;
use super::hemd::HumanErrorModeDistributions;
use super::indexed::{ByDefect, ByStage, ByUca};
use super::numeric_kernels::SampleVector;
use super::odc::OdcConditionalModel;
use super::stage_sampler::{
    sample_stages, stage_dcps, ApproxStageSampler, DirectStageSampler, PreciseStageSampler, StageObservation,
    StageSample, StageSampler,
};
use super::uca_correlation::UcaDefectCorrelationModel;
use crate::metrics::{
    FailureProbability, HistogramFigure, PlotKind, SummaryTable, ODC_PLOT_TITLE, STAGE_PLOT_TITLE,
    TOTAL_PLOT_TITLE, TOTAL_SERIES_NAME, TOTAL_SUMMARY_LABEL, UCA_PLOT_TITLE,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_NUM_SAMPLES: usize = 1000;

/// Assignment in which every stage is absent. Bit `5 - i` is stage `i`
/// (Concept is the most significant bit); a set bit means "absent".
pub const ALL_ABSENT_MASK: u8 = (1 << Stage::COUNT) - 1;

/// Whether `stage` is absent under `mask`.
pub fn stage_absent(mask: u8, stage: Stage) -> bool {
    (mask >> (Stage::COUNT - 1 - stage.index())) & 1 == 1
}

/// Sample count and seed of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BbnOptions {
    pub num_samples: usize,
    pub seed: u64,
}

impl Default for BbnOptions {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
            seed: DEFAULT_SEED,
        }
    }
}

/// Sum over the 63 non-excluded stage assignments for one defect category.
///
/// A present stage contributes `marginal`, an absent one `1 - marginal`; the
/// all-absent assignment contributes nothing.
pub fn marginalize_defect(marginals: &ByStage<&SampleVector>) -> SampleVector {
    let n = marginals[Stage::Concept].len();
    let complements = marginals.map(|_, m| m.complement());
    let mut acc = vec![0.0; n];
    let mut term = vec![0.0; n];
    for mask in 0..=ALL_ABSENT_MASK {
        if mask == ALL_ABSENT_MASK {
            continue;
        }
        term.fill(1.0);
        for stage in Stage::ALL {
            let factor = if stage_absent(mask, stage) {
                &complements[stage]
            } else {
                marginals[stage]
            };
            for (t, f) in term.iter_mut().zip(factor.iter()) {
                *t *= f;
            }
        }
        for (a, t) in acc.iter_mut().zip(term.iter()) {
            *a += t;
        }
    }
    SampleVector::new(acc)
}

/// Draws feeding [`propagate`].
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationInputs {
    pub stage: ByStage<SampleVector>,
    pub dcp: ByStage<f64>,
    pub odc: ByStage<ByDefect<SampleVector>>,
    pub uca_correlation: ByUca<ByDefect<SampleVector>>,
}

/// Outputs of [`propagate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Propagation {
    /// Marginal probability of each defect category.
    pub defect: ByDefect<SampleVector>,
    pub uca: ByUca<SampleVector>,
    pub total: SampleVector,
}

/// Steps 4-6 of a run. Deterministic; draws nothing.
pub fn propagate(inputs: &PropagationInputs) -> Propagation {
    #[cfg(feature = "tracing")]
    tracing::info!("Compute marginal ODC");

    let marginal: ByStage<ByDefect<SampleVector>> = ByStage::from_fn(|stage| {
        ByDefect::from_fn(|defect| {
            inputs.odc[stage][defect]
                .mul(&inputs.stage[stage])
                .scale(inputs.dcp[stage])
        })
    });

    #[cfg(feature = "tracing")]
    tracing::info!("BBN Propagation");

    let defect = marginalize_all(&marginal);

    #[cfg(feature = "tracing")]
    tracing::info!("Compute UCA and total failure probabilities");

    let n = inputs.stage[Stage::Concept].len();
    let uca = ByUca::from_fn(|uca| {
        let mut prob = SampleVector::zeros(n);
        for d in DefectCategory::ALL {
            prob.add_assign(&defect[d].mul(&inputs.uca_correlation[uca][d]));
        }
        prob
    });
    let total = SampleVector::sum_of(n, uca.values());

    Propagation { defect, uca, total }
}

#[cfg(not(feature = "parallel"))]
fn marginalize_all(marginal: &ByStage<ByDefect<SampleVector>>) -> ByDefect<SampleVector> {
    ByDefect::from_fn(|defect| marginalize_defect(&ByStage::from_fn(|s| &marginal[s][defect])))
}

#[cfg(feature = "parallel")]
fn marginalize_all(marginal: &ByStage<ByDefect<SampleVector>>) -> ByDefect<SampleVector> {
    let computed: Vec<SampleVector> = DefectCategory::ALL
        .par_iter()
        .map(|&defect| marginalize_defect(&ByStage::from_fn(|s| &marginal[s][defect])))
        .collect();
    // collect() keeps input order
    let mut computed = computed.into_iter();
    ByDefect::from_fn(|_| computed.next().unwrap_or_default())
}

/// Immutable record of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct BbnResult {
    pub options: BbnOptions,
    pub stage: ByStage<StageSample>,
    pub dcp: ByStage<f64>,
    /// Marginal probability of each defect category.
    pub defect: ByDefect<SampleVector>,
    pub uca: ByUca<SampleVector>,
    pub total: SampleVector,
}

impl BbnResult {
    /// `(mean, std, samples)` of the total failure probability.
    pub fn total_failure_probability(&self) -> FailureProbability<'_> {
        FailureProbability::of(&self.total)
    }

    /// `(mean, std, samples)` of one UCA type.
    pub fn uca(&self, uca: UcaType) -> FailureProbability<'_> {
        FailureProbability::of(&self.uca[uca])
    }

    /// [`Self::uca`] looked up by label (`"UCA-A"` ...).
    pub fn uca_by_label(&self, label: &str) -> Result<FailureProbability<'_>, ExecError> {
        let uca: UcaType = label
            .parse()
            .map_err(|_| ExecError::InvalidArgument(format!("unknown UCA type '{}'", label.trim())))?;
        Ok(self.uca(uca))
    }

    /// `{Total Failure Prob., UCA-A, UCA-B, UCA-C, UCA-D} × {mean, std}`.
    pub fn summary_table(&self) -> SummaryTable {
        let mut table = SummaryTable::default();
        table.push(TOTAL_SUMMARY_LABEL, self.total_failure_probability());
        for uca in UcaType::ALL {
            table.push(uca.label(), self.uca(uca));
        }
        table
    }

    /// Histograms of the selected series.
    pub fn plot(&self, kind: PlotKind, bins: usize) -> Vec<HistogramFigure> {
        let stage = || {
            HistogramFigure::new(
                STAGE_PLOT_TITLE,
                self.stage.iter().map(|(s, v)| (s.label().to_string(), &v.samples)),
                bins,
            )
        };
        let odc = || {
            HistogramFigure::new(
                ODC_PLOT_TITLE,
                self.defect.iter().map(|(d, v)| (d.label().to_string(), v)),
                bins,
            )
        };
        let uca = || {
            HistogramFigure::new(
                UCA_PLOT_TITLE,
                self.uca.iter().map(|(u, v)| (u.label().to_string(), v)),
                bins,
            )
        };
        let total = || {
            HistogramFigure::new(
                TOTAL_PLOT_TITLE,
                [(TOTAL_SERIES_NAME.to_string(), &self.total)],
                bins,
            )
        };
        match kind {
            PlotKind::All => vec![stage(), odc(), uca(), total()],
            PlotKind::Stage => vec![stage()],
            PlotKind::Odc => vec![odc()],
            PlotKind::Uca => vec![uca()],
            PlotKind::Total => vec![total()],
        }
    }
}

/// Distribution tables built once from the defect workbook.
#[derive(Debug, Clone)]
pub struct BbnModel {
    hemd: HumanErrorModeDistributions,
    odc: OdcConditionalModel,
    uca_correlation: UcaDefectCorrelationModel,
}

impl BbnModel {
    pub fn new(
        hemd: HumanErrorModeDistributions,
        odc: OdcConditionalModel,
        uca_correlation: UcaDefectCorrelationModel,
    ) -> Self {
        Self {
            hemd,
            odc,
            uca_correlation,
        }
    }

    /// Build the HEMD, ODC and UCA tables with their default families
    /// (log-normal, beta and truncated normal).
    pub fn from_defect_workbook(defect: &DefectWorkbook) -> Result<Self, ExecError> {
        Ok(Self {
            hemd: HumanErrorModeDistributions::from_rows(&defect.hemd, DistributionKind::LogNorm)?,
            odc: OdcConditionalModel::from_rows(&defect.odc, DistributionKind::Beta)?,
            uca_correlation: UcaDefectCorrelationModel::from_rows(
                &defect.uca_correlation,
                DistributionKind::Norm,
            )?,
        })
    }

    pub fn hemd(&self) -> &HumanErrorModeDistributions {
        &self.hemd
    }

    pub fn odc(&self) -> &OdcConditionalModel {
        &self.odc
    }

    pub fn uca_correlation(&self) -> &UcaDefectCorrelationModel {
        &self.uca_correlation
    }

    /// Precise analysis: propagate the human error modes of a task workbook.
    pub fn run_precise(&self, tasks: Option<&StageWorkbook>, options: BbnOptions) -> Result<BbnResult, ExecError> {
        let tasks = tasks.ok_or_else(|| {
            ExecError::MissingInput("precise analysis requires a task list workbook".to_string())
        })?;
        self.run(&PreciseStageSampler::new(tasks, &self.hemd), options)
    }

    /// Approximate analysis from a per-stage `(mean, std)` workbook.
    pub fn run_approx(&self, summary: &StageWorkbook, options: BbnOptions) -> Result<BbnResult, ExecError> {
        self.run(&ApproxStageSampler::new(summary), options)
    }

    /// Approximate analysis from in-memory stage observations.
    pub fn run_direct(
        &self,
        observations: ByStage<StageObservation>,
        options: BbnOptions,
    ) -> Result<BbnResult, ExecError> {
        self.run(&DirectStageSampler::new(observations), options)
    }

    /// Run the whole pipeline for the stages produced by `sampler`.
    pub fn run(&self, sampler: &dyn StageSampler, options: BbnOptions) -> Result<BbnResult, ExecError> {
        if options.num_samples == 0 {
            return Err(ExecError::InvalidArgument(
                "sample count must be positive".to_string(),
            ));
        }
        let n = options.num_samples;
        let mut rng = StdRng::seed_from_u64(options.seed);

        #[cfg(feature = "tracing")]
        tracing::info!("Sampling HEP and DCP ({} stages, {} samples)", sampler.name(), n);
        let stage = sample_stages(sampler, n, &mut rng)?;
        let dcp = stage_dcps(sampler)?;

        #[cfg(feature = "tracing")]
        tracing::info!("Sampling ODC");
        let odc = self.odc.sample(n, &mut rng);

        #[cfg(feature = "tracing")]
        tracing::info!("Sampling UCA");
        let uca_correlation = self.uca_correlation.sample(n, &mut rng);

        let inputs = PropagationInputs {
            stage: stage.map(|_, s| s.samples.clone()),
            dcp,
            odc,
            uca_correlation,
        };
        let propagation = propagate(&inputs);

        Ok(BbnResult {
            options,
            stage,
            dcp: inputs.dcp,
            defect: propagation.defect,
            uca: propagation.uca,
            total: propagation.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(v: f64) -> SampleVector {
        SampleVector::filled(3, v)
    }

    #[test]
    fn all_absent_mask_covers_six_stages() {
        assert_eq!(ALL_ABSENT_MASK, 63);
        assert!(stage_absent(0b10_0000, Stage::Concept));
        assert!(!stage_absent(0b10_0000, Stage::Requirement));
        assert!(stage_absent(0b00_0001, Stage::InstallAndMaintenance));
    }

    #[test]
    fn marginalization_equals_one_minus_all_absent_product() {
        let values = [0.1, 0.2, 0.05, 0.3, 0.15, 0.4];
        let vectors: ByStage<SampleVector> = ByStage::from_fn(|s| constant(values[s.index()]));
        let refs = ByStage::from_fn(|s| &vectors[s]);
        let got = marginalize_defect(&refs);
        let expected = 1.0 - values.iter().map(|p| 1.0 - p).product::<f64>();
        for &x in got.iter() {
            assert!((x - expected).abs() < 1e-14, "{x} vs {expected}");
        }
    }

    #[test]
    fn marginalization_of_zero_marginals_is_zero() {
        let vectors: ByStage<SampleVector> = ByStage::from_fn(|_| constant(0.0));
        let refs = ByStage::from_fn(|s| &vectors[s]);
        assert!(marginalize_defect(&refs).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn propagate_weights_defects_by_correlation() {
        let n = 3;
        let inputs = PropagationInputs {
            stage: ByStage::from_fn(|s| {
                if s == Stage::Design {
                    constant(0.5)
                } else {
                    constant(0.0)
                }
            }),
            dcp: ByStage::from_fn(|_| 0.2),
            odc: ByStage::from_fn(|_| ByDefect::from_fn(|_| constant(0.5))),
            uca_correlation: ByUca::from_fn(|u| ByDefect::from_fn(|_| constant(0.1 * (u.index() + 1) as f64))),
        };
        let out = propagate(&inputs);
        // Only Design is non-zero, so each defect probability is its marginal.
        let marginal = 0.5 * 0.5 * 0.2;
        for (_, v) in out.defect.iter() {
            assert!((v[0] - marginal).abs() < 1e-15);
        }
        for (u, v) in out.uca.iter() {
            let expected = 8.0 * marginal * 0.1 * (u.index() + 1) as f64;
            assert!((v[0] - expected).abs() < 1e-15);
        }
        let sum: f64 = out.uca.values().map(|v| v[0]).sum();
        assert!((out.total[0] - sum).abs() < 1e-15);
        assert_eq!(out.total.len(), n);
    }
}
