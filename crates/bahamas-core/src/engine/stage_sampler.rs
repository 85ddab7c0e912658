//! Per-stage failure likelihood samplers.
//!
//! A [`StageSampler`] turns one lifecycle stage's input into a vector of
//! Monte-Carlo draws plus the stage's DCP point estimate. Three sources are
//! supported:
//!
//! - [`PreciseStageSampler`]: sums draws from the HEMD log-normal of every
//!   task's human error mode
//! - [`ApproxStageSampler`]: a `(mean, std)` summary sampled as a normal
//!   truncated to `[0, 1]`
//! - [`DirectStageSampler`]: observations supplied in memory instead of a
//!   workbook

use rand::RngCore;

use bahamas_frontend::{Stage, StageWorkbook};

use super::dcp::{defect_conditional_probability, require_sheet, stage_dcp};
use super::distribution::ConditionalDistribution;
use super::errors::ExecError;
use super::hemd::HumanErrorModeDistributions;
use super::indexed::ByStage;
use super::numeric_kernels::{kahan_sum, SampleVector};

/// Maximum-likelihood log-normal fit with location fixed at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LogNormalFit {
    pub mu: f64,
    pub sigma: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

impl LogNormalFit {
    /// `None` when the vector is empty or holds a non-positive value.
    pub fn fit(samples: &SampleVector) -> Option<Self> {
        if samples.is_empty() || samples.iter().any(|&x| !(x > 0.0)) {
            return None;
        }
        let n = samples.len() as f64;
        let mu = kahan_sum(samples.iter().map(|x| x.ln())) / n;
        let sigma = (kahan_sum(samples.iter().map(|x| (x.ln() - mu).powi(2))) / n).sqrt();
        Some(Self {
            mu,
            sigma,
            mean: samples.mean(),
            median: samples.median(),
            std: samples.std(),
        })
    }
}

/// Draws for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSample {
    pub samples: SampleVector,
    /// Present for precise-mode stages with positive totals.
    pub fit: Option<LogNormalFit>,
}

/// Source of per-stage failure likelihood samples and DCP values.
pub trait StageSampler {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Draw `n` samples for `stage`.
    fn sample_stage(&self, stage: Stage, n: usize, rng: &mut dyn RngCore) -> Result<StageSample, ExecError>;

    /// Defect conditional probability of `stage`.
    fn dcp(&self, stage: Stage) -> Result<f64, ExecError>;
}

/// Sample every stage in fixed order.
pub fn sample_stages(
    sampler: &dyn StageSampler,
    n: usize,
    rng: &mut dyn RngCore,
) -> Result<ByStage<StageSample>, ExecError> {
    ByStage::try_from_fn(|stage| sampler.sample_stage(stage, n, rng))
}

/// DCP of every stage in fixed order.
pub fn stage_dcps(sampler: &dyn StageSampler) -> Result<ByStage<f64>, ExecError> {
    ByStage::try_from_fn(|stage| sampler.dcp(stage))
}

/// Human error propagation over a task-list workbook.
#[derive(Debug, Clone, Copy)]
pub struct PreciseStageSampler<'a> {
    tasks: &'a StageWorkbook,
    hemd: &'a HumanErrorModeDistributions,
}

impl<'a> PreciseStageSampler<'a> {
    pub fn new(tasks: &'a StageWorkbook, hemd: &'a HumanErrorModeDistributions) -> Self {
        Self { tasks, hemd }
    }
}

impl StageSampler for PreciseStageSampler<'_> {
    fn name(&self) -> &'static str {
        "precise"
    }

    fn sample_stage(&self, stage: Stage, n: usize, rng: &mut dyn RngCore) -> Result<StageSample, ExecError> {
        #[cfg(feature = "tracing")]
        tracing::info!("Calculate SDLC \"{}\" stage HEP", stage);

        let sheet = require_sheet(self.tasks, stage)?;
        let mut total = SampleVector::zeros(n);
        // Each listed task contributes one draw vector from its mode's
        // distribution; the Task Number cell only marks the row as a task.
        for (_task, mode) in sheet.human_error_tasks() {
            let dist = self.hemd.resolve(mode)?;
            total.add_assign(&dist.sample_n(n, rng));
        }
        let fit = LogNormalFit::fit(&total);
        Ok(StageSample { samples: total, fit })
    }

    fn dcp(&self, stage: Stage) -> Result<f64, ExecError> {
        stage_dcp(require_sheet(self.tasks, stage)?)
    }
}

/// Truncated-normal sampling of a per-stage `(mean, std)` summary workbook.
#[derive(Debug, Clone, Copy)]
pub struct ApproxStageSampler<'a> {
    summary: &'a StageWorkbook,
}

impl<'a> ApproxStageSampler<'a> {
    pub fn new(summary: &'a StageWorkbook) -> Self {
        Self { summary }
    }
}

impl StageSampler for ApproxStageSampler<'_> {
    fn name(&self) -> &'static str {
        "approx"
    }

    fn sample_stage(&self, stage: Stage, n: usize, rng: &mut dyn RngCore) -> Result<StageSample, ExecError> {
        #[cfg(feature = "tracing")]
        tracing::info!("Calculate SDLC \"{}\" stage HEP", stage);

        let sheet = require_sheet(self.summary, stage)?;
        let (mean, std) = sheet.first_hep_summary().ok_or_else(|| {
            ExecError::MissingInput(format!(
                "stage '{}' has no Human Error Probability (Mean)/(STD) row",
                stage
            ))
        })?;
        let dist = ConditionalDistribution::truncated_unit_normal(mean, std)?;
        Ok(StageSample {
            samples: dist.sample_n(n, rng),
            fit: None,
        })
    }

    fn dcp(&self, stage: Stage) -> Result<f64, ExecError> {
        stage_dcp(require_sheet(self.summary, stage)?)
    }
}

/// In-memory observation for one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageObservation {
    /// Sampled as a normal truncated to `[0, 1]`.
    Summary {
        mean: f64,
        std: f64,
        review: f64,
        trigger: f64,
    },
    /// Used verbatim.
    Samples {
        samples: SampleVector,
        review: f64,
        trigger: f64,
    },
}

impl StageObservation {
    fn review_trigger(&self) -> (f64, f64) {
        match *self {
            StageObservation::Summary { review, trigger, .. }
            | StageObservation::Samples { review, trigger, .. } => (review, trigger),
        }
    }
}

/// Stage data supplied directly rather than read from a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectStageSampler {
    observations: ByStage<StageObservation>,
}

impl DirectStageSampler {
    pub fn new(observations: ByStage<StageObservation>) -> Self {
        Self { observations }
    }
}

impl StageSampler for DirectStageSampler {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn sample_stage(&self, stage: Stage, n: usize, rng: &mut dyn RngCore) -> Result<StageSample, ExecError> {
        let samples = match &self.observations[stage] {
            StageObservation::Summary { mean, std, .. } => {
                ConditionalDistribution::truncated_unit_normal(*mean, *std)?.sample_n(n, rng)
            }
            StageObservation::Samples { samples, .. } => {
                if samples.len() != n {
                    return Err(ExecError::InvalidArgument(format!(
                        "stage '{}' supplies {} samples but the model draws {}",
                        stage,
                        samples.len(),
                        n
                    )));
                }
                samples.clone()
            }
        };
        Ok(StageSample { samples, fit: None })
    }

    fn dcp(&self, stage: Stage) -> Result<f64, ExecError> {
        let (review, trigger) = self.observations[stage].review_trigger();
        Ok(defect_conditional_probability(review, trigger))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use bahamas_frontend::{HemdRow, StageRow, StageSheet};

    use super::*;
    use crate::engine::distribution::DistributionKind;

    fn hemd() -> HumanErrorModeDistributions {
        let rows = vec![
            HemdRow {
                key: "D1".into(),
                mu: -5.0,
                sigma: 0.5,
            },
            HemdRow {
                key: "C".into(),
                mu: -6.0,
                sigma: 0.7,
            },
        ];
        HumanErrorModeDistributions::from_rows(&rows, DistributionKind::LogNorm).expect("hemd")
    }

    fn task_row(task: f64, mode: &str) -> StageRow {
        StageRow {
            task_number: Some(task),
            human_error_mode: Some(mode.to_string()),
            review_number: Some(2.0),
            trigger_coverage: Some(0.9),
            ..StageRow::default()
        }
    }

    fn task_book(rows: Vec<StageRow>) -> StageWorkbook {
        StageWorkbook::new(
            Stage::ALL
                .iter()
                .map(|&s| StageSheet::new(s, rows.clone()))
                .collect(),
        )
    }

    #[test]
    fn precise_total_sums_task_draws() {
        let hemd = hemd();
        let book = task_book(vec![task_row(1.0, "D1"), task_row(2.0, "C")]);
        let sampler = PreciseStageSampler::new(&book, &hemd);
        let got = sampler
            .sample_stage(Stage::Design, 32, &mut StdRng::seed_from_u64(5))
            .expect("sample");

        let mut rng = StdRng::seed_from_u64(5);
        let d1 = hemd.resolve("D1").expect("D1").sample_n(32, &mut rng);
        let c = hemd.resolve("C").expect("C").sample_n(32, &mut rng);
        let mut expected = d1;
        expected.add_assign(&c);
        assert_eq!(got.samples, expected);
        assert!(got.fit.is_some());
    }

    #[test]
    fn precise_stage_without_tasks_has_zero_total_and_no_fit() {
        let hemd = hemd();
        let book = task_book(vec![StageRow {
            review_number: Some(1.0),
            trigger_coverage: Some(1.0),
            ..StageRow::default()
        }]);
        let sampler = PreciseStageSampler::new(&book, &hemd);
        let got = sampler
            .sample_stage(Stage::Concept, 8, &mut StdRng::seed_from_u64(1))
            .expect("sample");
        assert_eq!(got.samples, SampleVector::zeros(8));
        assert!(got.fit.is_none());
    }

    #[test]
    fn precise_rejects_unknown_modes() {
        let hemd = hemd();
        let book = task_book(vec![task_row(1.0, "Q7")]);
        let sampler = PreciseStageSampler::new(&book, &hemd);
        let err = sampler
            .sample_stage(Stage::Testing, 4, &mut StdRng::seed_from_u64(1))
            .expect_err("must fail");
        assert!(matches!(err, ExecError::InvalidArgument(_)));
    }

    #[test]
    fn log_normal_fit_recovers_parameters() {
        let dist = ConditionalDistribution::log_normal(-4.0, 0.6).expect("lognormal");
        let samples = dist.sample_n(40_000, &mut StdRng::seed_from_u64(11));
        let fit = LogNormalFit::fit(&samples).expect("fit");
        assert!((fit.mu + 4.0).abs() < 0.02, "mu {}", fit.mu);
        assert!((fit.sigma - 0.6).abs() < 0.02, "sigma {}", fit.sigma);
        assert!(LogNormalFit::fit(&SampleVector::new(vec![0.1, 0.0])).is_none());
    }

    #[test]
    fn approx_uses_first_complete_summary_row() {
        let rows = vec![
            StageRow {
                hep_mean: Some(0.9),
                ..StageRow::default()
            },
            StageRow {
                hep_mean: Some(0.3),
                hep_std: Some(0.05),
                review_number: Some(2.0),
                trigger_coverage: Some(0.9),
                ..StageRow::default()
            },
        ];
        let book = task_book(rows);
        let sampler = ApproxStageSampler::new(&book);
        let got = sampler
            .sample_stage(Stage::Requirement, 5_000, &mut StdRng::seed_from_u64(2))
            .expect("sample");
        assert!((got.samples.mean() - 0.3).abs() < 0.005);
        assert!(got.samples.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    #[test]
    fn direct_sampler_uses_supplied_values() {
        let observations = ByStage::from_fn(|stage| {
            if stage == Stage::Testing {
                StageObservation::Samples {
                    samples: SampleVector::filled(4, 0.2),
                    review: 2.25,
                    trigger: 0.9785,
                }
            } else {
                StageObservation::Summary {
                    mean: 0.25,
                    std: 0.05,
                    review: 2.0,
                    trigger: 0.9,
                }
            }
        });
        let sampler = DirectStageSampler::new(observations);
        let mut rng = StdRng::seed_from_u64(3);
        let stages = sample_stages(&sampler, 4, &mut rng).expect("stages");
        assert_eq!(stages[Stage::Testing].samples, SampleVector::filled(4, 0.2));
        let dcps = stage_dcps(&sampler).expect("dcp");
        assert!((dcps[Stage::Testing] / 3.743_912_186_389_639_4e-5 - 1.0).abs() < 1e-12);

        let err = sampler
            .sample_stage(Stage::Testing, 5, &mut rng)
            .expect_err("length mismatch");
        assert!(matches!(err, ExecError::InvalidArgument(_)));
    }
}
