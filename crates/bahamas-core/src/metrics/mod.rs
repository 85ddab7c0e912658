//! Summary statistics and histograms over sample vectors.
//!
//! - [`FailureProbability`]: `(mean, std, samples)` view of one output series
//! - [`SummaryTable`]: the `{Total Failure Prob., UCA-A..D} × {mean, std}` report
//! - [`Histogram`] / [`HistogramFigure`]: fixed-width binning of one or more
//!   series under a report title, selected by [`PlotKind`]
//!
//! Histograms are plain data; rendering them is left to the caller.

use std::fmt;
use std::str::FromStr;

use crate::engine::errors::ExecError;
use crate::engine::numeric_kernels::SampleVector;

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 50;

pub const STAGE_PLOT_TITLE: &str =
    "Software Development Life Cycle Stage Failure Probabilities Based on Human Error Propagation";
pub const ODC_PLOT_TITLE: &str = "Software ODC Failure Probabilities";
pub const UCA_PLOT_TITLE: &str = "Software UCA Failure Probabilities";
pub const TOTAL_PLOT_TITLE: &str = "Total Software Failure Probability";
pub const TOTAL_SERIES_NAME: &str = "Total Failure Probability";

/// Row label of the total in the summary table.
pub const TOTAL_SUMMARY_LABEL: &str = "Total Failure Prob.";

/// Mean, population std and the underlying draws of one output series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureProbability<'a> {
    pub mean: f64,
    pub std: f64,
    pub samples: &'a SampleVector,
}

impl<'a> FailureProbability<'a> {
    pub fn of(samples: &'a SampleVector) -> Self {
        Self {
            mean: samples.mean(),
            std: samples.std(),
            samples,
        }
    }
}

/// One column of the summary table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SummaryEntry {
    pub label: String,
    pub mean: f64,
    pub std: f64,
}

/// BBN summary table keyed by series label.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SummaryTable {
    pub entries: Vec<SummaryEntry>,
}

impl SummaryTable {
    pub fn push(&mut self, label: impl Into<String>, summary: FailureProbability<'_>) {
        self.entries.push(SummaryEntry {
            label: label.into(),
            mean: summary.mean,
            std: summary.std,
        });
    }

    pub fn get(&self, label: &str) -> Option<&SummaryEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.label.as_str())
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<22} {:>14} {:>14}", "", "mean", "std")?;
        for e in &self.entries {
            writeln!(f, "{:<22} {:>14.6e} {:>14.6e}", e.label, e.mean, e.std)?;
        }
        Ok(())
    }
}

/// Which series a plot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    All,
    Stage,
    Odc,
    Uca,
    Total,
}

impl FromStr for PlotKind {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PlotKind::All),
            "stage" => Ok(PlotKind::Stage),
            "odc" => Ok(PlotKind::Odc),
            "uca" => Ok(PlotKind::Uca),
            "total" => Ok(PlotKind::Total),
            other => Err(ExecError::InvalidArgument(format!(
                "unknown plot kind '{}', expected one of all, stage, odc, uca, total",
                other
            ))),
        }
    }
}

/// Fixed-width histogram of one series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Histogram {
    pub name: String,
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin `samples` into `bins` equal-width bins spanning their range. The
    /// last bin is closed. A constant series is centred in a unit-wide range.
    pub fn from_samples(name: impl Into<String>, samples: &SampleVector, bins: usize) -> Self {
        let bins = bins.max(1);
        let name = name.into();
        let Some((mut lo, mut hi)) = samples.range() else {
            return Self {
                name,
                edges: Vec::new(),
                counts: Vec::new(),
            };
        };
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0u64; bins];
        for &x in samples {
            let idx = (((x - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { name, edges, counts }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Overlaid histograms under one title.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HistogramFigure {
    pub title: String,
    pub series: Vec<Histogram>,
}

impl HistogramFigure {
    pub fn new<'a, I>(title: &str, series: I, bins: usize) -> Self
    where
        I: IntoIterator<Item = (String, &'a SampleVector)>,
    {
        Self {
            title: title.to_string(),
            series: series
                .into_iter()
                .map(|(name, samples)| Histogram::from_samples(name, samples, bins))
                .collect(),
        }
    }
}
