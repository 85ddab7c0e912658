//! # BAHAMAS Core
//!
//! Software failure probability estimation and common cause component
//! grouping.
//!
//! - [`engine`]: distribution builders and the BBN propagation from
//!   development stages through defect categories to unsafe control actions
//! - [`cccg`]: grouping of components that share coupling factors
//! - [`subfactor`]: beta-factor and defense-factor scoring
//! - [`metrics`], [`storage`]: summaries, histograms and output files
//! - [`workflow`]: configuration-driven runs

pub mod cccg;
pub mod engine;
pub mod metrics;
pub mod storage;
pub mod subfactor;
pub mod workflow;

// Re-export commonly used types
pub use cccg::{AggregatedGroup, CccgGenerator, CccgView, ComponentGroup};
pub use engine::bbn::{BbnModel, BbnOptions, BbnResult};
pub use engine::errors::ExecError;
pub use engine::numeric_kernels::SampleVector;
pub use engine::stage_sampler::{StageObservation, StageSampler};
pub use metrics::{PlotKind, SummaryTable};
pub use subfactor::{compute_beta, compute_phi};
pub use workflow::{Workflow, WorkflowOutputs, WorkflowReport};

/// Load and validate a configuration file.
///
/// Convenience wrapper converting frontend errors to core errors.
pub fn load_config(path: &std::path::Path) -> Result<bahamas_frontend::Config, ExecError> {
    Ok(bahamas_frontend::load_config(path)?)
}
