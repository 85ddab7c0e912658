//! # Configuration Validation
//!
//! Checks a parsed [`Config`] before anything is computed:
//!
//! - **Sections**: at least one of `[BBN]` and `[CCF]` is present
//! - **BBN**: `params.samples > 0`, `analysis.type` is `precise` or `approx`,
//!   `files.defect` is set, and the workbook required by the analysis type
//!   (`files.task` for precise, `files.approx` for approx) is set
//! - **CCF**: `files.structure` is set, `generate.output_type` is `csv`,
//!   `generate.output_file_base` is non-empty, and the whole-family views
//!   (`function_all`, `input_all`, `design_all`) are not requested
//!
//! Validation is separate from parsing so every failure names the offending
//! section and key.

use crate::config::{AnalysisType, BbnConfig, CcfConfig, Config, DEFAULT_OUTPUT_TYPE};
use crate::errors::{FrontendError, ValidationContext};

/// Validate a configuration document.
///
/// # Returns
///
/// * `Ok(())` - Configuration can be run as-is
/// * `Err(FrontendError::ValidationDiagnostic)` - First problem found
pub fn validate_config(config: &Config) -> Result<(), FrontendError> {
    if config.bbn.is_none() && config.ccf.is_none() {
        return Err(FrontendError::validation(
            "configuration must contain a [BBN] or [CCF] section",
            None,
            None,
        ));
    }
    if let Some(bbn) = &config.bbn {
        validate_bbn(bbn)?;
    }
    if let Some(ccf) = &config.ccf {
        validate_ccf(ccf)?;
    }
    Ok(())
}

fn validate_bbn(bbn: &BbnConfig) -> Result<(), FrontendError> {
    if bbn.params.samples == 0 {
        return Err(FrontendError::invalid_key(
            "BBN",
            "params.samples",
            "sample count must be positive",
        ));
    }
    if bbn.files.defect.is_none() {
        return Err(FrontendError::invalid_key(
            "BBN",
            "files.defect",
            "defect workbook is required",
        ));
    }
    match bbn.analysis_type()? {
        AnalysisType::Precise if bbn.files.task.is_none() => Err(FrontendError::invalid_key(
            "BBN",
            "files.task",
            "task list workbook is required for precise analysis",
        )),
        AnalysisType::Approx if bbn.files.approx.is_none() => Err(FrontendError::invalid_key(
            "BBN",
            "files.approx",
            "approximation workbook is required for approx analysis",
        )),
        _ => Ok(()),
    }
}

fn validate_ccf(ccf: &CcfConfig) -> Result<(), FrontendError> {
    if ccf.files.structure.is_none() {
        return Err(FrontendError::invalid_key(
            "CCF",
            "files.structure",
            "component structure table is required",
        ));
    }
    let generate = &ccf.generate;
    if !generate.output_type.eq_ignore_ascii_case(DEFAULT_OUTPUT_TYPE) {
        return Err(FrontendError::invalid_key(
            "CCF",
            "generate.output_type",
            format!(
                "unsupported output type '{}', only 'csv' is available",
                generate.output_type
            ),
        ));
    }
    if generate.output_file_base.trim().is_empty() {
        return Err(FrontendError::invalid_key(
            "CCF",
            "generate.output_file_base",
            "output file base must not be empty",
        ));
    }
    for (key, on) in [
        ("generate.function_all", generate.function_all),
        ("generate.input_all", generate.input_all),
        ("generate.design_all", generate.design_all),
    ] {
        if on {
            return Err(FrontendError::invalid_key(
                "CCF",
                key,
                "whole-family grouping views are not supported",
            ));
        }
    }
    if generate.requested_views().is_empty() {
        return Err(FrontendError::validation(
            "no CCCG view requested; enable at least one of final, single, double, triple",
            Some(ValidationContext::Section {
                section: "CCF".to_string(),
            }),
            None,
        ));
    }
    Ok(())
}
