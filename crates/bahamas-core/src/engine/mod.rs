//! The Monte-Carlo BBN engine.
//!
//! This module provides:
//! - **errors**: Error types for execution failures
//! - **distribution**: Conditional distribution families and their samplers
//! - **hemd / odc / uca_correlation**: Distribution tables built from the defect workbook
//! - **dcp**: Defect conditional probability per stage
//! - **stage_sampler**: Precise, approximate and direct per-stage sampling
//! - **bbn**: Propagation from stages through defect categories to UCA types

pub mod bbn;
pub mod dcp;
pub mod distribution;
pub mod errors;
pub mod hemd;
pub mod indexed;
pub mod numeric_kernels;
pub mod odc;
pub mod special;
pub mod stage_sampler;
pub mod uca_correlation;
