//! # BAHAMAS Frontend
//!
//! Taxonomies, typed input tables, CSV workbook readers and configuration
//! handling for the BAHAMAS engine.

pub mod config;
pub mod errors;
pub mod parser;
pub mod tables;
pub mod taxonomy;
pub mod validate;

// Re-export commonly used types
pub use config::{load_config, parse_config, AnalysisType, Config};
pub use errors::FrontendError;
pub use tables::*;
pub use taxonomy::{CouplingFactor, DefectCategory, HumanErrorMode, Stage, UcaType};
pub use validate::validate_config;
