//! Error types for reading input tables and validating configuration.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 1-based cell position inside a sheet (header row excluded from `row`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
}

/// Configuration or sheet context a diagnostic refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationContext {
    Section {
        section: String,
    },
    Key {
        section: String,
        key: String,
    },
    Sheet {
        sheet: String,
    },
    Column {
        sheet: String,
        column: String,
    },
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section { section } => write!(f, "section [{}]", section),
            Self::Key { section, key } => write!(f, "[{}] {}", section, key),
            Self::Sheet { sheet } => write!(f, "sheet '{}'", sheet),
            Self::Column { sheet, column } => {
                write!(f, "sheet '{}' column '{}'", sheet, column)
            }
        }
    }
}

/// Rich validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub message: String,
    pub context: Option<ValidationContext>,
    pub position: Option<CellPosition>,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error")?;
        if let Some(ctx) = &self.context {
            write!(f, " [{}]", ctx)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(pos) = self.position {
            write!(f, " (at row {}, column {})", pos.row, pos.column)?;
        }
        Ok(())
    }
}

/// Errors that can occur while reading tables or validating configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FrontendError {
    /// A file could not be opened or read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV sheet is malformed.
    #[error("malformed sheet '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The configuration document is not valid TOML or does not match the schema.
    #[error("configuration error: {0}")]
    Toml(String),

    /// A cell or token could not be interpreted.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Semantic validation error.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Semantic validation error with context and optional cell position.
    #[error("{0}")]
    ValidationDiagnostic(ValidationDiagnostic),
}

impl FrontendError {
    /// Build a context-aware validation diagnostic.
    pub fn validation(
        message: impl Into<String>,
        context: Option<ValidationContext>,
        position: Option<CellPosition>,
    ) -> Self {
        Self::ValidationDiagnostic(ValidationDiagnostic {
            message: message.into(),
            context,
            position,
        })
    }

    /// Shorthand for a diagnostic pinned to a configuration key.
    pub fn invalid_key(section: &str, key: &str, message: impl Into<String>) -> Self {
        Self::validation(
            message,
            Some(ValidationContext::Key {
                section: section.to_string(),
                key: key.to_string(),
            }),
            None,
        )
    }

    /// Returns the rich validation diagnostic if present.
    pub fn validation_diagnostic(&self) -> Option<&ValidationDiagnostic> {
        match self {
            Self::ValidationDiagnostic(diag) => Some(diag),
            _ => None,
        }
    }
}
