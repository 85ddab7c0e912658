//! Error types for BAHAMAS computations.

use std::path::PathBuf;

use thiserror::Error;

use bahamas_frontend::FrontendError;

impl From<FrontendError> for ExecError {
    fn from(err: FrontendError) -> Self {
        match err {
            FrontendError::ParseError(msg) => ExecError::ParseError(msg),
            FrontendError::Toml(msg) => ExecError::ValidationError(msg),
            FrontendError::ValidationError(msg) => ExecError::ValidationError(msg),
            FrontendError::ValidationDiagnostic(diag) => ExecError::ValidationError(diag.to_string()),
            FrontendError::Io { path, source } => ExecError::Io {
                path,
                message: source.to_string(),
            },
            FrontendError::Csv { path, source } => ExecError::ParseError(format!(
                "malformed sheet '{}': {}",
                path.display(),
                source
            )),
            _ => ExecError::Internal(format!("unexpected frontend error: {:?}", err)),
        }
    }
}

/// Errors that can occur while building models, propagating or grouping.
///
/// Marked `#[non_exhaustive]` so variants can be added without breaking
/// callers. All public APIs return `Result<T, ExecError>`; library code does
/// not panic on bad input.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ExecError {
    /// An input table could not be interpreted.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Configuration or input failed validation before any computation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A required input (e.g. the task list for precise analysis) was not supplied.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// A distribution family or option outside the supported set was requested.
    #[error("unsupported option: {0}")]
    Unsupported(String),

    /// An argument names something that does not exist (view, plot kind, mode).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Numerical problem (non-finite parameters, empty sample set).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Output could not be written.
    #[error("i/o error on '{}': {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// Internal error (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExecError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ExecError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
