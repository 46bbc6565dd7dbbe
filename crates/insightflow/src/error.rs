//! Error types for InsightFlow operations
//!
//! Every failure in the resolution pipeline is data, not a thrown exception:
//! strategy-level parse failures fall through to the next resolution step and
//! only exhaustion of the chain (or a genuine service fault) surfaces one of
//! the variants below to the caller.
//!
//! # Taxonomy
//!
//! | Variant | Meaning | Retryable |
//! |---------|---------|-----------|
//! | `Validation` | Empty/unusable query, no valid records | No |
//! | `ExternalService` | Transport failure or non-2xx from the generation service | Yes |
//! | `Timeout` | The external call exceeded its deadline | Yes |
//! | `Processing` | Unexpected parse/runtime fault inside the pipeline | No |
//! | `Persistence` | History store could not be read or written | No |

use thiserror::Error;

/// Result type alias for InsightFlow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error kind for systematic handling and user-facing flags.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input from the user (expected, not a bug)
    Validation,
    /// The generation service failed or was unreachable
    ExternalService,
    /// The generation call exceeded its deadline
    Timeout,
    /// Unexpected fault inside the pipeline
    Processing,
    /// Local history store I/O failure
    Persistence,
}

impl ErrorKind {
    /// Whether retrying the same operation could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::ExternalService | ErrorKind::Timeout)
    }
}

/// Errors produced by the query-resolution pipeline.
///
/// Variants carry only message strings, so errors are cheap to clone into
/// state snapshots and history diagnostics.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Empty or unusable query text, or a series with no valid records.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure or non-success status from the generation service.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// The external generation call exceeded its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Unexpected parse or runtime fault in the pipeline.
    #[error("Processing error: {0}")]
    Processing(String),

    /// The history store could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an external service error.
    pub fn external_service(msg: impl Into<String>) -> Self {
        Error::ExternalService(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a processing error.
    pub fn processing(msg: impl Into<String>) -> Self {
        Error::Processing(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Error::Persistence(msg.into())
    }

    /// Classify this error for systematic handling.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::ExternalService(_) => ErrorKind::ExternalService,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Processing(_) => ErrorKind::Processing,
            Error::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Processing(format!("JSON error: {err}"))
    }
}
