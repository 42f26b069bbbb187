//! Error types for the profiler.

use thiserror::Error;

/// Profiler-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A backend call returned a non-success status code.
    #[error("backend call failed with status {0}")]
    Status(i32),

    /// The backend module could not be located or loaded.
    #[error("failed to load backend module: {0}")]
    LibraryLoad(String),

    /// A required entry point is missing from the backend module.
    #[error("backend module is missing entry point `{0}`")]
    MissingSymbol(&'static str),

    /// No backend module exists for the requested rendering API on this platform.
    #[error("unsupported profile API: {0:?}")]
    UnsupportedApi(crate::types::ProfileApi),

    /// The backend reported a counter data type this wrapper does not recognize.
    #[error("unknown counter data type code {0}")]
    UnknownDataType(u32),

    /// The backend reported a counter usage type this wrapper does not recognize.
    #[error("unknown counter usage type code {0}")]
    UnknownUsageType(u32),

    /// The backend returned a null pointer where a value was expected.
    #[error("backend returned a null pointer from `{0}`")]
    NullPointer(&'static str),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
