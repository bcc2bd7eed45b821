//! Error types for running-config parsing.

use thiserror::Error;

/// Errors that can occur while parsing device output.
#[derive(Debug, Error)]
pub enum Error {
    /// A recognised statement carried a value that cannot be used
    #[error("invalid running-config at line {line}: {message}")]
    Parse {
        /// Line number where the parse error occurred (1-indexed)
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// The parsed records failed validation
    #[error(transparent)]
    Record(#[from] reconcile::Error),
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;
