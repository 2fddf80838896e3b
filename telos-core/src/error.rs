//! Errors in the library.
use thiserror::Error;

/// Errors raised while evaluating a loss.
#[derive(Error, Debug)]
pub enum LossError {
    /// A required field is missing from the batch.
    #[error("Batch field error: {0}")]
    BatchField(String),

    /// The requested configuration is not implemented.
    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    /// Error raised by a tensor operation.
    #[error(transparent)]
    Tensor(#[from] candle_core::Error),
}

/// Result type of the library.
pub type Result<T> = std::result::Result<T, LossError>;
