//! Error types for the MNIST preparation pipeline.

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, PrepError>;

/// Every failure is fatal: nothing in the pipeline retries or recovers.
#[derive(Error, Debug)]
pub enum PrepError {
    /// The dataset could not be fetched or read back from the local cache.
    #[error("dataset unavailable: {resource}")]
    DataUnavailable {
        resource: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The data does not have the dimensions or counts it must have.
    #[error("unexpected dataset shape: {0}")]
    Shape(String),

    /// A label byte outside 0..=9.
    #[error("invalid label {0}, expected a digit in 0..=9")]
    InvalidLabel(u8),

    /// A pixel that should be 0 or 1 holds some other value.
    #[error("pixel {index} has value {value}, expected 0 or 1")]
    NonBinaryPixel { index: usize, value: u8 },

    /// A prepared record that cannot be written or parsed.
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    /// IO error while writing or reading the prepared file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker task died before returning its chunk.
    #[error("worker failed: {0}")]
    Worker(String),
}

impl PrepError {
    pub(crate) fn unavailable(
        resource: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        PrepError::DataUnavailable {
            resource: resource.into(),
            source: source.into(),
        }
    }

    pub(crate) fn record(line: usize, reason: impl Into<String>) -> Self {
        PrepError::InvalidRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Whether the failure came from fetching the dataset rather than processing it.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PrepError::DataUnavailable { .. })
    }
}
