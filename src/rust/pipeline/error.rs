use ort::Error as OrtError;

use crate::artifacts::ArtifactError;

/// Represents the different types of errors that can occur between raw input and prediction.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required attribute is missing or a value lies outside its domain
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// One-hot expansion or column alignment failed
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// The vector handed to the scaler does not match the fitted width
    #[error("Dimension mismatch: scaler was fit on {expected} columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// The classifier failed or produced an unusable output
    #[error("Inference error: {0}")]
    InferenceError(String),
    /// The trained feature contract is missing or inconsistent
    #[error("Contract error: {0}")]
    ContractError(String),
    /// The prediction record could not be exported
    #[error("Export error: {0}")]
    ExportError(String),
    /// Error occurred while assembling the predictor
    #[error("Build error: {0}")]
    BuildError(String),
    /// A trained artifact could not be found, read or verified
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl PipelineError {
    /// Whether the caller can fix the error by correcting the input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}

impl From<OrtError> for PipelineError {
    fn from(err: OrtError) -> Self {
        PipelineError::BuildError(err.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::ExportError(err.to_string())
    }
}
