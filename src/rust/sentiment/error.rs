use ort::Error as OrtError;
use thiserror::Error;

use crate::artifacts::ArtifactError;

/// Represents the different types of errors that can occur while loading
/// artifacts or analyzing text.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The classifier could not be loaded or does not expose a `predict` capability.
    /// Fatal at startup.
    #[error("Artifact load error: {0}")]
    ArtifactLoadError(String),
    /// A bare estimator was loaded without a usable vectorizer.
    #[error("Missing dependency: {0}")]
    MissingDependency(String),
    /// The classifier or vectorizer failed while running.
    #[error("Inference error: {0}")]
    InferenceError(String),
    /// The analyzer was configured with invalid parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AnalyzerError {
    /// Returns true if the error leaves the analyzer unusable for every
    /// later request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ArtifactLoadError(_) | Self::ValidationError(_))
    }
}

impl From<OrtError> for AnalyzerError {
    fn from(err: OrtError) -> Self {
        AnalyzerError::ArtifactLoadError(err.to_string())
    }
}

impl From<ArtifactError> for AnalyzerError {
    fn from(err: ArtifactError) -> Self {
        AnalyzerError::ArtifactLoadError(err.to_string())
    }
}
