use std::fmt;
use std::path::PathBuf;

mod analyzer;
pub mod builder;
mod capability;
mod error;
mod normalize;
mod onnx;

pub use analyzer::{load_artifacts, Analysis, SentimentAnalyzer};
pub use builder::AnalyzerBuilder;
pub use capability::{ClassifierInput, ClassifierKind, Label, Predict, Sentiment, Transform};
pub use error::AnalyzerError;
pub use normalize::{normalize, NormalizedText};
pub use onnx::{OnnxClassifier, OnnxVectorizer};

/// Which artifacts the analyzer came up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// The classifier extracts its own features.
    Pipeline,
    /// A bare estimator paired with a usable vectorizer.
    BareWithTransformer,
    /// A bare estimator without a vectorizer; every prediction fails with
    /// `MissingDependency`.
    BareWithoutTransformer,
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline => f.write_str("pipeline"),
            Self::BareWithTransformer => f.write_str("bare estimator with vectorizer"),
            Self::BareWithoutTransformer => f.write_str("bare estimator without vectorizer"),
        }
    }
}

/// Information about the loaded artifacts of an analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerInfo {
    /// Path to the classifier file, if it was loaded from disk
    pub model_path: Option<PathBuf>,
    /// Path to the vectorizer file, if one was loaded from disk
    pub vectorizer_path: Option<PathBuf>,
    pub kind: ClassifierKind,
    pub state: ReadyState,
    /// Number of features a bare estimator expects, when declared
    pub feature_width: Option<usize>,
}
