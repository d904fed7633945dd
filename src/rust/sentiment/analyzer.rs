use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};

use super::builder::AnalyzerBuilder;
use super::capability::{ClassifierInput, ClassifierKind, Label, Predict, Sentiment, Transform};
use super::error::AnalyzerError;
use super::normalize::NormalizedText;
use super::{AnalyzerInfo, ReadyState};
use crate::artifacts::ArtifactPaths;
use crate::runtime::RuntimeConfig;

/// A loaded, immutable sentiment model: a classifier artifact plus the
/// vectorizer it may depend on.
///
/// The packaging of the classifier is detected once when the analyzer is built;
/// every prediction then branches on that [`ClassifierKind`] alone.
///
/// # Thread Safety
///
/// Both capability objects are `Send + Sync` and held behind `Arc`, so the
/// analyzer can be shared across threads without extra locking.
///
/// ```rust
/// # use sentiment_analyzer::{SentimentAnalyzer, Predict, ClassifierInput, Label, NormalizedText};
/// struct AlwaysPositive;
///
/// impl Predict for AlwaysPositive {
///     fn accepts_raw_text(&self) -> bool { true }
///     fn predict(&self, input: ClassifierInput<'_>) -> anyhow::Result<Vec<Label>> {
///         Ok(vec![Label::POSITIVE; input.len()])
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let analyzer = SentimentAnalyzer::builder()
///     .with_classifier(AlwaysPositive)
///     .build()?;
///
/// let label = analyzer.predict(&NormalizedText::new("Great movie!"))?;
/// assert!(label.is_positive());
/// # Ok(())
/// # }
/// ```
pub struct SentimentAnalyzer {
    pub(crate) classifier: Arc<dyn Predict>,
    pub(crate) transformer: Option<Arc<dyn Transform>>,
    pub(crate) kind: ClassifierKind,
    pub(crate) model_path: Option<PathBuf>,
    pub(crate) vectorizer_path: Option<PathBuf>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn verify_thread_safety() {
        assert_send_sync::<SentimentAnalyzer>();
    }
};

/// Outcome of analyzing one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub text: NormalizedText,
    pub label: Label,
    pub sentiment: Sentiment,
}

/// Loads the classifier (and, for a bare estimator, the vectorizer) from
/// disk. Called once at startup; the returned analyzer is passed to every
/// later prediction.
///
/// A missing, corrupt or checksum-mismatched classifier is an
/// [`AnalyzerError::ArtifactLoadError`]. A missing vectorizer is not: the
/// analyzer comes up in [`ReadyState::BareWithoutTransformer`] and each
/// prediction fails with [`AnalyzerError::MissingDependency`].
pub fn load_artifacts(
    paths: &ArtifactPaths,
    config: &RuntimeConfig,
) -> Result<SentimentAnalyzer, AnalyzerError> {
    SentimentAnalyzer::builder()
        .with_runtime_config(config.clone())
        .with_artifacts(paths.clone())
        .build()
}

impl SentimentAnalyzer {
    /// Creates a new AnalyzerBuilder for fluent construction
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    pub fn state(&self) -> ReadyState {
        match (self.kind, self.transformer.is_some()) {
            (ClassifierKind::Pipeline, _) => ReadyState::Pipeline,
            (ClassifierKind::BareEstimator, true) => ReadyState::BareWithTransformer,
            (ClassifierKind::BareEstimator, false) => ReadyState::BareWithoutTransformer,
        }
    }

    /// Returns information about the analyzer's loaded artifacts
    pub fn info(&self) -> AnalyzerInfo {
        AnalyzerInfo {
            model_path: self.model_path.clone(),
            vectorizer_path: self.vectorizer_path.clone(),
            kind: self.kind,
            state: self.state(),
            feature_width: self.classifier.feature_width(),
        }
    }

    /// Predicts the label of already-normalized text.
    ///
    /// # Errors
    /// - `MissingDependency` if the classifier is a bare estimator and no
    ///   vectorizer was loaded
    /// - `InferenceError` if the vectorizer or classifier fails, panics, or
    ///   returns no label
    pub fn predict(&self, text: &NormalizedText) -> Result<Label, AnalyzerError> {
        let batch = vec![text.as_str().to_string()];

        let labels = match self.kind {
            ClassifierKind::Pipeline => {
                guarded("classifier", || self.classifier.predict(ClassifierInput::Text(&batch)))?
            }
            ClassifierKind::BareEstimator => {
                let transformer = self.transformer.as_ref().ok_or_else(|| {
                    AnalyzerError::MissingDependency(
                        "vectorizer required but not supplied; include the TF-IDF or count vectorizer artifact"
                            .to_string(),
                    )
                })?;
                let features = guarded("vectorizer", || transformer.transform(&batch))?;
                debug!("Vectorized input into {:?} features", features.dim());
                guarded("classifier", || {
                    self.classifier.predict(ClassifierInput::Features(&features))
                })?
            }
        };

        labels.into_iter().next().ok_or_else(|| {
            AnalyzerError::InferenceError("Classifier returned no labels".to_string())
        })
    }

    /// Normalizes raw user input and predicts its sentiment.
    ///
    /// Returns `Ok(None)` for empty input, which skips prediction entirely.
    pub fn analyze(&self, raw: &str) -> Result<Option<Analysis>, AnalyzerError> {
        if raw.is_empty() {
            return Ok(None);
        }

        let text = NormalizedText::new(raw);
        if text.is_empty() {
            warn!("Input normalized to an empty string; predicting on empty text");
        }

        let label = self.predict(&text)?;
        debug!("Predicted label {} for '{}'", label, text);
        Ok(Some(Analysis {
            sentiment: label.sentiment(),
            label,
            text,
        }))
    }
}

impl fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("kind", &self.kind)
            .field("state", &self.state())
            .field("model_path", &self.model_path)
            .field("vectorizer_path", &self.vectorizer_path)
            .finish()
    }
}

/// Runs one capability call, turning both returned errors and panics into
/// `InferenceError` so a faulty artifact cannot take the host down.
fn guarded<T, F>(stage: &str, call: F) -> Result<T, AnalyzerError>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(AnalyzerError::InferenceError(format!("{}: {:#}", stage, err))),
        Err(payload) => Err(AnalyzerError::InferenceError(format!(
            "{} panicked: {}",
            stage,
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
