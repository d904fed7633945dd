use std::sync::Arc;

use log::{error, info, warn};

use super::analyzer::SentimentAnalyzer;
use super::capability::{ClassifierKind, Predict, Transform};
use super::error::AnalyzerError;
use super::onnx::{OnnxClassifier, OnnxVectorizer};
use super::ReadyState;
use crate::artifacts::ArtifactPaths;
use crate::runtime::RuntimeConfig;

/// A builder for constructing a SentimentAnalyzer with a fluent interface.
///
/// The classifier comes either from artifact files on disk
/// ([`with_artifacts`](Self::with_artifacts)) or from an in-memory
/// implementation of [`Predict`] ([`with_classifier`](Self::with_classifier)).
#[derive(Default)]
pub struct AnalyzerBuilder {
    classifier: Option<Arc<dyn Predict>>,
    transformer: Option<Arc<dyn Transform>>,
    paths: Option<ArtifactPaths>,
    runtime_config: RuntimeConfig,
}

impl AnalyzerBuilder {
    /// Creates a new empty AnalyzerBuilder instance with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution
    ///
    /// # Example
    /// ```
    /// use sentiment_analyzer::{AnalyzerBuilder, RuntimeConfig};
    ///
    /// let builder = AnalyzerBuilder::new()
    ///     .with_runtime_config(RuntimeConfig::default().with_threads(1));
    /// ```
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Loads the classifier, and the vectorizer if one turns out to be
    /// needed, from the given files when [`build`](Self::build) runs.
    pub fn with_artifacts(mut self, paths: ArtifactPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Uses an already-loaded classifier.
    pub fn with_classifier<P: Predict + 'static>(mut self, classifier: P) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Uses an already-loaded vectorizer. Ignored if the classifier turns
    /// out to be a pipeline.
    pub fn with_transformer<T: Transform + 'static>(mut self, transformer: T) -> Self {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    /// Loads what is missing and detects the classifier's packaging.
    ///
    /// # Returns
    /// * `Result<SentimentAnalyzer, AnalyzerError>` - The analyzer if successful, or:
    ///   - `ValidationError` if no classifier source was given, or two were
    ///   - `ArtifactLoadError` if the classifier file is missing, corrupt,
    ///     fails its checksum, or has no `predict` capability
    ///
    /// A vectorizer that cannot be loaded is logged and left out; the
    /// analyzer then reports [`ReadyState::BareWithoutTransformer`].
    pub fn build(self) -> Result<SentimentAnalyzer, AnalyzerError> {
        let classifier = match (self.classifier, &self.paths) {
            (Some(_), Some(_)) => {
                return Err(AnalyzerError::ValidationError(
                    "Both an in-memory classifier and artifact paths were supplied".to_string(),
                ))
            }
            (Some(classifier), None) => classifier,
            (None, Some(paths)) => Self::load_classifier(paths, &self.runtime_config)?,
            (None, None) => {
                return Err(AnalyzerError::ValidationError(
                    "A classifier or artifact paths must be set".to_string(),
                ))
            }
        };

        let kind = if classifier.accepts_raw_text() {
            ClassifierKind::Pipeline
        } else {
            ClassifierKind::BareEstimator
        };
        info!("Classifier packaged as {}", kind);

        let mut vectorizer_path = None;
        let transformer = match kind {
            ClassifierKind::Pipeline => {
                if self.transformer.is_some() {
                    info!("Classifier extracts its own features; ignoring the supplied vectorizer");
                }
                None
            }
            ClassifierKind::BareEstimator => {
                let transformer = match (self.transformer, &self.paths) {
                    (Some(transformer), _) => Some(transformer),
                    (None, Some(paths)) => {
                        let loaded = Self::load_vectorizer(paths, &self.runtime_config);
                        if loaded.is_some() {
                            vectorizer_path = Some(paths.vectorizer_path.clone());
                        }
                        loaded
                    }
                    (None, None) => None,
                };
                transformer.filter(|t| Self::widths_agree(classifier.as_ref(), t.as_ref()))
            }
        };

        let analyzer = SentimentAnalyzer {
            classifier,
            transformer,
            kind,
            model_path: self.paths.as_ref().map(|p| p.model_path.clone()),
            vectorizer_path,
        };

        match analyzer.state() {
            ReadyState::BareWithoutTransformer => warn!(
                "Classifier needs a vectorizer but none is available; every prediction will fail until one is supplied"
            ),
            state => info!("Analyzer ready ({})", state),
        }
        Ok(analyzer)
    }

    fn load_classifier(
        paths: &ArtifactPaths,
        config: &RuntimeConfig,
    ) -> Result<Arc<dyn Predict>, AnalyzerError> {
        paths.check_model().map_err(|e| {
            error!("Error loading model: {}", e);
            AnalyzerError::from(e)
        })?;
        let classifier = OnnxClassifier::from_file(&paths.model_path, config).map_err(|e| {
            error!("Error loading model: {}", e);
            e
        })?;
        Ok(Arc::new(classifier))
    }

    fn load_vectorizer(paths: &ArtifactPaths, config: &RuntimeConfig) -> Option<Arc<dyn Transform>> {
        if let Err(e) = paths.check_vectorizer() {
            warn!("Vectorizer unavailable: {}", e);
            return None;
        }
        match OnnxVectorizer::from_file(&paths.vectorizer_path, config) {
            Ok(vectorizer) => Some(Arc::new(vectorizer)),
            Err(e) => {
                warn!("Vectorizer unavailable: {}", e);
                None
            }
        }
    }

    fn widths_agree(classifier: &dyn Predict, transformer: &dyn Transform) -> bool {
        match (classifier.feature_width(), transformer.output_width()) {
            (Some(expected), Some(produced)) if expected != produced => {
                warn!(
                    "Vectorizer produces {} features but the classifier expects {}; discarding vectorizer",
                    produced, expected
                );
                false
            }
            _ => true,
        }
    }
}
