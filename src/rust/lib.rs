//! Binary sentiment analysis over a pre-trained classifier artifact.
//!
//! Raw text is normalized (lowercased, URLs and non-letters stripped,
//! whitespace collapsed) and handed to a classifier. The classifier is either
//! a pipeline that extracts its own features or a bare estimator that needs a
//! separately persisted vectorizer; which one is decided once at load time.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sentiment_analyzer::{load_artifacts, ArtifactPaths, RuntimeConfig};
//!
//! let analyzer = load_artifacts(&ArtifactPaths::in_dir("models"), &RuntimeConfig::default())?;
//!
//! if let Some(analysis) = analyzer.analyze("This is a great movie!")? {
//!     println!("{} ({})", analysis.sentiment, analysis.label);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The analyzer is immutable after loading and can be shared across threads
//! using `Arc`:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sentiment_analyzer::{load_artifacts, ArtifactPaths, RuntimeConfig};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let analyzer = Arc::new(load_artifacts(&ArtifactPaths::default(), &RuntimeConfig::default())?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let analyzer = Arc::clone(&analyzer);
//!     handles.push(thread::spawn(move || {
//!         analyzer.analyze("test text").unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod host;
mod runtime;
pub mod sentiment;

pub use artifacts::{ArtifactError, ArtifactPaths};
pub use host::{run_session, InteractiveHost, SessionSummary};
pub use runtime::{create_session_builder, RuntimeConfig};
pub use sentiment::{
    load_artifacts, normalize, Analysis, AnalyzerBuilder, AnalyzerError, AnalyzerInfo,
    ClassifierInput, ClassifierKind, Label, NormalizedText, OnnxClassifier, OnnxVectorizer,
    Predict, ReadyState, Sentiment, SentimentAnalyzer, Transform,
};

pub fn init_logger() {
    env_logger::init();
}
