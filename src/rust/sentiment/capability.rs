use std::fmt;

use anyhow::Result;
use ndarray::Array2;

/// Integer class label returned by a classifier. `1` is positive by
/// convention; every other value is treated as negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub i64);

impl Label {
    pub const POSITIVE: Label = Label(1);
    pub const NEGATIVE: Label = Label(0);

    pub fn is_positive(&self) -> bool {
        self.0 == 1
    }

    pub fn sentiment(&self) -> Sentiment {
        if self.is_positive() {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("positive"),
            Self::Negative => f.write_str("negative"),
        }
    }
}

/// How a classifier artifact was packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifierKind {
    /// Feature extraction is baked in; the classifier accepts raw text.
    Pipeline,
    /// The classifier needs features produced by a separate vectorizer.
    BareEstimator,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline => f.write_str("pipeline"),
            Self::BareEstimator => f.write_str("bare estimator"),
        }
    }
}

/// A batch handed to [`Predict::predict`].
#[derive(Debug, Clone, Copy)]
pub enum ClassifierInput<'a> {
    /// Normalized strings, for pipeline classifiers.
    Text(&'a [String]),
    /// One row of features per input, for bare estimators.
    Features(&'a Array2<f32>),
}

impl ClassifierInput<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Text(texts) => texts.len(),
            Self::Features(features) => features.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The `predict` capability of a loaded classifier artifact.
///
/// Implementations must be side-effect free so a single instance can be
/// shared read-only for the whole process.
pub trait Predict: Send + Sync {
    /// Consulted once when the analyzer is built.
    /// Returns true if the classifier performs its own feature extraction.
    fn accepts_raw_text(&self) -> bool;

    /// Predicts one label per input row.
    fn predict(&self, input: ClassifierInput<'_>) -> Result<Vec<Label>>;

    /// Number of features a bare estimator expects, if the artifact declares it.
    fn feature_width(&self) -> Option<usize> {
        None
    }
}

/// The `transform` capability of a loaded vectorizer artifact.
pub trait Transform: Send + Sync {
    /// Converts each text into one row of the returned feature matrix.
    fn transform(&self, texts: &[String]) -> Result<Array2<f32>>;

    /// Number of features produced per row, if the artifact declares it.
    fn output_width(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_is_positive() {
        assert_eq!(Label(1).sentiment(), Sentiment::Positive);
        assert_eq!(Label(0).sentiment(), Sentiment::Negative);
        assert_eq!(Label(-1).sentiment(), Sentiment::Negative);
        assert_eq!(Label(4).sentiment(), Sentiment::Negative);
    }

    #[test]
    fn test_input_len() {
        let texts = vec!["a".to_string(), "b".to_string()];
        assert_eq!(ClassifierInput::Text(&texts).len(), 2);

        let features = Array2::<f32>::zeros((3, 4));
        assert_eq!(ClassifierInput::Features(&features).len(), 3);
        assert!(ClassifierInput::Text(&[]).is_empty());
    }
}
