use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use ndarray::{Array1, Array2, Axis, Ix2};
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};

use super::capability::{ClassifierInput, Label, Predict, Transform};
use super::error::AnalyzerError;
use crate::runtime::{load_session, RuntimeConfig};

/// Name of the classifier output holding predicted labels in models exported
/// from scikit-learn.
const LABEL_OUTPUT_NAME: &str = "label";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputShape {
    /// String tensor of the given rank: `[N]` or `[N, 1]`.
    Text { rank: usize },
    /// Float tensor `[N, width]`.
    Features { width: Option<usize> },
}

/// A classifier artifact backed by an ONNX Runtime session.
///
/// The model's first input decides its packaging: a string input means
/// the graph contains its own vectorizer, a float input means it is a bare
/// estimator. Predicted labels are read from the integer output named
/// `label`, or from the first integer output if none carries that name.
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    input_shape: InputShape,
    label_output: String,
    label_type: TensorElementType,
}

impl OnnxClassifier {
    pub fn from_file(path: &Path, config: &RuntimeConfig) -> Result<Self, AnalyzerError> {
        let session = load_session(path, config)?;
        let classifier = Self::from_session(session)?;
        info!(
            "Classifier loaded from {:?} (input '{}', labels from '{}')",
            path, classifier.input_name, classifier.label_output
        );
        Ok(classifier)
    }

    /// Reads the session's signature and rejects graphs that cannot act as a
    /// classifier.
    pub fn from_session(session: Session) -> Result<Self, AnalyzerError> {
        let input = session.inputs.first().ok_or_else(|| {
            AnalyzerError::ArtifactLoadError("Model has no inputs".to_string())
        })?;

        let input_shape = match &input.input_type {
            ValueType::Tensor { ty: TensorElementType::String, dimensions, .. } => InputShape::Text {
                rank: dimensions.len().max(1),
            },
            ValueType::Tensor { ty: TensorElementType::Float32, dimensions, .. } => InputShape::Features {
                width: declared_width(dimensions),
            },
            other => {
                return Err(AnalyzerError::ArtifactLoadError(format!(
                    "Unsupported model input '{}': {:?} (expected a string or float tensor)",
                    input.name, other
                )))
            }
        };

        let label_outputs: Vec<_> = session
            .outputs
            .iter()
            .filter_map(|output| match &output.output_type {
                ValueType::Tensor { ty, .. }
                    if matches!(ty, TensorElementType::Int64 | TensorElementType::Int32) =>
                {
                    Some((output.name.clone(), *ty))
                }
                _ => None,
            })
            .collect();
        let (label_output, label_type) = label_outputs
            .iter()
            .find(|(name, _)| name == LABEL_OUTPUT_NAME)
            .or_else(|| label_outputs.first())
            .cloned()
            .ok_or_else(|| {
                AnalyzerError::ArtifactLoadError(
                    "The loaded file is not a valid model: no integer label output to predict with"
                        .to_string(),
                )
            })?;

        let input_name = input.name.clone();
        debug!("Classifier input '{}' has shape {:?}", input_name, input_shape);

        Ok(Self {
            session,
            input_name,
            input_shape,
            label_output,
            label_type,
        })
    }
}

impl Predict for OnnxClassifier {
    fn accepts_raw_text(&self) -> bool {
        matches!(self.input_shape, InputShape::Text { .. })
    }

    fn feature_width(&self) -> Option<usize> {
        match self.input_shape {
            InputShape::Features { width } => width,
            InputShape::Text { .. } => None,
        }
    }

    fn predict(&self, input: ClassifierInput<'_>) -> Result<Vec<Label>> {
        let outputs = match (input, self.input_shape) {
            (ClassifierInput::Text(texts), InputShape::Text { rank }) => {
                let mut inputs = HashMap::new();
                inputs.insert(self.input_name.as_str(), string_tensor(texts, rank)?);
                self.session.run(inputs).context("Classifier failed to run")?
            }
            (ClassifierInput::Features(features), InputShape::Features { .. }) => {
                let mut inputs = HashMap::new();
                inputs.insert(
                    self.input_name.as_str(),
                    Tensor::from_array(features.clone()).context("Failed to create feature tensor")?,
                );
                self.session.run(inputs).context("Classifier failed to run")?
            }
            (ClassifierInput::Text(_), InputShape::Features { .. }) => {
                bail!("Classifier expects numeric features but was given raw text")
            }
            (ClassifierInput::Features(_), InputShape::Text { .. }) => {
                bail!("Classifier expects raw text but was given numeric features")
            }
        };

        let output = &outputs[self.label_output.as_str()];
        let labels = match self.label_type {
            TensorElementType::Int32 => output
                .try_extract_tensor::<i32>()
                .context("Failed to extract label tensor")?
                .iter()
                .map(|&value| Label(i64::from(value)))
                .collect(),
            _ => output
                .try_extract_tensor::<i64>()
                .context("Failed to extract label tensor")?
                .iter()
                .map(|&value| Label(value))
                .collect(),
        };
        Ok(labels)
    }
}

/// A feature vectorizer artifact backed by an ONNX Runtime session: a string
/// input and a float matrix output.
#[derive(Debug)]
pub struct OnnxVectorizer {
    session: Session,
    input_name: String,
    input_rank: usize,
    output_name: String,
    output_width: Option<usize>,
}

impl OnnxVectorizer {
    pub fn from_file(path: &Path, config: &RuntimeConfig) -> Result<Self, AnalyzerError> {
        let session = load_session(path, config)?;
        let vectorizer = Self::from_session(session)?;
        info!(
            "Vectorizer loaded from {:?} ({} features)",
            path,
            vectorizer
                .output_width
                .map(|w| w.to_string())
                .unwrap_or_else(|| "dynamic".to_string())
        );
        Ok(vectorizer)
    }

    pub fn from_session(session: Session) -> Result<Self, AnalyzerError> {
        let input = session.inputs.first().ok_or_else(|| {
            AnalyzerError::ArtifactLoadError("Vectorizer has no inputs".to_string())
        })?;
        let input_rank = match &input.input_type {
            ValueType::Tensor { ty: TensorElementType::String, dimensions, .. } => dimensions.len().max(1),
            other => {
                return Err(AnalyzerError::ArtifactLoadError(format!(
                    "Vectorizer input '{}' must be a string tensor, found {:?}",
                    input.name, other
                )))
            }
        };

        let output = session
            .outputs
            .iter()
            .find(|output| {
                matches!(
                    output.output_type,
                    ValueType::Tensor { ty: TensorElementType::Float32, .. }
                )
            })
            .ok_or_else(|| {
                AnalyzerError::ArtifactLoadError(
                    "Vectorizer has no float output to transform into".to_string(),
                )
            })?;
        let output_width = match &output.output_type {
            ValueType::Tensor { dimensions, .. } => declared_width(dimensions),
            _ => None,
        };

        let input_name = input.name.clone();
        let output_name = output.name.clone();

        Ok(Self {
            session,
            input_name,
            input_rank,
            output_name,
            output_width,
        })
    }
}

impl Transform for OnnxVectorizer {
    fn output_width(&self) -> Option<usize> {
        self.output_width
    }

    fn transform(&self, texts: &[String]) -> Result<Array2<f32>> {
        let mut inputs = HashMap::new();
        inputs.insert(self.input_name.as_str(), string_tensor(texts, self.input_rank)?);
        let outputs = self.session.run(inputs).context("Vectorizer failed to run")?;

        let view = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .context("Failed to extract feature tensor")?;
        let features = match view.ndim() {
            1 => view.insert_axis(Axis(0)).into_dimensionality::<Ix2>()?.to_owned(),
            2 => view.into_dimensionality::<Ix2>()?.to_owned(),
            n => bail!("Vectorizer produced a rank-{} tensor, expected a matrix", n),
        };
        Ok(features)
    }
}

fn string_tensor(texts: &[String], rank: usize) -> Result<Tensor<String>> {
    let tensor = if rank == 1 {
        Tensor::from_string_array(Array1::from_vec(texts.to_vec()))
    } else {
        Tensor::from_string_array(Array2::from_shape_vec((texts.len(), 1), texts.to_vec())?)
    };
    tensor.context("Failed to create string tensor")
}

/// The fixed size of the second axis, if the graph declares one.
fn declared_width(dimensions: &[i64]) -> Option<usize> {
    dimensions
        .get(1)
        .and_then(|&d| usize::try_from(d).ok())
        .filter(|&d| d > 0)
}
