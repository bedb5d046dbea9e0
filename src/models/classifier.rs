//! Binary churn classifiers

use crate::feature_encoder::{FeatureVector, FEATURE_COUNT};
use crate::models::loader::LoadedModel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Error type for classifier loading and inference.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// The artifact does not describe a 26-input, 1-output network.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Failure reported by the inference runtime.
    #[error("inference runtime error: {0}")]
    Runtime(String),

    /// The model produced something other than a single score.
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// A trained model mapping a scaled feature vector to a churn probability.
pub trait Classifier: Send + Sync {
    /// Model name for logs and reports
    fn name(&self) -> &str;

    /// Score a single scaled feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64, ClassifierError>;
}

/// Element-wise activation of a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    #[default]
    Linear,
}

impl Activation {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }
}

/// Fully connected layer with weights stored as `[out][in]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn in_features(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn out_features(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                let z: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// On-disk form of a feed-forward network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseModelArtifact {
    #[serde(default = "default_dense_name")]
    pub name: String,
    pub layers: Vec<DenseLayer>,
}

fn default_dense_name() -> String {
    "dense".to_string()
}

/// Feed-forward network evaluated in process from a JSON weight export.
#[derive(Debug, Clone)]
pub struct DenseClassifier {
    name: String,
    layers: Vec<DenseLayer>,
}

impl DenseClassifier {
    /// Check layer shapes and build the classifier.
    pub fn from_artifact(artifact: DenseModelArtifact) -> Result<Self, ClassifierError> {
        if artifact.layers.is_empty() {
            return Err(ClassifierError::InvalidModel("network has no layers".into()));
        }

        let mut width = FEATURE_COUNT;
        for (index, layer) in artifact.layers.iter().enumerate() {
            if layer.out_features() == 0 {
                return Err(ClassifierError::InvalidModel(format!(
                    "layer {index} has no units"
                )));
            }
            if layer.bias.len() != layer.out_features() {
                return Err(ClassifierError::InvalidModel(format!(
                    "layer {index} has {} units but {} biases",
                    layer.out_features(),
                    layer.bias.len()
                )));
            }
            if let Some(row) = layer.weights.iter().position(|row| row.len() != width) {
                return Err(ClassifierError::InvalidModel(format!(
                    "layer {index} row {row} expects {} inputs, previous width is {width}",
                    layer.weights[row].len()
                )));
            }
            let finite = layer.weights.iter().flatten().chain(&layer.bias).all(|v| v.is_finite());
            if !finite {
                return Err(ClassifierError::InvalidModel(format!(
                    "layer {index} has non-finite parameters"
                )));
            }
            width = layer.out_features();
        }

        if width != 1 {
            return Err(ClassifierError::InvalidModel(format!(
                "network must end in a single unit, got {width}"
            )));
        }

        Ok(Self {
            name: artifact.name,
            layers: artifact.layers,
        })
    }

    /// Load a network exported as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let classifier = Self::from_artifact(serde_json::from_str(&raw)?)?;

        info!(
            model = %classifier.name,
            path = %path.display(),
            layers = classifier.layers.len(),
            input = classifier.layers[0].in_features(),
            "Dense model loaded"
        );
        Ok(classifier)
    }
}

impl Classifier for DenseClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        let input = features.as_slice().to_vec();
        let output = self
            .layers
            .iter()
            .fold(input, |activations, layer| layer.forward(&activations));

        match output.as_slice() {
            [score] => Ok(*score),
            other => Err(ClassifierError::Output(format!(
                "expected 1 value, got {}",
                other.len()
            ))),
        }
    }
}

/// Network exported to ONNX and run through ONNX Runtime.
pub struct OnnxClassifier {
    /// ONNX session; `run` needs exclusive access
    model: Mutex<LoadedModel>,
    name: String,
}

impl OnnxClassifier {
    pub fn new(model: LoadedModel) -> Self {
        let name = model.name.clone();
        Self {
            model: Mutex::new(model),
            name,
        }
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        use ort::value::Tensor;

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, FEATURE_COUNT as i64];
        // Exported graph takes float32; scaling already ran in f64
        let values: Vec<f32> = features.as_slice().iter().map(|&v| v as f32).collect();
        let input_tensor = Tensor::from_array((shape, values))
            .map_err(|e| ClassifierError::Runtime(format!("failed to create input tensor: {e}")))?;

        let mut model = self
            .model
            .lock()
            .map_err(|e| ClassifierError::Runtime(format!("session lock poisoned: {e}")))?;
        let LoadedModel {
            session,
            input_name,
            output_name,
            ..
        } = &mut *model;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_tensor])
            .map_err(|e| ClassifierError::Runtime(e.to_string()))?;

        let output = outputs
            .get(output_name.as_str())
            .ok_or_else(|| ClassifierError::Output(format!("missing output {output_name:?}")))?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Output(e.to_string()))?;
        let dims: Vec<i64> = shape.iter().copied().collect();

        let score = probability_from_tensor(&dims, data)?;
        debug!(model = %self.name, score = score, "Extracted from tensor");
        Ok(score)
    }
}

/// Pick the churn probability out of a classifier output tensor.
///
/// Accepts a single sigmoid unit (`[1, 1]` or `[1]`) or per-class
/// probabilities (`[1, 2]` or `[2]`), where class 1 is churn.
pub(crate) fn probability_from_tensor(dims: &[i64], data: &[f32]) -> Result<f64, ClassifierError> {
    let classes = match dims {
        [1, classes] | [classes] => *classes,
        other => {
            return Err(ClassifierError::Output(format!(
                "unsupported output shape {other:?}"
            )))
        }
    };

    let index = match classes {
        1 => 0,
        2 => 1,
        n => {
            return Err(ClassifierError::Output(format!(
                "expected 1 or 2 output classes, got {n}"
            )))
        }
    };

    data.get(index)
        .map(|&p| f64::from(p))
        .ok_or_else(|| ClassifierError::Output(format!("output has only {} values", data.len())))
}
