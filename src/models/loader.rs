//! Model artifact loading

use crate::config::ClassifierFormat;
use crate::feature_encoder::FEATURE_COUNT;
use crate::models::classifier::{Classifier, DenseClassifier, OnnxClassifier};
use crate::models::scaler::StandardScaler;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{info, warn};

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for the churn score
    pub output_name: String,
}

/// Loader for the scaler and classifier artifacts
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the fitted scaler
    pub fn load_scaler<P: AsRef<Path>>(&self, path: P) -> Result<StandardScaler> {
        let path = path.as_ref();
        StandardScaler::load(path)
            .with_context(|| format!("Failed to load scaler from {}", path.display()))
    }

    /// Load the classifier, picking the format from config or the file extension
    pub fn load_classifier<P: AsRef<Path>>(
        &self,
        path: P,
        format: Option<ClassifierFormat>,
    ) -> Result<Box<dyn Classifier>> {
        let path = path.as_ref();
        let format = match format {
            Some(format) => format,
            None => ClassifierFormat::from_path(path).with_context(|| {
                format!(
                    "Cannot infer model format from {}; set artifacts.model_format",
                    path.display()
                )
            })?,
        };

        match format {
            ClassifierFormat::Onnx => {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("onnx");
                let model = self.load_onnx_model(path, name)?;
                Ok(Box::new(OnnxClassifier::new(model)))
            }
            ClassifierFormat::Json => {
                let model = DenseClassifier::load(path)
                    .with_context(|| format!("Failed to load model from {}", path.display()))?;
                Ok(Box::new(model))
            }
        }
    }

    /// Load a single ONNX model from file
    pub fn load_onnx_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();

        // Initialize ONNX Runtime
        ort::init().commit()?;
        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {:?}", path))?;

        if session.inputs.len() != 1 {
            warn!(
                model = %name,
                inputs = session.inputs.len(),
                "Model declares more than one input, feeding the first"
            );
        }

        // Get input/output names
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .context("Model declares no inputs")?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .context("Model declares no outputs")?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            features = FEATURE_COUNT,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            output_name,
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}
