//! Churn inference engine: encode, scale, classify, threshold

use crate::config::AppConfig;
use crate::feature_encoder::{FeatureEncoder, FeatureVector};
use crate::models::classifier::{Classifier, ClassifierError};
use crate::models::loader::ModelLoader;
use crate::models::scaler::{Scaler, ScalerError};
use crate::types::prediction::Prediction;
use crate::types::profile::{CustomerProfile, InvalidAttributeError};
use anyhow::Result;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a prediction request could not produce a probability.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    InvalidAttribute(#[from] InvalidAttributeError),

    #[error("scaling failed: {0}")]
    Scaling(#[from] ScalerError),

    #[error("inference failed: {0}")]
    Inference(#[from] ClassifierError),

    /// The classifier returned a value that is not a probability.
    #[error("model returned {0}, expected a probability in [0, 1]")]
    InvalidOutput(f64),
}

/// Single-request inference pipeline over a loaded scaler and classifier
pub struct InferenceEngine {
    encoder: FeatureEncoder,
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl InferenceEngine {
    /// Load the artifacts named in configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let artifacts = &config.artifacts;
        let loader = ModelLoader::with_threads(artifacts.onnx_threads);

        let scaler = loader.load_scaler(&artifacts.scaler_path)?;
        let classifier = loader.load_classifier(&artifacts.model_path, artifacts.model_format)?;

        info!(
            model = %classifier.name(),
            scaler = %artifacts.scaler_path,
            "Inference engine initialized"
        );

        Ok(Self::with_components(Box::new(scaler), classifier))
    }

    /// Assemble an engine from already loaded components
    pub fn with_components(scaler: Box<dyn Scaler>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            scaler,
            classifier,
        }
    }

    /// Name of the underlying classifier
    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Encode a profile without running the model
    pub fn encode(&self, profile: &CustomerProfile) -> Result<FeatureVector, PredictionError> {
        Ok(self.encoder.encode(profile)?)
    }

    /// Run the full pipeline for one customer profile
    pub fn predict(&self, profile: &CustomerProfile) -> Result<Prediction, PredictionError> {
        let start_time = Instant::now();

        let features = self.encoder.encode(profile)?;
        let scaled = self.scaler.transform(&features)?;
        let probability = self.classifier.predict(&scaled)?;

        if !(0.0..=1.0).contains(&probability) {
            warn!(
                model = %self.classifier.name(),
                output = probability,
                "Model output is not a probability"
            );
            return Err(PredictionError::InvalidOutput(probability));
        }

        let prediction = Prediction::from_probability(probability);

        debug!(
            model = %self.classifier.name(),
            churn_probability = prediction.churn_probability,
            verdict = ?prediction.verdict,
            processing_time_us = start_time.elapsed().as_micros() as u64,
            "Prediction complete"
        );

        Ok(prediction)
    }
}
