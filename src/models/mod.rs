//! Scaling, classification and the inference pipeline

pub mod classifier;
pub mod inference;
pub mod loader;
pub mod scaler;

pub use classifier::{Classifier, ClassifierError, DenseClassifier, OnnxClassifier};
pub use inference::{InferenceEngine, PredictionError};
pub use loader::ModelLoader;
pub use scaler::{Scaler, ScalerError, StandardScaler};
