//! Customer Churn Predictor Library
//!
//! Encodes telecom customer attributes into the fixed feature layout of a
//! pre-trained churn model, scales them, and scores the churn probability.

pub mod app;
pub mod config;
pub mod feature_encoder;
pub mod form;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use feature_encoder::{FeatureEncoder, FeatureVector, FEATURE_COUNT};
pub use models::inference::{InferenceEngine, PredictionError};
pub use types::{CustomerProfile, Prediction, Verdict};
