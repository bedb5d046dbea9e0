//! Feature scaling applied before classification

use crate::feature_encoder::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Error type for scaler loading and transformation.
#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("failed to read scaler artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scaler artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// A parameter array does not match the feature layout.
    #[error("scaler {field} has {actual} values, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The artifact was fitted on a different column order.
    #[error("scaler column {index} is {found:?}, expected {expected:?}")]
    ColumnMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("scaler {field}[{index}] is not a finite number")]
    InvalidParameter { field: &'static str, index: usize },

    #[error("scaled feature {name} is not finite")]
    NonFinite { name: &'static str },
}

/// A previously fitted numeric transform applied to raw features.
pub trait Scaler: Send + Sync {
    fn transform(&self, features: &FeatureVector) -> Result<FeatureVector, ScalerError>;
}

/// On-disk form of a fitted standard scaler.
///
/// Field names follow the scikit-learn attributes (`mean_`, `scale_`) so an
/// export can be written straight from the fitted object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScalerArtifact {
    #[serde(alias = "mean_")]
    pub mean: Vec<f64>,
    #[serde(alias = "scale_")]
    pub scale: Vec<f64>,
    #[serde(default, alias = "feature_names_in_", skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

/// Standardization: `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Build a scaler from per-column parameters.
    ///
    /// A zero scale leaves the centred column unscaled, as scikit-learn does
    /// for constant features.
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Result<Self, ScalerError> {
        check_finite("mean", &mean)?;
        check_finite("scale", &scale)?;

        let scale = scale.map(|s| if s == 0.0 { 1.0 } else { s });
        Ok(Self { mean, scale })
    }

    /// Scaler that returns its input unchanged.
    pub fn identity() -> Self {
        Self {
            mean: [0.0; FEATURE_COUNT],
            scale: [1.0; FEATURE_COUNT],
        }
    }

    /// Validate an artifact against the encoder layout and build the scaler.
    pub fn from_artifact(artifact: StandardScalerArtifact) -> Result<Self, ScalerError> {
        if let Some(names) = &artifact.feature_names {
            if names.len() != FEATURE_COUNT {
                return Err(ScalerError::ShapeMismatch {
                    field: "feature_names",
                    expected: FEATURE_COUNT,
                    actual: names.len(),
                });
            }
            for (index, (found, expected)) in names.iter().zip(FEATURE_NAMES).enumerate() {
                if found != expected {
                    return Err(ScalerError::ColumnMismatch {
                        index,
                        expected,
                        found: found.clone(),
                    });
                }
            }
        }

        let mean = to_columns("mean", artifact.mean)?;
        let scale = to_columns("scale", artifact.scale)?;
        Self::new(mean, scale)
    }

    /// Load a scaler exported as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScalerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let artifact: StandardScalerArtifact = serde_json::from_str(&raw)?;
        let named = artifact.feature_names.is_some();

        let scaler = Self::from_artifact(artifact)?;
        info!(
            path = %path.display(),
            features = FEATURE_COUNT,
            column_names_checked = named,
            "Standard scaler loaded"
        );
        Ok(scaler)
    }

    pub fn scale(&self) -> &[f64; FEATURE_COUNT] {
        &self.scale
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, features: &FeatureVector) -> Result<FeatureVector, ScalerError> {
        let mut scaled = [0.0f64; FEATURE_COUNT];

        for (index, (out, &value)) in scaled.iter_mut().zip(features.values()).enumerate() {
            let z = (value - self.mean[index]) / self.scale[index];
            if !z.is_finite() {
                return Err(ScalerError::NonFinite {
                    name: FEATURE_NAMES[index],
                });
            }
            *out = z;
        }

        Ok(FeatureVector::new(scaled))
    }
}

fn to_columns(field: &'static str, values: Vec<f64>) -> Result<[f64; FEATURE_COUNT], ScalerError> {
    let actual = values.len();
    values.try_into().map_err(|_| ScalerError::ShapeMismatch {
        field,
        expected: FEATURE_COUNT,
        actual,
    })
}

fn check_finite(field: &'static str, values: &[f64]) -> Result<(), ScalerError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ScalerError::InvalidParameter { field, index }),
        None => Ok(()),
    }
}
