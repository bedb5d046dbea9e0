//! Configuration management for the churn predictor

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Serialized classifier format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierFormat {
    /// Network exported to ONNX, run through ONNX Runtime
    Onnx,
    /// Dense layer weights exported as JSON
    Json,
}

impl ClassifierFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "onnx" => Some(ClassifierFormat::Onnx),
            "json" => Some(ClassifierFormat::Json),
            _ => None,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Fitted standard scaler exported as JSON
    pub scaler_path: String,
    /// Trained classifier (ONNX or JSON dense export)
    pub model_path: String,
    /// Classifier format; inferred from the extension when absent
    #[serde(default)]
    pub model_format: Option<ClassifierFormat>,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from a specific path
    ///
    /// Values are layered: built-in defaults, then the file (optional),
    /// then `CHURN_*` environment variables (`CHURN_ARTIFACTS__MODEL_PATH`).
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults = AppConfig::default();

        let config = Config::builder()
            .set_default("artifacts.scaler_path", defaults.artifacts.scaler_path)?
            .set_default("artifacts.model_path", defaults.artifacts.model_path)?
            .set_default("artifacts.onnx_threads", defaults.artifacts.onnx_threads as u64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("CHURN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig {
                scaler_path: "models/scaler.json".to_string(),
                model_path: "models/model_churn.onnx".to_string(),
                model_format: None,
                onnx_threads: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
