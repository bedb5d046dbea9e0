//! One prediction request, from profile input to rendered output.

use crate::form;
use crate::models::inference::InferenceEngine;
use crate::types::{CustomerProfile, PredictionReport};
use anyhow::{Context, Result};
use std::io::{Read, Write};
use tracing::error;

/// How the result is printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Print a JSON report instead of the text lines
    pub json: bool,
    /// Print the encoded features before the result
    pub show_features: bool,
}

/// Read a JSON customer profile.
pub fn read_profile<R: Read>(mut reader: R) -> Result<CustomerProfile> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .context("Failed to read customer profile")?;

    serde_json::from_str(&raw).context("Failed to parse customer profile")
}

/// Predict and print the outcome.
///
/// A failed prediction is printed, not returned; only output errors fail.
pub fn run_prediction<W: Write>(
    engine: &InferenceEngine,
    profile: &CustomerProfile,
    request_id: &str,
    options: OutputOptions,
    out: &mut W,
) -> Result<()> {
    if options.show_features {
        match engine.encode(profile) {
            Ok(features) => form::render_features(out, &features)?,
            Err(e) => writeln!(out, "Features unavailable: {e}")?,
        }
    }

    let result = engine.predict(profile);
    if let Err(e) = &result {
        error!(error = %e, "Prediction failed");
    }

    if options.json {
        let body = match &result {
            Ok(prediction) => serde_json::to_value(PredictionReport::new(
                request_id.to_string(),
                engine.model_name(),
                prediction,
            ))?,
            Err(e) => serde_json::json!({
                "request_id": request_id,
                "error": e.to_string(),
            }),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        writeln!(out)?;
        form::render(out, &result)?;
    }

    Ok(())
}
