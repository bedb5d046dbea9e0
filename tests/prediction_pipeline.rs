//! End-to-end prediction over JSON artifacts written to a temp directory

use churn_predictor::config::{AppConfig, ArtifactsConfig, ClassifierFormat, LoggingConfig};
use churn_predictor::feature_encoder::{FEATURE_COUNT, FEATURE_NAMES};
use churn_predictor::form;
use churn_predictor::models::{InferenceEngine, PredictionError};
use churn_predictor::types::{CustomerProfile, Verdict};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const REFERENCE_PROFILE: &str = r#"{
    "gender": "Female",
    "seniorCitizen": 0,
    "partner": "Yes",
    "dependents": "No",
    "tenureMonths": 5,
    "phoneService": "Yes",
    "multipleLines": "No",
    "onlineSecurity": "No",
    "onlineBackup": "Yes",
    "deviceProtection": "No",
    "techSupport": "No",
    "streamingTV": "No",
    "streamingMovies": "No",
    "paperlessBilling": "Yes",
    "monthlyCharges": 70.5,
    "totalCharges": 352.5,
    "internetService": "Fiber optic",
    "contractType": "Month-to-month",
    "paymentMethod": "Electronic check"
}"#;

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

/// Logistic model: sigmoid(w . x + b)
fn build_engine(dir: &TempDir, weights: Vec<f64>, bias: f64) -> InferenceEngine {
    let scaler_path = write_json(
        dir.path(),
        "scaler.json",
        json!({
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
            "feature_names": FEATURE_NAMES,
        }),
    );
    let model_path = write_json(
        dir.path(),
        "model.json",
        json!({
            "name": "logistic",
            "layers": [{ "weights": [weights], "bias": [bias], "activation": "sigmoid" }]
        }),
    );

    let config = AppConfig {
        artifacts: ArtifactsConfig {
            scaler_path,
            model_path,
            model_format: Some(ClassifierFormat::Json),
            onnx_threads: 1,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    };
    InferenceEngine::new(&config).unwrap()
}

fn reference_profile() -> CustomerProfile {
    serde_json::from_str(REFERENCE_PROFILE).unwrap()
}

#[test]
fn reference_profile_encodes_to_documented_vector() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, vec![0.0; FEATURE_COUNT], 0.0);

    let features = engine.encode(&reference_profile()).unwrap();
    let expected: [f64; FEATURE_COUNT] = [
        1.0, 0.0, 1.0, 0.0, 5.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 70.5, 352.5, 0.0,
        1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
    ];
    assert_eq!(features.values(), &expected);
}

#[test]
fn zero_logit_is_exactly_half_and_stays() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, vec![0.0; FEATURE_COUNT], 0.0);

    let prediction = engine.predict(&reference_profile()).unwrap();
    assert_eq!(prediction.churn_probability, 0.5);
    assert_eq!(prediction.verdict, Verdict::LikelyToStay);

    let mut out = Vec::new();
    form::render(&mut out, &Ok(prediction)).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Probability of Churn: 50.00%\nCustomer is likely to stay.\n"
    );
}

#[test]
fn fiber_month_to_month_customer_churns() {
    let mut weights = vec![0.0; FEATURE_COUNT];
    weights[17] = 2.0; // InternetService_Fiber optic
    weights[19] = 1.5; // Contract_Month-to-month
    weights[4] = -0.1; // tenure

    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, weights, -1.0);

    // logit = 2.0 + 1.5 - 0.5 - 1.0 = 2.0
    let prediction = engine.predict(&reference_profile()).unwrap();
    let expected = 1.0 / (1.0 + (-2.0f64).exp());
    assert!((prediction.churn_probability - expected).abs() < 1e-9);
    assert_eq!(prediction.verdict, Verdict::LikelyToChurn);

    let loyal = CustomerProfile {
        tenure_months: 60,
        ..reference_profile()
    };
    assert_eq!(engine.predict(&loyal).unwrap().verdict, Verdict::LikelyToStay);
}

#[test]
fn invalid_profile_is_rendered_not_raised() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir, vec![0.0; FEATURE_COUNT], 0.0);

    let profile = CustomerProfile {
        senior_citizen: 4,
        ..reference_profile()
    };
    let result = engine.predict(&profile);
    assert!(matches!(result, Err(PredictionError::InvalidAttribute(_))));

    let mut out = Vec::new();
    form::render(&mut out, &result).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Error during prediction: seniorCitizen must be 0 or 1, got 4\n"
    );
}

#[test]
fn scaler_with_wrong_column_order_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
    names.swap(16, 17);

    let scaler_path = write_json(
        dir.path(),
        "scaler.json",
        json!({
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
            "feature_names": names,
        }),
    );
    let config = AppConfig {
        artifacts: ArtifactsConfig {
            scaler_path,
            ..AppConfig::default().artifacts
        },
        ..AppConfig::default()
    };

    let err = InferenceEngine::new(&config).err().unwrap();
    let chain = format!("{err:#}");
    assert!(chain.contains("Failed to load scaler"));
    assert!(chain.contains("InternetService_DSL"));
}
