//! Prediction outcome data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability above which a customer is reported as likely to churn.
///
/// The comparison is strict: exactly 0.5 is a "stay".
pub const CHURN_THRESHOLD: f64 = 0.5;

/// Binary churn verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    LikelyToChurn,
    LikelyToStay,
}

impl Verdict {
    /// Classify a churn probability against [`CHURN_THRESHOLD`]
    pub fn from_probability(probability: f64) -> Self {
        if probability > CHURN_THRESHOLD {
            Verdict::LikelyToChurn
        } else {
            Verdict::LikelyToStay
        }
    }

    /// User-facing verdict message
    pub fn message(self) -> &'static str {
        match self {
            Verdict::LikelyToChurn => "Customer is likely to churn.",
            Verdict::LikelyToStay => "Customer is likely to stay.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classifier output for one customer profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Churn probability (0.0 - 1.0)
    pub churn_probability: f64,
    /// Thresholded verdict
    pub verdict: Verdict,
}

impl Prediction {
    /// Wrap a probability with its verdict
    pub fn from_probability(churn_probability: f64) -> Self {
        Self {
            churn_probability,
            verdict: Verdict::from_probability(churn_probability),
        }
    }

    /// Probability as a percentage with two decimals, e.g. `"12.34%"`
    pub fn percentage(&self) -> String {
        format!("{:.2}%", self.churn_probability * 100.0)
    }
}

/// Machine-readable record of a single prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Request identifier, also attached to log lines
    pub request_id: String,
    /// Name of the classifier that produced the score
    pub model: String,
    /// Churn probability (0.0 - 1.0)
    pub churn_probability: f64,
    /// Thresholded verdict
    pub verdict: Verdict,
    /// Report generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl PredictionReport {
    /// Create a report for a finished prediction
    pub fn new(request_id: String, model: &str, prediction: &Prediction) -> Self {
        Self {
            request_id,
            model: model.to_string(),
            churn_probability: prediction.churn_probability,
            verdict: prediction.verdict,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_probability() {
        assert_eq!(Verdict::from_probability(0.1), Verdict::LikelyToStay);
        assert_eq!(Verdict::from_probability(0.5), Verdict::LikelyToStay);
        assert_eq!(Verdict::from_probability(0.500_001), Verdict::LikelyToChurn);
        assert_eq!(Verdict::from_probability(1.0), Verdict::LikelyToChurn);
    }

    #[test]
    fn test_percentage_format() {
        assert_eq!(Prediction::from_probability(0.1234).percentage(), "12.34%");
        assert_eq!(Prediction::from_probability(1.0).percentage(), "100.00%");
        assert_eq!(Prediction::from_probability(0.0).percentage(), "0.00%");
    }

    #[test]
    fn test_report_serialization() {
        let prediction = Prediction::from_probability(0.82);
        let report = PredictionReport::new("req_1".to_string(), "dense", &prediction);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["verdict"], "likely_to_churn");
        assert_eq!(json["model"], "dense");
        assert_eq!(json["churn_probability"], 0.82);
    }
}
