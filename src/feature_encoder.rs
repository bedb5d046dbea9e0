//! Feature encoding for churn model inference.
//!
//! This module turns a customer profile into the exact numeric layout
//! the scaler and classifier were fitted on. Binding is positional only,
//! so the order here must never change.

use crate::types::profile::{CustomerProfile, InvalidAttributeError};
use serde::Serialize;
use std::ops::Index;

/// Number of model input features.
pub const FEATURE_COUNT: usize = 26;

/// Training column names, in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // Demographics and account (5)
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    // Services (9)
    "PhoneService",
    "MultipleLines",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "PaperlessBilling",
    // Charges (2)
    "MonthlyCharges",
    "TotalCharges",
    // One-hot groups (3 + 3 + 4)
    "InternetService_DSL",
    "InternetService_Fiber optic",
    "InternetService_No",
    "Contract_Month-to-month",
    "Contract_One year",
    "Contract_Two year",
    "PaymentMethod_Bank transfer (automatic)",
    "PaymentMethod_Credit card (automatic)",
    "PaymentMethod_Electronic check",
    "PaymentMethod_Mailed check",
];

/// Fixed-length model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Pairs of (column name, value) in layout order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Encoder that transforms customer profiles into model input features.
///
/// Matches the preprocessing done when the model was trained.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode a profile into the 26-value model layout.
    ///
    /// Fails only when a numeric attribute is outside its domain.
    pub fn encode(&self, profile: &CustomerProfile) -> Result<FeatureVector, InvalidAttributeError> {
        profile.validate()?;

        let [dsl, fiber_optic, no_internet] = profile.internet_service.one_hot();
        let [month_to_month, one_year, two_year] = profile.contract_type.one_hot();
        let [bank_transfer, credit_card, electronic_check, mailed_check] =
            profile.payment_method.one_hot();

        Ok(FeatureVector([
            profile.gender.code(),
            f64::from(profile.senior_citizen),
            profile.partner.code(),
            profile.dependents.code(),
            f64::from(profile.tenure_months),
            profile.phone_service.code(),
            profile.multiple_lines.code(),
            profile.online_security.code(),
            profile.online_backup.code(),
            profile.device_protection.code(),
            profile.tech_support.code(),
            profile.streaming_tv.code(),
            profile.streaming_movies.code(),
            profile.paperless_billing.code(),
            profile.monthly_charges,
            profile.total_charges,
            dsl,
            fiber_optic,
            no_internet,
            month_to_month,
            one_year,
            two_year,
            bank_transfer,
            credit_card,
            electronic_check,
            mailed_check,
        ]))
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names (matching training column order).
    pub fn feature_names(&self) -> &'static [&'static str; FEATURE_COUNT] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}
