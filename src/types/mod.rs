//! Type definitions for the churn predictor

pub mod prediction;
pub mod profile;

pub use prediction::{Prediction, PredictionReport, Verdict, CHURN_THRESHOLD};
pub use profile::{
    ContractType, CustomerProfile, Gender, InternetService, InvalidAttributeError, PaymentMethod,
    YesNo,
};
