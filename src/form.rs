//! Interactive terminal form and result rendering.
//!
//! The form asks for the numeric attributes first (senior citizen, tenure,
//! monthly and total charges), then each list from gender to payment
//! method. An empty answer keeps the field's initial value
//! (zero for numbers, the first option for lists), and invalid answers are
//! asked again.

use crate::feature_encoder::FeatureVector;
use crate::models::inference::PredictionError;
use crate::types::prediction::Prediction;
use crate::types::profile::{Categorical, CustomerProfile, InvalidAttributeError};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

/// Error type for the interactive form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("input ended before {field} was answered")]
    Eof { field: &'static str },
}

/// Line-oriented prompt over any reader/writer pair.
pub struct Form<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Form<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Collect a full customer profile.
    pub fn prompt_profile(&mut self) -> Result<CustomerProfile, FormError> {
        writeln!(self.output, "Customer Churn Prediction")?;
        writeln!(
            self.output,
            "Predict whether a telecom customer is likely to churn."
        )?;
        writeln!(self.output)?;
        writeln!(self.output, "Customer Details")?;

        let senior_citizen = self.ask_number("Senior Citizen (0 or 1)", 0u8, |v| {
            if *v <= 1 {
                Ok(())
            } else {
                Err(InvalidAttributeError::NotBinary {
                    attribute: "seniorCitizen",
                    value: i64::from(*v),
                })
            }
        })?;
        let tenure_months = self.ask_number("Tenure (in months)", 0u32, |_| Ok(()))?;
        let monthly_charges =
            self.ask_number("Monthly Charges", 0.0f64, |v| non_negative("monthlyCharges", *v))?;
        let total_charges =
            self.ask_number("Total Charges", 0.0f64, |v| non_negative("totalCharges", *v))?;

        Ok(CustomerProfile {
            senior_citizen,
            tenure_months,
            monthly_charges,
            total_charges,
            gender: self.ask_choice("Gender", "gender")?,
            partner: self.ask_choice("Partner", "partner")?,
            dependents: self.ask_choice("Dependents", "dependents")?,
            phone_service: self.ask_choice("Phone Service", "phoneService")?,
            multiple_lines: self.ask_choice("Multiple Lines", "multipleLines")?,
            online_security: self.ask_choice("Online Security", "onlineSecurity")?,
            online_backup: self.ask_choice("Online Backup", "onlineBackup")?,
            device_protection: self.ask_choice("Device Protection", "deviceProtection")?,
            tech_support: self.ask_choice("Tech Support", "techSupport")?,
            streaming_tv: self.ask_choice("Streaming TV", "streamingTV")?,
            streaming_movies: self.ask_choice("Streaming Movies", "streamingMovies")?,
            paperless_billing: self.ask_choice("Paperless Billing", "paperlessBilling")?,
            internet_service: self.ask_choice("Internet Service", "internetService")?,
            contract_type: self.ask_choice("Contract Type", "contractType")?,
            payment_method: self.ask_choice("Payment Method", "paymentMethod")?,
        })
    }

    fn ask_number<T, F>(&mut self, label: &'static str, default: T, check: F) -> Result<T, FormError>
    where
        T: FromStr + std::fmt::Display + Copy,
        F: Fn(&T) -> Result<(), InvalidAttributeError>,
    {
        loop {
            let answer = self.ask(label, label, &default.to_string())?;
            if answer.is_empty() {
                return Ok(default);
            }

            match answer.parse::<T>() {
                Ok(value) => match check(&value) {
                    Ok(()) => return Ok(value),
                    Err(e) => writeln!(self.output, "  {e}")?,
                },
                Err(_) => writeln!(self.output, "  {answer:?} is not a valid number")?,
            }
        }
    }

    fn ask_choice<C: Categorical>(
        &mut self,
        label: &'static str,
        attribute: &'static str,
    ) -> Result<C, FormError> {
        let options = C::options();
        let listing = options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}) {}", i + 1, option.label()))
            .collect::<Vec<_>>()
            .join("  ");
        let prompt = format!("{label} [{listing}]");

        loop {
            let answer = self.ask(label, &prompt, options[0].label())?;
            if answer.is_empty() {
                return Ok(options[0]);
            }

            if let Ok(number) = answer.parse::<usize>() {
                match number.checked_sub(1).and_then(|i| options.get(i)) {
                    Some(option) => return Ok(*option),
                    None => {
                        writeln!(self.output, "  choose 1-{}", options.len())?;
                        continue;
                    }
                }
            }

            match C::parse_for(attribute, &answer) {
                Ok(option) => return Ok(option),
                Err(e) => writeln!(self.output, "  {e}")?,
            }
        }
    }

    fn ask(
        &mut self,
        field: &'static str,
        prompt: &str,
        default: &str,
    ) -> Result<String, FormError> {
        write!(self.output, "{prompt} ({default}): ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(FormError::Eof { field });
        }
        Ok(line.trim().to_string())
    }
}

fn non_negative(attribute: &'static str, value: f64) -> Result<(), InvalidAttributeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidAttributeError::OutOfRange { attribute, value })
    }
}

/// Print a prediction, or the reason it failed.
pub fn render<W: Write>(out: &mut W, result: &Result<Prediction, PredictionError>) -> io::Result<()> {
    match result {
        Ok(prediction) => {
            writeln!(out, "Probability of Churn: {}", prediction.percentage())?;
            writeln!(out, "{}", prediction.verdict.message())
        }
        Err(e) => writeln!(out, "Error during prediction: {e}"),
    }
}

/// Print the encoded feature layout, one numbered column per line.
pub fn render_features<W: Write>(out: &mut W, features: &FeatureVector) -> io::Result<()> {
    for (position, (name, value)) in features.named().enumerate() {
        writeln!(out, "{:>2}. {:<42} {}", position + 1, name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classifier::ClassifierError;
    use crate::types::profile::{ContractType, Gender, InternetService, PaymentMethod, YesNo};
    use std::io::Cursor;

    fn run_form(answers: &str) -> (Result<CustomerProfile, FormError>, String) {
        let mut output = Vec::new();
        let result = Form::new(Cursor::new(answers.as_bytes()), &mut output).prompt_profile();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_blank_answers_keep_defaults() {
        let (result, _) = run_form(&"\n".repeat(19));
        assert_eq!(result.unwrap(), CustomerProfile::default());
    }

    #[test]
    fn test_labels_and_numbers_accepted() {
        let answers = [
            "0", "5", "70.5", "352.5", // numbers
            "Female", "Yes", "No", "2", "No", "No", "Yes", "No", "No", "No", "No", "Yes",
            "Fiber optic", "1", "3",
        ]
        .join("\n");

        let (result, _) = run_form(&answers);
        let profile = result.unwrap();

        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.partner, YesNo::Yes);
        assert_eq!(profile.phone_service, YesNo::Yes);
        assert_eq!(profile.tenure_months, 5);
        assert_eq!(profile.total_charges, 352.5);
        assert_eq!(profile.internet_service, InternetService::FiberOptic);
        assert_eq!(profile.contract_type, ContractType::MonthToMonth);
        assert_eq!(profile.payment_method, PaymentMethod::ElectronicCheck);
    }

    #[test]
    fn test_invalid_answers_are_asked_again() {
        let mut answers = vec!["2", "1", "-3", "abc", "", "", "", "Other", "Female"];
        answers.extend(std::iter::repeat("").take(14));

        let (result, transcript) = run_form(&(answers.join("\n") + "\n"));
        let profile = result.unwrap();

        assert_eq!(profile.senior_citizen, 1);
        assert_eq!(profile.tenure_months, 0);
        assert_eq!(profile.gender, Gender::Female);
        assert!(transcript.contains("seniorCitizen must be 0 or 1"));
        assert!(transcript.contains("\"abc\" is not a valid number"));
        assert!(transcript.contains("invalid value \"Other\" for gender"));
    }

    #[test]
    fn test_option_number_out_of_range() {
        let mut answers = vec!["", "", "", "", "3", "2"];
        answers.extend(std::iter::repeat("").take(14));

        let (result, transcript) = run_form(&(answers.join("\n") + "\n"));
        assert_eq!(result.unwrap().gender, Gender::Female);
        assert!(transcript.contains("choose 1-2"));
    }

    #[test]
    fn test_eof_names_field() {
        let (result, _) = run_form("0\n3\n");
        match result {
            Err(FormError::Eof { field }) => assert_eq!(field, "Monthly Charges"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_render_prediction() {
        let mut out = Vec::new();
        render(&mut out, &Ok(Prediction::from_probability(0.7312))).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Probability of Churn: 73.12%\nCustomer is likely to churn.\n"
        );

        let mut out = Vec::new();
        render(&mut out, &Ok(Prediction::from_probability(0.5))).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .ends_with("Customer is likely to stay.\n"));
    }

    #[test]
    fn test_render_error() {
        let mut out = Vec::new();
        let err = PredictionError::Inference(ClassifierError::Runtime("boom".to_string()));
        render(&mut out, &Err(err)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error during prediction: inference failed: inference runtime error: boom\n"
        );
    }
}
