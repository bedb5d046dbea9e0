//! Customer profile data structures for churn prediction

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when an attribute value falls outside its fixed domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAttributeError {
    /// A categorical label that is not one of the enumerated options.
    #[error("invalid value {value:?} for {attribute}: expected one of {expected}")]
    UnknownCategory {
        attribute: &'static str,
        value: String,
        expected: String,
    },

    /// A 0/1 flag holding something else.
    #[error("{attribute} must be 0 or 1, got {value}")]
    NotBinary { attribute: &'static str, value: i64 },

    /// A numeric amount that is negative, NaN or infinite.
    #[error("{attribute} must be a non-negative finite number, got {value}")]
    OutOfRange { attribute: &'static str, value: f64 },
}

/// A closed set of labelled options.
pub trait Categorical: Copy + Eq + 'static {
    /// Attribute name used in error messages
    const ATTRIBUTE: &'static str;

    /// Every option, in form order
    fn options() -> &'static [Self];

    fn label(self) -> &'static str;

    fn parse_for(attribute: &'static str, value: &str) -> Result<Self, InvalidAttributeError>;
}

/// Declares a closed set of labelled options.
///
/// Each variant round-trips through its display label, which is exactly the
/// string the input form offers and the training data used.
macro_rules! categorical {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($attribute:literal) {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Number of options.
            pub const COUNT: usize = [$($label),+].len();

            /// Every option, in form (and one-hot) order.
            pub const ALL: [Self; Self::COUNT] = [$(Self::$variant),+];

            /// Display label of this option.
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Position of this option within [`Self::ALL`].
            pub fn index(self) -> usize {
                Self::ALL
                    .iter()
                    .position(|&option| option == self)
                    .unwrap_or_default()
            }

            /// Indicator group with a single 1.0 at this option's position.
            pub fn one_hot(self) -> [f64; Self::COUNT] {
                Self::ALL.map(|option| if option == self { 1.0 } else { 0.0 })
            }
        }

        impl Categorical for $name {
            const ATTRIBUTE: &'static str = $attribute;

            fn options() -> &'static [Self] {
                &Self::ALL
            }

            fn label(self) -> &'static str {
                $name::label(self)
            }

            fn parse_for(
                attribute: &'static str,
                value: &str,
            ) -> Result<Self, InvalidAttributeError> {
                match value {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(InvalidAttributeError::UnknownCategory {
                        attribute,
                        value: value.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|option| format!("{:?}", option.label()))
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }

        impl FromStr for $name {
            type Err = InvalidAttributeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as Categorical>::parse_for(<Self as Categorical>::ATTRIBUTE, s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidAttributeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.label()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

categorical! {
    /// Customer gender
    pub enum Gender ("gender") {
        Male => "Male",
        Female => "Female",
    }
}

categorical! {
    /// Answer to a yes/no service question
    pub enum YesNo ("yes/no attribute") {
        No => "No",
        Yes => "Yes",
    }
}

categorical! {
    /// Internet service subscription
    pub enum InternetService ("internetService") {
        Dsl => "DSL",
        FiberOptic => "Fiber optic",
        No => "No",
    }
}

categorical! {
    /// Contract term
    pub enum ContractType ("contractType") {
        MonthToMonth => "Month-to-month",
        OneYear => "One year",
        TwoYear => "Two year",
    }
}

categorical! {
    /// Billing payment method
    pub enum PaymentMethod ("paymentMethod") {
        BankTransfer => "Bank transfer (automatic)",
        CreditCard => "Credit card (automatic)",
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
    }
}

impl Gender {
    /// Model input code: Male = 0, Female = 1.
    pub fn code(self) -> f64 {
        match self {
            Gender::Male => 0.0,
            Gender::Female => 1.0,
        }
    }
}

impl YesNo {
    /// Model input code: No = 0, Yes = 1.
    pub fn code(self) -> f64 {
        match self {
            YesNo::No => 0.0,
            YesNo::Yes => 1.0,
        }
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

/// Yes/no fields share one type, so each gets a deserializer that names
/// the field in its error.
macro_rules! yes_no_fields {
    ($($field:ident => $attribute:literal),+ $(,)?) => {
        mod yes_no {
            use super::*;

            $(
                pub(super) fn $field<'de, D>(deserializer: D) -> Result<YesNo, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    let value = String::deserialize(deserializer)?;
                    YesNo::parse_for($attribute, &value).map_err(serde::de::Error::custom)
                }
            )+
        }
    };
}

yes_no_fields! {
    partner => "partner",
    dependents => "dependents",
    phone_service => "phoneService",
    multiple_lines => "multipleLines",
    online_security => "onlineSecurity",
    online_backup => "onlineBackup",
    device_protection => "deviceProtection",
    tech_support => "techSupport",
    streaming_tv => "streamingTV",
    streaming_movies => "streamingMovies",
    paperless_billing => "paperlessBilling",
}

/// Attributes of a single telecom customer, collected per prediction request.
///
/// Field names accept both the camelCase form and the original dataset
/// column names (`SeniorCitizen`, `tenure`, `Contract`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub gender: Gender,

    /// 0 or 1
    #[serde(alias = "SeniorCitizen")]
    pub senior_citizen: u8,

    #[serde(alias = "Partner", deserialize_with = "yes_no::partner")]
    pub partner: YesNo,

    #[serde(alias = "Dependents", deserialize_with = "yes_no::dependents")]
    pub dependents: YesNo,

    /// Months with the company
    #[serde(alias = "tenure")]
    pub tenure_months: u32,

    #[serde(alias = "PhoneService", deserialize_with = "yes_no::phone_service")]
    pub phone_service: YesNo,

    #[serde(alias = "MultipleLines", deserialize_with = "yes_no::multiple_lines")]
    pub multiple_lines: YesNo,

    #[serde(alias = "OnlineSecurity", deserialize_with = "yes_no::online_security")]
    pub online_security: YesNo,

    #[serde(alias = "OnlineBackup", deserialize_with = "yes_no::online_backup")]
    pub online_backup: YesNo,

    #[serde(alias = "DeviceProtection", deserialize_with = "yes_no::device_protection")]
    pub device_protection: YesNo,

    #[serde(alias = "TechSupport", deserialize_with = "yes_no::tech_support")]
    pub tech_support: YesNo,

    #[serde(rename = "streamingTV", alias = "StreamingTV", deserialize_with = "yes_no::streaming_tv")]
    pub streaming_tv: YesNo,

    #[serde(alias = "StreamingMovies", deserialize_with = "yes_no::streaming_movies")]
    pub streaming_movies: YesNo,

    #[serde(alias = "PaperlessBilling", deserialize_with = "yes_no::paperless_billing")]
    pub paperless_billing: YesNo,

    #[serde(alias = "MonthlyCharges")]
    pub monthly_charges: f64,

    #[serde(alias = "TotalCharges")]
    pub total_charges: f64,

    #[serde(alias = "InternetService")]
    pub internet_service: InternetService,

    #[serde(alias = "Contract")]
    pub contract_type: ContractType,

    #[serde(alias = "PaymentMethod")]
    pub payment_method: PaymentMethod,
}

impl CustomerProfile {
    /// Check the numeric attributes the type system cannot restrict.
    pub fn validate(&self) -> Result<(), InvalidAttributeError> {
        if self.senior_citizen > 1 {
            return Err(InvalidAttributeError::NotBinary {
                attribute: "seniorCitizen",
                value: i64::from(self.senior_citizen),
            });
        }

        for (attribute, value) in [
            ("monthlyCharges", self.monthly_charges),
            ("totalCharges", self.total_charges),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidAttributeError::OutOfRange { attribute, value });
            }
        }

        Ok(())
    }
}

impl Default for CustomerProfile {
    /// The form's initial selection: zeros and the first option of every list.
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            senior_citizen: 0,
            partner: YesNo::No,
            dependents: YesNo::No,
            tenure_months: 0,
            phone_service: YesNo::No,
            multiple_lines: YesNo::No,
            online_security: YesNo::No,
            online_backup: YesNo::No,
            device_protection: YesNo::No,
            tech_support: YesNo::No,
            streaming_tv: YesNo::No,
            streaming_movies: YesNo::No,
            paperless_billing: YesNo::No,
            monthly_charges: 0.0,
            total_charges: 0.0,
            internet_service: InternetService::Dsl,
            contract_type: ContractType::MonthToMonth,
            payment_method: PaymentMethod::BankTransfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.label().parse::<PaymentMethod>().unwrap(), method);
        }
        assert_eq!(
            "Fiber optic".parse::<InternetService>().unwrap(),
            InternetService::FiberOptic
        );
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "fiber optic".parse::<InternetService>().unwrap_err();
        match err {
            InvalidAttributeError::UnknownCategory {
                attribute, value, ..
            } => {
                assert_eq!(attribute, "internetService");
                assert_eq!(value, "fiber optic");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_one_hot_positions() {
        assert_eq!(ContractType::OneYear.one_hot(), [0.0, 1.0, 0.0]);
        assert_eq!(PaymentMethod::MailedCheck.one_hot(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(PaymentMethod::MailedCheck.index(), 3);
    }

    #[test]
    fn test_profile_deserializes_dataset_columns() {
        let json = r#"{
            "gender": "Female", "SeniorCitizen": 1, "Partner": "Yes", "Dependents": "No",
            "tenure": 12, "PhoneService": "Yes", "MultipleLines": "No",
            "OnlineSecurity": "No", "OnlineBackup": "Yes", "DeviceProtection": "No",
            "TechSupport": "No", "StreamingTV": "Yes", "StreamingMovies": "No",
            "PaperlessBilling": "Yes", "MonthlyCharges": 80.25, "TotalCharges": 963.0,
            "InternetService": "Fiber optic", "Contract": "One year",
            "PaymentMethod": "Credit card (automatic)"
        }"#;

        let profile: CustomerProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.tenure_months, 12);
        assert_eq!(profile.streaming_tv, YesNo::Yes);
        assert_eq!(profile.contract_type, ContractType::OneYear);
        assert_eq!(profile.payment_method, PaymentMethod::CreditCard);
    }

    #[test]
    fn test_profile_serializes_labels() {
        let profile = CustomerProfile {
            internet_service: InternetService::FiberOptic,
            ..CustomerProfile::default()
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["internetService"], "Fiber optic");
        assert_eq!(value["streamingTV"], "No");
        assert_eq!(value["tenureMonths"], 0);
    }

    #[test]
    fn test_out_of_domain_json_label() {
        let mut value = serde_json::to_value(CustomerProfile::default()).unwrap();
        value["contractType"] = "Three year".into();

        let err = serde_json::from_value::<CustomerProfile>(value).unwrap_err();
        assert!(err.to_string().contains("Three year"));
    }

    #[test]
    fn test_bad_yes_no_value_names_field() {
        let mut value = serde_json::to_value(CustomerProfile::default()).unwrap();
        value["partner"] = "Maybe".into();

        let message = serde_json::from_value::<CustomerProfile>(value)
            .unwrap_err()
            .to_string();
        assert!(message.contains("partner"), "{message}");
        assert!(message.contains("Maybe"), "{message}");

        let mut value = serde_json::to_value(CustomerProfile::default()).unwrap();
        value["TechSupport"] = "yes".into();
        value.as_object_mut().unwrap().remove("techSupport");

        let message = serde_json::from_value::<CustomerProfile>(value)
            .unwrap_err()
            .to_string();
        assert!(message.contains("techSupport"), "{message}");
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let profile = CustomerProfile {
            senior_citizen: 2,
            ..CustomerProfile::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(InvalidAttributeError::NotBinary { value: 2, .. })
        ));

        let profile = CustomerProfile {
            total_charges: -1.0,
            ..CustomerProfile::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(InvalidAttributeError::OutOfRange {
                attribute: "totalCharges",
                ..
            })
        ));

        let profile = CustomerProfile {
            monthly_charges: f64::NAN,
            ..CustomerProfile::default()
        };
        assert!(profile.validate().is_err());

        assert!(CustomerProfile::default().validate().is_ok());
    }
}
