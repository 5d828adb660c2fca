use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::ValidationError;

/// Symptoms offered by the admission multi-select.
pub const SYMPTOM_OPTIONS: &[&str] = &[
    "Headache",
    "Chest pain",
    "Fever",
    "Nausea",
    "Cough",
    "Shortness of breath",
    "Fatigue",
];

/// Conditions offered by the medical-history multi-select.
pub const HISTORY_OPTIONS: &[&str] = &[
    "Asthma",
    "Cancer",
    "Diabetes",
    "Hypertension",
    "Heart Disease",
    "Kidney Disease",
];

/// Single-valued admission fields, all required at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Age,
    Gender,
    SystolicBp,
    DiastolicBp,
    HeartRate,
    Temperature,
    OxygenSaturation,
}

impl FormField {
    /// Submission order; the first offending field is the one reported.
    pub const ALL: [FormField; 7] = [
        FormField::Age,
        FormField::Gender,
        FormField::SystolicBp,
        FormField::DiastolicBp,
        FormField::HeartRate,
        FormField::Temperature,
        FormField::OxygenSaturation,
    ];

    /// Key used in the prediction request body.
    pub fn wire_name(self) -> &'static str {
        match self {
            FormField::Age => "Age",
            FormField::Gender => "Gender",
            FormField::SystolicBp => "SystolicBP",
            FormField::DiastolicBp => "DiastolicBP",
            FormField::HeartRate => "Heart_Rate",
            FormField::Temperature => "Temperature",
            FormField::OxygenSaturation => "Oxygen_Saturation",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Multi-select admission fields. Both may be left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiField {
    Symptoms,
    MedicalHistory,
}

impl MultiField {
    pub fn wire_name(self) -> &'static str {
        match self {
            MultiField::Symptoms => "Symptoms",
            MultiField::MedicalHistory => "Medical_History",
        }
    }

    /// Catalog the multi-select offers; other tokens are still accepted.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            MultiField::Symptoms => SYMPTOM_OPTIONS,
            MultiField::MedicalHistory => HISTORY_OPTIONS,
        }
    }
}

impl fmt::Display for MultiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownGender(trimmed.to_string()))
    }
}

impl TryFrom<String> for Gender {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen admission snapshot, exactly as it is sent for prediction.
///
/// Numeric fields keep the text the user entered (trimmed); they are
/// transmitted as strings and only parsed for validation, see [`PatientInput::vitals`].
/// Produced by [`crate::core::form::AdmissionForm::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    #[serde(rename = "Age", deserialize_with = "scalar_text")]
    pub(crate) age: String,
    #[serde(rename = "Gender")]
    pub(crate) gender: Gender,
    #[serde(rename = "SystolicBP", deserialize_with = "scalar_text")]
    pub(crate) systolic_bp: String,
    #[serde(rename = "DiastolicBP", deserialize_with = "scalar_text")]
    pub(crate) diastolic_bp: String,
    #[serde(rename = "Heart_Rate", deserialize_with = "scalar_text")]
    pub(crate) heart_rate: String,
    #[serde(rename = "Temperature", deserialize_with = "scalar_text")]
    pub(crate) temperature: String,
    #[serde(rename = "Oxygen_Saturation", deserialize_with = "scalar_text")]
    pub(crate) oxygen_saturation: String,
    #[serde(rename = "Symptoms", default, deserialize_with = "token_list")]
    pub(crate) symptoms: Vec<String>,
    #[serde(rename = "Medical_History", default, deserialize_with = "token_list")]
    pub(crate) medical_history: Vec<String>,
}

impl PatientInput {
    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Raw text of a single-valued field.
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Age => &self.age,
            FormField::Gender => self.gender.as_str(),
            FormField::SystolicBp => &self.systolic_bp,
            FormField::DiastolicBp => &self.diastolic_bp,
            FormField::HeartRate => &self.heart_rate,
            FormField::Temperature => &self.temperature,
            FormField::OxygenSaturation => &self.oxygen_saturation,
        }
    }

    pub fn items(&self, field: MultiField) -> &[String] {
        match field {
            MultiField::Symptoms => &self.symptoms,
            MultiField::MedicalHistory => &self.medical_history,
        }
    }

    /// Parse and range-check the numeric fields.
    pub fn vitals(&self) -> Result<Vitals, ValidationError> {
        let vitals = Vitals {
            age: parse_field(FormField::Age, &self.age)?,
            systolic_bp: parse_field(FormField::SystolicBp, &self.systolic_bp)?,
            diastolic_bp: parse_field(FormField::DiastolicBp, &self.diastolic_bp)?,
            heart_rate: parse_field(FormField::HeartRate, &self.heart_rate)?,
            temperature: parse_decimal(FormField::Temperature, &self.temperature)?,
            oxygen_saturation: parse_decimal(FormField::OxygenSaturation, &self.oxygen_saturation)?,
        };
        vitals
            .validate()
            .map_err(|errors| self.out_of_range(&errors))?;
        Ok(vitals)
    }

    fn out_of_range(&self, errors: &ValidationErrors) -> ValidationError {
        let failed = errors.field_errors();
        let field = [
            ("age", FormField::Age),
            ("oxygen_saturation", FormField::OxygenSaturation),
        ]
        .into_iter()
        .find(|(key, _)| failed.contains_key(key))
        .map_or(FormField::Age, |(_, field)| field);
        ValidationError::OutOfRange {
            field,
            value: self.field(field).to_string(),
        }
    }
}

/// Typed view of the numeric admission fields.
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
pub struct Vitals {
    #[validate(range(min = 1))]
    pub age: u32,
    pub systolic_bp: u32,
    pub diastolic_bp: u32,
    pub heart_rate: u32,
    pub temperature: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub oxygen_saturation: f64,
}

fn parse_field<T: FromStr>(field: FormField, raw: &str) -> Result<T, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    raw.parse().map_err(|_| ValidationError::Unparseable {
        field,
        value: raw.to_string(),
    })
}

fn parse_decimal(field: FormField, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = parse_field(field, raw)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::Unparseable {
            field,
            value: raw.trim().to_string(),
        })
    }
}

/// Trim and deduplicate multi-select tokens, keeping first-seen order.
///
/// Each token is kept whole, commas included.
pub fn normalize_tokens<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim();
        if !token.is_empty() && !out.iter().any(|seen| seen == token) {
            out.push(token.to_string());
        }
    }
    out
}

/// Tokens of a comma-joined multi-select value.
pub fn split_tokens(joined: &str) -> Vec<String> {
    normalize_tokens(joined.split(','))
}

// Numbers are accepted as well as strings so bodies from other clients decode.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text.trim().to_string(),
        Scalar::Number(number) => number_text(&number),
    })
}

// Integral floats such as `45.0` are written without the fraction so integer
// fields still parse.
fn number_text(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(value)
            if number.is_f64() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 =>
        {
            format!("{}", value as i64)
        }
        _ => number.to_string(),
    }
}

fn token_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tokens {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Tokens::deserialize(deserializer)? {
        Tokens::List(list) => normalize_tokens(list),
        Tokens::Joined(joined) => split_tokens(&joined),
    })
}
