//! Turns the two model verdicts into what the result view shows.

use serde::Serialize;

use crate::models::patient::{FormField, MultiField, PatientInput};
use crate::models::prediction::{PredictionResponse, Verdict};

pub const LABEL_EMERGENCY: &str = "Emergency Admission Required";
pub const LABEL_NO_EMERGENCY: &str = "No Admission in Emergency";
pub const LABEL_NO_ADMISSION: &str = "No Admission at All";
pub const LABEL_UNKNOWN: &str = "Unknown";
pub const LABEL_NOT_EMERGENCY: &str = "No Emergency Admission Required";
pub const NONE_REPORTED: &str = "None reported";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Success,
    Default,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Default => "default",
        }
    }
}

/// Label and severity for one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelReading {
    pub label: &'static str,
    pub severity: Severity,
}

impl ModelReading {
    pub fn of(verdict: &Verdict) -> Self {
        let (label, severity) = match verdict {
            Verdict::Emergency => (LABEL_EMERGENCY, Severity::Error),
            Verdict::NoEmergency => (LABEL_NO_EMERGENCY, Severity::Warning),
            Verdict::NoAdmission => (LABEL_NO_ADMISSION, Severity::Success),
            Verdict::Unknown(_) => (LABEL_UNKNOWN, Severity::Default),
        };
        ModelReading { label, severity }
    }
}

/// Display strings for the admitted patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientSummary {
    pub age: String,
    pub gender: String,
    pub blood_pressure: String,
    pub heart_rate: String,
    pub temperature: String,
    pub oxygen_saturation: String,
    pub symptoms: String,
    pub medical_history: String,
}

impl PatientSummary {
    pub fn of(input: &PatientInput) -> Self {
        PatientSummary {
            age: format!("{} years", input.field(FormField::Age)),
            gender: input.gender().to_string(),
            blood_pressure: format!(
                "{}/{} mmHg",
                input.field(FormField::SystolicBp),
                input.field(FormField::DiastolicBp)
            ),
            heart_rate: format!("{} bpm", input.field(FormField::HeartRate)),
            temperature: format!("{}°C", input.field(FormField::Temperature)),
            oxygen_saturation: format!("{}%", input.field(FormField::OxygenSaturation)),
            symptoms: joined_or_none(input.items(MultiField::Symptoms)),
            medical_history: joined_or_none(input.items(MultiField::MedicalHistory)),
        }
    }
}

fn joined_or_none(items: &[String]) -> String {
    if items.is_empty() {
        NONE_REPORTED.to_string()
    } else {
        items.join(", ")
    }
}

/// Derived view of one successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub is_emergency: bool,
    pub models_agree: bool,
    pub random_forest: ModelReading,
    pub logistic_regression: ModelReading,
    pub patient: PatientSummary,
}

impl PredictionOutcome {
    /// Overall banner: emergency when either model says so.
    pub fn headline(&self) -> ModelReading {
        if self.is_emergency {
            ModelReading {
                label: LABEL_EMERGENCY,
                severity: Severity::Error,
            }
        } else {
            ModelReading {
                label: LABEL_NOT_EMERGENCY,
                severity: Severity::Success,
            }
        }
    }

    pub fn agreement_message(&self) -> &'static str {
        if self.models_agree {
            "Both models agree on the prediction"
        } else {
            "Models have different predictions"
        }
    }
}

/// Never fails; values it does not recognise read as "Unknown".
pub fn interpret(response: &PredictionResponse, input: &PatientInput) -> PredictionOutcome {
    let random_forest = response.random_forest.verdict();
    let logistic_regression = response.logistic_regression.verdict();

    PredictionOutcome {
        is_emergency: random_forest.is_emergency() || logistic_regression.is_emergency(),
        models_agree: response
            .random_forest
            .same_raw(&response.logistic_regression),
        random_forest: ModelReading::of(random_forest),
        logistic_regression: ModelReading::of(logistic_regression),
        patient: PatientSummary::of(input),
    }
}
