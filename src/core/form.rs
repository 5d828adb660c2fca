//! Admission form draft.
//!
//! The draft holds what the user typed, field by field, and is only checked
//! when a snapshot is requested for submission.

use tracing::debug;

use crate::error::ValidationError;
use crate::models::patient::{
    normalize_tokens, split_tokens, FormField, Gender, MultiField, PatientInput,
};

/// New contents for a multi-select field.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiValue {
    /// Comma-joined tokens, as a free-text input delivers them.
    Joined(String),
    List(Vec<String>),
}

impl MultiValue {
    fn into_tokens(self) -> Vec<String> {
        match self {
            MultiValue::Joined(joined) => split_tokens(&joined),
            MultiValue::List(list) => normalize_tokens(list),
        }
    }
}

impl From<&str> for MultiValue {
    fn from(joined: &str) -> Self {
        MultiValue::Joined(joined.to_string())
    }
}

impl From<String> for MultiValue {
    fn from(joined: String) -> Self {
        MultiValue::Joined(joined)
    }
}

impl From<Vec<String>> for MultiValue {
    fn from(list: Vec<String>) -> Self {
        MultiValue::List(list)
    }
}

impl From<Vec<&str>> for MultiValue {
    fn from(list: Vec<&str>) -> Self {
        MultiValue::List(list.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for MultiValue {
    fn from(list: &[&str]) -> Self {
        MultiValue::List(list.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdmissionForm {
    age: String,
    gender: String,
    systolic_bp: String,
    diastolic_bp: String,
    heart_rate: String,
    temperature: String,
    oxygen_saturation: String,
    symptoms: Vec<String>,
    medical_history: Vec<String>,
}

impl AdmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill a draft from an earlier snapshot.
    pub fn from_input(input: &PatientInput) -> Self {
        let mut form = Self::new();
        for field in FormField::ALL {
            form.set_field(field, input.field(field));
        }
        form.symptoms = input.items(MultiField::Symptoms).to_vec();
        form.medical_history = input.items(MultiField::MedicalHistory).to_vec();
        form
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Age => &self.age,
            FormField::Gender => &self.gender,
            FormField::SystolicBp => &self.systolic_bp,
            FormField::DiastolicBp => &self.diastolic_bp,
            FormField::HeartRate => &self.heart_rate,
            FormField::Temperature => &self.temperature,
            FormField::OxygenSaturation => &self.oxygen_saturation,
        }
    }

    /// Replace the whole list; both joined text and explicit lists normalize
    /// to the same trimmed, deduplicated sequence.
    pub fn set_multi_field(&mut self, field: MultiField, values: impl Into<MultiValue>) {
        *self.items_mut(field) = values.into().into_tokens();
    }

    /// Select or deselect one element of a multi-select list.
    pub fn toggle_item(&mut self, field: MultiField, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }
        let items = self.items_mut(field);
        match items.iter().position(|item| item == token) {
            Some(index) => {
                items.remove(index);
            }
            None => items.push(token.to_string()),
        }
    }

    pub fn items(&self, field: MultiField) -> &[String] {
        match field {
            MultiField::Symptoms => &self.symptoms,
            MultiField::MedicalHistory => &self.medical_history,
        }
    }

    /// Validate the draft and freeze it for submission.
    ///
    /// The returned snapshot owns its data; later edits to the draft do not
    /// reach it.
    pub fn snapshot(&self) -> Result<PatientInput, ValidationError> {
        if let Some(missing) = FormField::ALL
            .into_iter()
            .find(|field| self.field(*field).trim().is_empty())
        {
            debug!(field = %missing, "admission blocked, field missing");
            return Err(ValidationError::Missing(missing));
        }

        let gender: Gender = self.gender.parse()?;
        let input = PatientInput {
            age: self.age.trim().to_string(),
            gender,
            systolic_bp: self.systolic_bp.trim().to_string(),
            diastolic_bp: self.diastolic_bp.trim().to_string(),
            heart_rate: self.heart_rate.trim().to_string(),
            temperature: self.temperature.trim().to_string(),
            oxygen_saturation: self.oxygen_saturation.trim().to_string(),
            symptoms: self.symptoms.clone(),
            medical_history: self.medical_history.clone(),
        };
        input.vitals()?;
        Ok(input)
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Age => &mut self.age,
            FormField::Gender => &mut self.gender,
            FormField::SystolicBp => &mut self.systolic_bp,
            FormField::DiastolicBp => &mut self.diastolic_bp,
            FormField::HeartRate => &mut self.heart_rate,
            FormField::Temperature => &mut self.temperature,
            FormField::OxygenSaturation => &mut self.oxygen_saturation,
        }
    }

    fn items_mut(&mut self, field: MultiField) -> &mut Vec<String> {
        match field {
            MultiField::Symptoms => &mut self.symptoms,
            MultiField::MedicalHistory => &mut self.medical_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn filled() -> AdmissionForm {
        let mut form = AdmissionForm::new();
        form.set_field(FormField::Age, "45");
        form.set_field(FormField::Gender, "Male");
        form.set_field(FormField::SystolicBp, "140");
        form.set_field(FormField::DiastolicBp, "90");
        form.set_field(FormField::HeartRate, "110");
        form.set_field(FormField::Temperature, "38.5");
        form.set_field(FormField::OxygenSaturation, "92");
        form.toggle_item(MultiField::Symptoms, "Chest pain");
        form
    }

    #[test]
    fn set_field_touches_only_that_field() {
        let mut form = filled();
        let before = form.clone();
        form.set_field(FormField::HeartRate, "80");

        for field in FormField::ALL {
            if field == FormField::HeartRate {
                assert_eq!(form.field(field), "80");
            } else {
                assert_eq!(form.field(field), before.field(field));
            }
        }
        assert_eq!(form.items(MultiField::Symptoms), before.items(MultiField::Symptoms));
    }

    #[test]
    fn joined_and_list_values_normalize_identically() {
        let mut joined = AdmissionForm::new();
        joined.set_multi_field(MultiField::Symptoms, " Fever,Cough , Fever,, ");

        let mut listed = AdmissionForm::new();
        listed.set_multi_field(MultiField::Symptoms, vec!["Fever", " Cough", "Fever"]);

        assert_eq!(joined.items(MultiField::Symptoms), ["Fever", "Cough"]);
        assert_eq!(joined, listed);
        assert!(joined.items(MultiField::MedicalHistory).is_empty());
    }

    #[test]
    fn list_elements_are_not_split_on_commas() {
        let mut form = AdmissionForm::new();
        form.set_multi_field(MultiField::Symptoms, vec!["Pain, left arm", "Fever"]);
        assert_eq!(form.items(MultiField::Symptoms), ["Pain, left arm", "Fever"]);

        form.set_multi_field(MultiField::Symptoms, "Pain, left arm");
        assert_eq!(form.items(MultiField::Symptoms), ["Pain", "left arm"]);
    }

    #[test]
    fn toggle_item_adds_then_removes() {
        let mut form = AdmissionForm::new();
        form.toggle_item(MultiField::MedicalHistory, "Asthma");
        form.toggle_item(MultiField::MedicalHistory, "Diabetes");
        form.toggle_item(MultiField::MedicalHistory, " Asthma ");
        assert_eq!(form.items(MultiField::MedicalHistory), ["Diabetes"]);
    }

    #[test]
    fn complete_form_snapshots() {
        let input = filled().snapshot().unwrap();
        assert_eq!(input.gender(), Gender::Male);
        assert_eq!(input.field(FormField::Temperature), "38.5");
        assert_eq!(input.items(MultiField::Symptoms), ["Chest pain"]);
    }

    #[test_case(FormField::Age)]
    #[test_case(FormField::Gender)]
    #[test_case(FormField::SystolicBp)]
    #[test_case(FormField::DiastolicBp)]
    #[test_case(FormField::HeartRate)]
    #[test_case(FormField::Temperature)]
    #[test_case(FormField::OxygenSaturation)]
    fn empty_required_field_blocks_snapshot(field: FormField) {
        let mut form = filled();
        form.set_field(field, "  ");
        assert_eq!(form.snapshot(), Err(ValidationError::Missing(field)));
    }

    #[test_case(FormField::Age, "forty")]
    #[test_case(FormField::SystolicBp, "140/90")]
    #[test_case(FormField::HeartRate, "1.5")]
    #[test_case(FormField::OxygenSaturation, "high")]
    fn non_numeric_field_blocks_snapshot(field: FormField, raw: &str) {
        let mut form = filled();
        form.set_field(field, raw);
        assert_eq!(
            form.snapshot(),
            Err(ValidationError::Unparseable {
                field,
                value: raw.to_string()
            })
        );
    }

    #[test]
    fn empty_lists_are_allowed() {
        let mut form = filled();
        form.set_multi_field(MultiField::Symptoms, Vec::<String>::new());
        assert!(form.snapshot().unwrap().items(MultiField::Symptoms).is_empty());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_edits() {
        let mut form = filled();
        let input = form.snapshot().unwrap();
        form.set_field(FormField::Age, "80");
        form.toggle_item(MultiField::Symptoms, "Fever");

        assert_eq!(input.field(FormField::Age), "45");
        assert_eq!(input.items(MultiField::Symptoms), ["Chest pain"]);
    }

    #[test]
    fn from_input_round_trips_through_snapshot() {
        let input = filled().snapshot().unwrap();
        assert_eq!(AdmissionForm::from_input(&input).snapshot().unwrap(), input);
    }
}
