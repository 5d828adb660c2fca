//! Data exchanged with the prediction endpoint.

pub mod patient;
pub mod prediction;

pub use patient::{FormField, Gender, MultiField, PatientInput, Vitals};
pub use prediction::{ModelVerdict, PredictionResponse, Verdict};
