//! Admission-to-prediction workflow: form, client, interpretation.

pub mod client;
pub mod form;
pub mod interpret;
pub mod workflow;
