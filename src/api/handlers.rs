use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::StubConfig;
use crate::models::{PatientInput, PredictionResponse, Verdict};

pub const EMERGENCY_THRESHOLD: f64 = 0.8;
pub const NO_EMERGENCY_THRESHOLD: f64 = 0.4;

/// Fixed emergency probabilities attributed to the two models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StubModels {
    pub random_forest_probability: f64,
    pub logistic_regression_probability: f64,
}

impl From<&StubConfig> for StubModels {
    fn from(config: &StubConfig) -> Self {
        Self {
            random_forest_probability: config.random_forest_probability,
            logistic_regression_probability: config.logistic_regression_probability,
        }
    }
}

impl StubModels {
    pub fn respond(&self) -> PredictionResponse {
        PredictionResponse::new(
            band(self.random_forest_probability),
            band(self.logistic_regression_probability),
        )
    }
}

/// Map an emergency probability onto the three admission verdicts.
pub fn band(probability: f64) -> Verdict {
    if probability >= EMERGENCY_THRESHOLD {
        Verdict::Emergency
    } else if probability >= NO_EMERGENCY_THRESHOLD {
        Verdict::NoEmergency
    } else {
        Verdict::NoAdmission
    }
}

pub async fn predict(body: web::Json<PatientInput>, models: web::Data<StubModels>) -> HttpResponse {
    let input = body.into_inner();
    if let Err(err) = input.vitals() {
        warn!(error = %err, "stub rejected admission");
        return HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
    }
    debug!(?input, "stub accepted admission");
    HttpResponse::Ok().json(models.respond())
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
