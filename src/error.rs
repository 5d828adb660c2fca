//! Error types for the admission-to-prediction workflow.

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::patient::FormField;

/// Text shown to the user whenever a prediction attempt fails, whatever the cause.
pub const PREDICTION_FAILED_MESSAGE: &str = "Could not get prediction";

/// A required admission field is missing or unusable at submit time.
///
/// Raised before any request is built; the draft is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(FormField),

    #[error("{field} must be numeric, got {value:?}")]
    Unparseable { field: FormField, value: String },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: FormField, value: String },

    #[error("unknown gender {0:?}")]
    UnknownGender(String),
}

/// Failure of the outbound prediction call.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("prediction endpoint unreachable: {0}")]
    Network(#[source] reqwest::Error),

    #[error("prediction endpoint timed out")]
    Timeout,

    #[error("prediction endpoint answered {status}")]
    Status { status: StatusCode, body: String },

    #[error("prediction response could not be decoded: {0}")]
    MalformedBody(String),

    #[error("admission could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PredictionError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PredictionError::Timeout
        } else {
            PredictionError::Network(err)
        }
    }

    /// Whether resending the same admission may succeed.
    ///
    /// Transport failures, timeouts, 5xx, 408 and 429 are transient; other
    /// statuses and undecodable bodies will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            PredictionError::Network(_) | PredictionError::Timeout => true,
            PredictionError::Status { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
            PredictionError::MalformedBody(_) | PredictionError::Encode(_) => false,
        }
    }

    pub fn user_message(&self) -> &'static str {
        PREDICTION_FAILED_MESSAGE
    }
}

/// Why a submission did not produce a result.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a prediction is already pending for this admission")]
    InFlight,

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("prediction cancelled")]
    Cancelled,
}

impl SubmitError {
    /// Message suitable for the admission view.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(err) => err.to_string(),
            SubmitError::InFlight => "Prediction already in progress".to_string(),
            SubmitError::Prediction(err) => err.user_message().to_string(),
            SubmitError::Cancelled => "Prediction cancelled".to_string(),
        }
    }
}
