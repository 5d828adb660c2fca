use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{PredictorConfig, RetryConfig};
use crate::error::PredictionError;
use crate::models::{PatientInput, PredictionResponse};

/// Anything that can turn an admission snapshot into model verdicts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, input: PatientInput) -> Result<PredictionResponse, PredictionError>;
}

/// HTTP client for the external prediction endpoint.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    endpoint: Url,
    retry: RetryConfig,
}

impl PredictionClient {
    pub fn new(config: &PredictorConfig) -> Result<Self, PredictionError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(PredictionError::Network)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            retry: config.retry.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn attempt(&self, input: &PatientInput) -> Result<PredictionResponse, PredictionError> {
        let body = serde_json::to_vec(input)?;
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(PredictionError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::Status { status, body });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(PredictionError::from_transport)?;
        serde_json::from_slice(&bytes).map_err(|e| PredictionError::MalformedBody(e.to_string()))
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn predict(&self, input: PatientInput) -> Result<PredictionResponse, PredictionError> {
        debug!(?input, "requesting prediction");

        let response = RetryIf::spawn(
            backoff(&self.retry),
            || self.attempt(&input),
            |err: &PredictionError| {
                let retry = err.is_retryable();
                if retry {
                    warn!(error = %err, "prediction attempt failed, retrying");
                }
                retry
            },
        )
        .await?;

        info!(
            random_forest = %response.random_forest.raw(),
            logistic_regression = %response.logistic_regression.raw(),
            "prediction received"
        );
        Ok(response)
    }
}

/// Delays between attempts: `base`, `2*base`, `4*base`... capped, jittered,
/// at most `max_retries` of them.
fn backoff(retry: &RetryConfig) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor((retry.base_delay_ms / 2).max(1))
        .max_delay(Duration::from_millis(retry.max_delay_ms))
        .map(jitter)
        .take(retry.max_retries)
}
