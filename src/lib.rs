//! Triage core library
//!
//! Admission form collection, the emergency prediction client and the
//! interpretation of its verdicts for the hospital dashboard.

pub mod api;
pub mod core;
pub mod error;
pub mod models;

pub use crate::core::client::{PredictionClient, Predictor};
pub use crate::core::form::{AdmissionForm, MultiValue};
pub use crate::core::interpret::{interpret, ModelReading, PredictionOutcome, Severity};
pub use crate::core::workflow::{AdmissionWorkflow, NavigationState, ResultView, Route, Submission};
pub use crate::error::{PredictionError, SubmitError, ValidationError};

/// Application configuration
pub mod config {
    use serde::Deserialize;
    use url::Url;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub predictor: PredictorConfig,
        #[serde(default)]
        pub stub: StubConfig,
    }

    /// Where and how to reach the prediction endpoint.
    #[derive(Debug, Clone, Deserialize)]
    pub struct PredictorConfig {
        pub endpoint: Url,
        #[serde(default = "default_timeout_ms")]
        pub timeout_ms: u64,
        #[serde(default)]
        pub retry: RetryConfig,
    }

    impl PredictorConfig {
        pub fn new(endpoint: Url) -> Self {
            Self {
                endpoint,
                timeout_ms: default_timeout_ms(),
                retry: RetryConfig::default(),
            }
        }
    }

    fn default_timeout_ms() -> u64 {
        10_000
    }

    /// Retries apply to transient failures only.
    #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
    #[serde(default)]
    pub struct RetryConfig {
        pub max_retries: usize,
        pub base_delay_ms: u64,
        pub max_delay_ms: u64,
    }

    impl Default for RetryConfig {
        fn default() -> Self {
            Self {
                max_retries: 2,
                base_delay_ms: 100,
                max_delay_ms: 2_000,
            }
        }
    }

    /// Local stand-in for the prediction endpoint.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct StubConfig {
        pub host: String,
        pub port: u16,
        pub random_forest_probability: f64,
        pub logistic_regression_probability: f64,
    }

    impl Default for StubConfig {
        fn default() -> Self {
            Self {
                host: "127.0.0.1".into(),
                port: 5000,
                random_forest_probability: 0.85,
                logistic_regression_probability: 0.55,
            }
        }
    }

    /// Load configuration from the `config/` directory
    pub fn load_config() -> Result<Config, ::config::ConfigError> {
        load_from("config")
    }

    /// `{dir}/default`, then `{dir}/$TRIAGE_ENV`, then `TRIAGE_*` variables
    /// (`TRIAGE_PREDICTOR__ENDPOINT`).
    pub fn load_from(dir: &str) -> Result<Config, ::config::ConfigError> {
        let env = std::env::var("TRIAGE_ENV").unwrap_or_else(|_| "development".into());

        ::config::Config::builder()
            .add_source(::config::File::with_name(&format!("{dir}/default")))
            .add_source(::config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(::config::Environment::with_prefix("TRIAGE").separator("__"))
            .build()?
            .try_deserialize()
    }

}
