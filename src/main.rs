//! Triage
//!
//! Command line entry point: run an admission through the prediction
//! endpoint, or serve the local stub endpoint.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use triage::models::PatientInput;
use triage::{api, config, AdmissionForm, AdmissionWorkflow, PredictionClient, ResultView};

#[derive(Parser)]
#[command(name = "triage", about = "Emergency admission prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Directory holding default.toml and per-environment overrides
    #[arg(long, default_value = "config")]
    config_dir: String,
    #[arg(long)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit an admission (JSON, prediction-request keys) and print the result view
    Predict { patient: PathBuf },
    /// Serve the stub prediction endpoint
    Serve,
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = config::load_from(&cli.config_dir).context("failed to load configuration")?;

    match cli.command {
        Commands::Predict { patient } => predict(&config, &patient).await,
        Commands::Serve => {
            let (server, _) = api::bind(&config.stub).context("failed to bind stub endpoint")?;
            server.await.context("stub endpoint stopped")
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn predict(config: &config::Config, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let input: PatientInput = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an admission record", path.display()))?;

    let client = PredictionClient::new(&config.predictor)?;
    let mut workflow =
        AdmissionWorkflow::with_form(Arc::new(client), AdmissionForm::from_input(&input));

    match workflow.run().await {
        Ok(state) => {
            println!("{}", ResultView::render(Some(&state)));
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "admission not predicted");
            println!("{}", err.user_message());
            Err(err.into())
        }
    }
}
