//! Churn Predictor - Main Entry Point
//!
//! Loads the scaler and classifier once, collects a customer profile from a
//! JSON file or the interactive form, and prints the churn probability.

use anyhow::{Context, Result};
use churn_predictor::{
    app::{self, OutputOptions},
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    form::Form,
    models::inference::InferenceEngine,
    types::CustomerProfile,
};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Predict whether a telecom customer is likely to churn
#[derive(Debug, Parser)]
#[command(name = "churn-predictor", version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Customer profile as JSON (`-` reads stdin); omit for the interactive form
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,

    /// Print the encoded feature vector before predicting
    #[arg(long)]
    show_features: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from_path(&cli.config)?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!(config = %cli.config.display(), "Starting Churn Predictor");

    // Load artifacts once; they stay read-only for the rest of the process
    let engine = InferenceEngine::new(&config)?;
    info!(
        model = %engine.model_name(),
        features = engine.encoder().feature_count(),
        "Model artifacts loaded"
    );

    let profile = match &cli.profile {
        Some(path) => read_profile(path)?,
        None => {
            let stdin = io::stdin();
            Form::new(stdin.lock(), io::stdout())
                .prompt_profile()
                .context("Failed to collect customer details")?
        }
    };

    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("prediction", request_id = %request_id);
    let _guard = span.enter();

    let options = OutputOptions {
        json: cli.json,
        show_features: cli.show_features,
    };
    app::run_prediction(&engine, &profile, &request_id, options, &mut io::stdout().lock())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("churn_predictor={}", logging.level).parse()?);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match logging.format.as_str() {
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
    Ok(())
}

fn read_profile(path: &Path) -> Result<CustomerProfile> {
    if path == Path::new("-") {
        return app::read_profile(io::stdin().lock());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to read profile from {}", path.display()))?;
    app::read_profile(BufReader::new(file))
}
