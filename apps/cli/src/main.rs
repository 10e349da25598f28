//! Pricecast CLI - Command-line client for the procurement price forecaster
//!
//! This CLI provides a `pricecast` command that talks to the Pricecast API,
//! or evaluates the model in-process against a compiled CSV with `--offline`.

mod backend;
mod client;
mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use pricecast_core::SummaryThresholds;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use backend::Backend;
use commands::{PredictArgs, coefficients, compile, health, latest, predict};

/// Pricecast CLI - Procurement price-change forecasting
#[derive(Parser, Debug)]
#[command(name = "pricecast", author, version, about = "Pricecast - Procurement price-change forecasting")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Base URL of the Pricecast API
    #[arg(long, env = "PRICECAST_API_URL", default_value = "http://127.0.0.1:5001", global = true)]
    api_url: String,

    /// Evaluate in-process against the compiled CSV instead of calling the API
    #[arg(long, global = true)]
    offline: bool,

    /// Compiled percentage-change CSV used with --offline
    #[arg(long, default_value = "data/compiled_percentage_changes.csv", global = true)]
    data: PathBuf,

    /// TOML file overriding the summary thresholds
    #[arg(long, global = true)]
    thresholds: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the prediction service is running
    Health {
        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the latest data per category and its normalized allocation
    Latest {
        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the model's default coefficients with their levels
    Coefficients {
        /// Show t-2 and t-3 weights with their effective sign
        #[arg(long)]
        signed: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict the price change for an allocation
    Predict(PredictArgs),

    /// Compile raw category datasets into the percentage-change CSV
    Compile {
        /// Directory holding the raw `*_last5months.csv` files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output path (defaults to the compiled file inside the data directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_thresholds(path: Option<&Path>) -> anyhow::Result<SummaryThresholds> {
    let Some(path) = path else {
        return Ok(SummaryThresholds::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read thresholds file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid thresholds file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let backend = || Backend::from_args(&args.api_url, args.offline, &args.data);

    match args.command {
        Command::Health { json } => health::execute(&backend()?, json).await,
        Command::Latest { json } => latest::execute(&backend()?, json).await,
        Command::Coefficients { signed, json } => coefficients::execute(&backend()?, signed, json).await,
        Command::Predict(predict_args) => {
            let thresholds = load_thresholds(args.thresholds.as_deref())?;
            predict::execute(backend()?, predict_args, thresholds).await
        }
        Command::Compile { data_dir, output, json } => compile::execute(&data_dir, output, json),
    }
}
