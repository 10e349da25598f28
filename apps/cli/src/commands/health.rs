//! Health command implementation.

use colored::Colorize;
use pricecast_core::ForecastBackend;
use serde_json::json;

use crate::backend::Backend;

/// Execute the health command.
///
/// Fails when the service cannot be reached.
pub async fn execute(backend: &Backend, json_output: bool) -> anyhow::Result<()> {
    match backend.health().await {
        Ok(()) => {
            if json_output {
                println!("{}", json!({ "status": "ok", "target": backend.describe() }));
            } else {
                println!("{} Prediction service at {} is running", "✓".green(), backend.describe().cyan());
            }
            Ok(())
        }
        Err(e) => {
            if !json_output {
                eprintln!("{} Prediction service at {} is unavailable", "✗".red(), backend.describe());
            }
            Err(e.into())
        }
    }
}
