//! Pricecast Server - HTTP prediction service.
//!
//! Serves the four-lag price model over JSON, backed by the compiled
//! percentage-change history.

pub mod compile;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod routes;

pub use compile::{CompileReport, CompiledRecord, compile_dir, write_compiled};
pub use config::Config;
pub use data::{CsvHistorySource, HistorySource, StaticHistory};
pub use error::{ApiError, Result, ServerError};
pub use routes::{AppState, router};

use tokio::net::TcpListener;
use tracing::{info, warn};

/// Start the Pricecast HTTP server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the configured address.
pub async fn run(config: &Config) -> Result<()> {
    let source = CsvHistorySource::new(&config.data.compiled_csv);
    if let Err(e) = source.ensure_compiled() {
        warn!(error = %e, "Failed to compile raw datasets");
    }
    if let Err(e) = source.load() {
        warn!(error = %e, "Compiled data is not readable yet; data endpoints will fail");
    }

    let listener = TcpListener::bind(config.server.address).await?;
    serve(listener, AppState::new(source), config.server.cors).await
}

/// Serve the API on an already bound listener until ctrl-c.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve(listener: TcpListener, state: AppState, cors: bool) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Pricecast API listening");

    axum::serve(listener, router(state, cors))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
