//! Pricecast Core - procurement price-change forecasting.
//!
//! This crate provides:
//! - Cost categories, allocations and regression coefficients
//! - The four-lag price model and its prediction engine
//! - Coefficient level mapping and narrative summaries
//! - Normalization of external data into allocations
//! - A dashboard state machine and a session driver over a backend trait
//!
//! # Example
//!
//! ```rust
//! use pricecast_core::{CoefficientSet, CostAllocation, History, PredictionRequest, engine};
//!
//! let request = PredictionRequest::new(CostAllocation::uniform(), CoefficientSet::dashboard_defaults())?;
//! let report = engine::predict(&request, &History::new())?;
//! assert!(report.result.is_consistent());
//! # Ok::<(), pricecast_core::ForecastError>(())
//! ```

pub mod allocation;
pub mod backend;
pub mod category;
pub mod coefficients;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod levels;
pub mod model;
pub mod normalizer;
pub mod session;
pub mod summary;

pub use allocation::{ALLOCATION_TOLERANCE, CostAllocation};
pub use backend::{ForecastBackend, InProcessBackend};
pub use category::{Category, Lag};
pub use coefficients::{CoefficientSet, LagConvention};
pub use dashboard::{Command, DashboardState, Event, HealthStatus, PendingPrediction, reduce};
pub use engine::{CategoryInput, History, PredictBody, PredictionRequest};
pub use error::{ForecastError, Result};
pub use levels::{Level, level_to_numeric, numeric_to_level};
pub use model::{InputSeries, LagTerms, PredictionReport, PredictionResult};
pub use normalizer::{LatestData, normalize};
pub use session::Session;
pub use summary::{
    Confidence, Contributor, PredictionSummary, PriceLevel, Severity, SummaryThresholds, Trend,
    summarize,
};
