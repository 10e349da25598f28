//! Predict command implementation.
//!
//! Runs one dashboard session: the service is probed, the allocation and
//! coefficient edits are applied, and the resulting prediction is rendered
//! with its narrative summary.

use clap::Args;
use colored::Colorize;
use pricecast_core::{
    Category, CoefficientSet, CostAllocation, DashboardState, Event, ForecastError, Lag, Level,
    PredictionResult, PredictionSummary, PriceLevel, Session, SummaryThresholds, level_to_numeric,
};
use serde_json::json;

use crate::backend::Backend;

/// Arguments for `pricecast predict`.
#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// Labor share of costs (%)
    #[arg(long, default_value_t = 20.0)]
    pub labor: f64,

    /// Capital share of costs (%)
    #[arg(long, default_value_t = 20.0)]
    pub capital: f64,

    /// Materials share of costs (%)
    #[arg(long, default_value_t = 20.0)]
    pub materials: f64,

    /// Energy share of costs (%)
    #[arg(long, default_value_t = 20.0)]
    pub energy: f64,

    /// Other share of costs (%)
    #[arg(long, default_value_t = 20.0)]
    pub other: f64,

    /// Override a coefficient, e.g. `labor_t=0.2` (repeatable)
    #[arg(long = "coef", value_name = "KEY=VALUE")]
    pub coefficients: Vec<String>,

    /// Set a coefficient by level, e.g. `capital_t3=high` (repeatable)
    #[arg(long = "level", value_name = "KEY=LEVEL")]
    pub levels: Vec<String>,

    /// Replace the allocation with one normalized from the latest data
    #[arg(long)]
    pub from_latest: bool,

    /// Mean of an earlier prediction to report the trend against
    #[arg(long)]
    pub previous_mean: Option<f64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

fn split_assignment(raw: &str) -> anyhow::Result<(Category, Lag, &str)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", raw))?;
    let (category, lag) = CoefficientSet::parse_key(key.trim())?;
    Ok((category, lag, value.trim()))
}

/// Applies `--coef` and `--level` edits to the dashboard coefficients.
pub fn apply_overrides(
    coefficients: &mut CoefficientSet,
    values: &[String],
    levels: &[String],
) -> anyhow::Result<()> {
    for raw in values {
        let (category, lag, value) = split_assignment(raw)?;
        let value: f64 = value.parse().map_err(|_| anyhow::anyhow!("Invalid coefficient value in '{}'", raw))?;
        if !value.is_finite() {
            return Err(ForecastError::NonFinite(CoefficientSet::key(category, lag)).into());
        }
        coefficients.set(category, lag, value);
    }
    for raw in levels {
        let (category, lag, level) = split_assignment(raw)?;
        let level: Level = level.parse()?;
        let current = coefficients.get(category, lag);
        coefficients.set(category, lag, level_to_numeric(level, current));
    }
    Ok(())
}

/// Execute the predict command.
pub async fn execute(backend: Backend, args: PredictArgs, thresholds: SummaryThresholds) -> anyhow::Result<()> {
    let mut state = DashboardState::with_thresholds(thresholds);
    state.allocation.set_clamped(Category::Labor, args.labor);
    state.allocation.set_clamped(Category::Capital, args.capital);
    state.allocation.set_clamped(Category::Materials, args.materials);
    state.allocation.set_clamped(Category::Energy, args.energy);
    state.allocation.set_clamped(Category::Other, args.other);
    apply_overrides(&mut state.coefficients, &args.coefficients, &args.levels)?;
    state.previous_mean = args.previous_mean;

    let target = backend.describe();
    let mut session = Session::with_state(backend, state);
    session.start().await;

    if args.from_latest {
        if !session.state().can_load_external() {
            anyhow::bail!("Cannot load latest data: prediction service at {} is unavailable", target);
        }
        let state = session.dispatch(Event::ExternalDataRequested).await;
        if let Some(message) = &state.status_message {
            anyhow::bail!("{}", message);
        }
    }

    let state = session.state();
    if let Some(total) = state.allocation_error {
        return Err(ForecastError::AllocationSum { total }.into());
    }
    let (Some(prediction), Some(summary)) = (state.prediction, state.summary.as_ref()) else {
        let message = state.status_message.clone().unwrap_or_else(|| "No prediction available".to_string());
        anyhow::bail!("{}", message);
    };

    if args.json {
        let output = json!({
            "allocation": state.allocation,
            "coefficients": state.coefficients,
            "prediction": prediction,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        render(&target, &state.allocation, &prediction, summary);
    }
    Ok(())
}

fn price_colored(level: PriceLevel, text: &str) -> colored::ColoredString {
    match level {
        PriceLevel::Low => text.green(),
        PriceLevel::Medium => text.yellow(),
        PriceLevel::High => text.red(),
    }
}

fn render(target: &str, allocation: &CostAllocation, prediction: &PredictionResult, summary: &PredictionSummary) {
    println!("{} {}", "Pricecast Forecast".bold().cyan(), format!("({})", target).dimmed());
    println!();

    println!("{}", "Allocation:".bold());
    for (category, share) in allocation.iter() {
        println!("  {:<10} {:>6.2}%", category.display_name(), share);
    }
    println!();

    println!("{}", "Prediction:".bold());
    println!("  Mean change: {}", format!("{:.2}%", prediction.mean).bold());
    println!("  Std dev:     {:.2}", prediction.std_dev);
    println!("  Range:       {:.2}% to {:.2}%", prediction.min, prediction.max);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Price level: {}", price_colored(summary.price_level, summary.price_label()));
    println!("  {}", summary.price_level.description().dimmed());
    println!("  Confidence:  {} (range {:.2})", summary.confidence_label(), summary.range);
    println!("  Trend:       {}", summary.trend_label());
    println!("  {}", summary.trend.description().dimmed());
    println!();
    println!("  {}", summary.explanation);
}
