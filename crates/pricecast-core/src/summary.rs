//! Narrative summary of a prediction.
//!
//! Classifies the predicted change into price, confidence and trend bands and
//! writes a short explanation naming the categories that drove it. All cut
//! points live in [`SummaryThresholds`] so deployments can tune them.

use serde::{Deserialize, Serialize};

use crate::allocation::CostAllocation;
use crate::category::Category;
use crate::coefficients::CoefficientSet;
use crate::levels::{Level, numeric_to_level};
use crate::model::PredictionResult;

/// Cut points used by the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryThresholds {
    /// Mean below this is a low price change.
    pub price_medium_from: f64,
    /// Mean at or above this is a high price change.
    pub price_high_from: f64,
    /// Range at or below this is high confidence.
    pub confidence_narrow_max: f64,
    /// Range at or below this is medium confidence.
    pub confidence_medium_max: f64,
    /// Minimum mean movement that counts as a trend.
    pub trend_delta: f64,
    /// Fraction of |mean| a contribution must exceed to be named.
    pub contributor_share: f64,
    /// Most contributors named in the explanation.
    pub max_contributors: usize,
    pub severity_moderate_from: f64,
    pub severity_substantial_from: f64,
    pub severity_shock_from: f64,
}

impl Default for SummaryThresholds {
    fn default() -> Self {
        Self {
            price_medium_from: 2.0,
            price_high_from: 8.0,
            confidence_narrow_max: 4.0,
            confidence_medium_max: 8.0,
            trend_delta: 0.5,
            contributor_share: 0.10,
            max_contributors: 2,
            severity_moderate_from: 5.0,
            severity_substantial_from: 15.0,
            severity_shock_from: 30.0,
        }
    }
}

/// Band of the predicted price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLevel {
    Low,
    Medium,
    High,
}

impl PriceLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low (<2%)",
            Self::Medium => "Medium (2-8%)",
            Self::High => "High (>8%)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Low => "Supplier prices are expected to stay close to current levels.",
            Self::Medium => "Expect noticeable supplier price increases; review upcoming contracts.",
            Self::High => "Significant supplier price pressure; consider locking in prices early.",
        }
    }
}

/// How tight the predicted band is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High confidence (narrow)",
            Self::Medium => "Medium confidence",
            Self::Low => "Low confidence (wide)",
        }
    }
}

/// Movement of the mean relative to the previous prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trend {
    Baseline,
    Building { delta: f64 },
    Cooling { delta: f64 },
    Steady { delta: f64 },
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline established",
            Self::Building { .. } => "Momentum building",
            Self::Cooling { .. } => "Momentum cooling",
            Self::Steady { .. } => "Holding steady",
        }
    }

    pub fn description(self) -> String {
        match self {
            Self::Baseline => {
                "First prediction this session; later runs are compared against it.".to_string()
            }
            Self::Building { delta } => {
                format!("Up {:.2} percentage points from the previous prediction.", delta)
            }
            Self::Cooling { delta } => {
                format!("Down {:.2} percentage points from the previous prediction.", delta.abs())
            }
            Self::Steady { delta } => {
                format!("Within {:+.2} percentage points of the previous prediction.", delta)
            }
        }
    }

    pub fn delta(self) -> Option<f64> {
        match self {
            Self::Baseline => None,
            Self::Building { delta } | Self::Cooling { delta } | Self::Steady { delta } => Some(delta),
        }
    }
}

/// Commentary bucket for the size of the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Modest,
    Moderate,
    Substantial,
    Shock,
}

impl Severity {
    pub fn commentary(self) -> &'static str {
        match self {
            Self::Shock => "This would be a significant shock to procurement costs.",
            Self::Substantial => "This is a substantial shift that warrants revisiting supplier terms.",
            Self::Moderate => "This is a moderate movement worth watching in upcoming orders.",
            Self::Modest => "This is a modest adjustment within normal variation.",
        }
    }
}

/// A category named as a driver of the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub category: Category,
    /// Allocation times the category's summed lag coefficients.
    pub contribution: f64,
    /// Band of the category's strongest coefficient.
    pub level: Level,
}

/// Everything the dashboard shows next to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub price_level: PriceLevel,
    pub confidence: Confidence,
    pub range: f64,
    pub trend: Trend,
    pub severity: Severity,
    pub contributors: Vec<Contributor>,
    pub explanation: String,
}

impl PredictionSummary {
    pub fn price_label(&self) -> &'static str {
        self.price_level.label()
    }

    pub fn confidence_label(&self) -> &'static str {
        self.confidence.label()
    }

    pub fn trend_label(&self) -> &'static str {
        self.trend.label()
    }
}

pub fn classify_price(mean: f64, thresholds: &SummaryThresholds) -> PriceLevel {
    let mean = mean.max(0.0);
    if mean < thresholds.price_medium_from {
        PriceLevel::Low
    } else if mean < thresholds.price_high_from {
        PriceLevel::Medium
    } else {
        PriceLevel::High
    }
}

/// Classifies a band width (negative widths count as zero).
pub fn classify_confidence(range: f64, thresholds: &SummaryThresholds) -> Confidence {
    let range = range.max(0.0);
    if range <= thresholds.confidence_narrow_max {
        Confidence::High
    } else if range <= thresholds.confidence_medium_max {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn classify_trend(current: f64, previous: Option<f64>, thresholds: &SummaryThresholds) -> Trend {
    let Some(previous) = previous else {
        return Trend::Baseline;
    };
    let delta = current - previous;
    if delta > thresholds.trend_delta {
        Trend::Building { delta }
    } else if delta < -thresholds.trend_delta {
        Trend::Cooling { delta }
    } else {
        Trend::Steady { delta }
    }
}

pub fn classify_severity(mean: f64, thresholds: &SummaryThresholds) -> Severity {
    let magnitude = mean.abs();
    if magnitude >= thresholds.severity_shock_from {
        Severity::Shock
    } else if magnitude >= thresholds.severity_substantial_from {
        Severity::Substantial
    } else if magnitude >= thresholds.severity_moderate_from {
        Severity::Moderate
    } else {
        Severity::Modest
    }
}

/// Ranks categories by |contribution| and keeps those above the share cut.
pub fn top_contributors(
    allocation: &CostAllocation,
    coefficients: &CoefficientSet,
    mean: f64,
    thresholds: &SummaryThresholds,
) -> Vec<Contributor> {
    let mut ranked: Vec<Contributor> = Category::ALL
        .into_iter()
        .map(|category| Contributor {
            category,
            contribution: allocation.get(category) * coefficients.category_sum(category),
            level: numeric_to_level(coefficients.dominant(category)),
        })
        .collect();
    ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

    let cut = thresholds.contributor_share * mean.abs();
    ranked
        .into_iter()
        .filter(|c| c.contribution.abs() > cut)
        .take(thresholds.max_contributors)
        .collect()
}

fn driver_phrase(contributor: &Contributor) -> String {
    format!(
        "{} ({} coefficients)",
        contributor.category.display_name().to_lowercase(),
        contributor.level
    )
}

/// One-paragraph explanation of the predicted change.
pub fn explain(mean: f64, contributors: &[Contributor], severity: Severity) -> String {
    let direction = if mean < 0.0 { "decrease" } else { "increase" };
    let headline = format!("Prices are projected to {} by {:.2}%", direction, mean.abs());
    let drivers = match contributors {
        [] => String::new(),
        [only] => format!(", driven mainly by {}", driver_phrase(only)),
        [first, second, ..] => {
            format!(", driven mainly by {} and {}", driver_phrase(first), driver_phrase(second))
        }
    };
    format!("{}{}. {}", headline, drivers, severity.commentary())
}

/// Builds the full summary for a prediction.
pub fn summarize(
    result: &PredictionResult,
    previous_mean: Option<f64>,
    allocation: &CostAllocation,
    coefficients: &CoefficientSet,
    thresholds: &SummaryThresholds,
) -> PredictionSummary {
    let range = result.range();
    let severity = classify_severity(result.mean, thresholds);
    let contributors = top_contributors(allocation, coefficients, result.mean, thresholds);
    let explanation = explain(result.mean, &contributors, severity);
    PredictionSummary {
        price_level: classify_price(result.mean, thresholds),
        confidence: classify_confidence(range, thresholds),
        range,
        trend: classify_trend(result.mean, previous_mean, thresholds),
        severity,
        contributors,
        explanation,
    }
}
