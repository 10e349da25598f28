//! The four-lag price-change model.
//!
//! Each lag term is the weighted sum of every category's percentage change at
//! that lag. The predicted change `ΔP` combines the terms according to the
//! coefficient set's [`LagConvention`], is floored at zero, and gets a fixed
//! uncertainty band around it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{Category, Lag};
use crate::coefficients::{CoefficientSet, LagConvention};

/// Proportional part of the standard deviation.
pub const STD_DEV_SCALE: f64 = 0.15;
/// Constant part of the standard deviation.
pub const STD_DEV_FLOOR: f64 = 0.5;
/// Half-width of the min/max band in standard deviations.
pub const BAND_WIDTH: f64 = 3.0;

/// Four percentage changes per category, ordered `[t-3, t-2, t-1, t]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "BTreeMap<Category, BTreeMap<Lag, f64>>", from = "BTreeMap<Category, BTreeMap<Lag, f64>>")]
pub struct InputSeries {
    windows: [[f64; 4]; 5],
}

impl InputSeries {
    pub fn window(&self, category: Category) -> [f64; 4] {
        self.windows[category.index()]
    }

    pub fn set_window(&mut self, category: Category, window: [f64; 4]) {
        self.windows[category.index()] = window;
    }

    pub fn value(&self, category: Category, lag: Lag) -> f64 {
        self.windows[category.index()][lag.window_index()]
    }

    pub fn is_finite(&self) -> bool {
        self.windows.iter().flatten().all(|v| v.is_finite())
    }
}

impl From<InputSeries> for BTreeMap<Category, BTreeMap<Lag, f64>> {
    fn from(series: InputSeries) -> Self {
        Category::ALL
            .into_iter()
            .map(|c| (c, Lag::ALL.into_iter().map(|l| (l, series.value(c, l))).collect()))
            .collect()
    }
}

impl From<BTreeMap<Category, BTreeMap<Lag, f64>>> for InputSeries {
    fn from(map: BTreeMap<Category, BTreeMap<Lag, f64>>) -> Self {
        let mut series = Self::default();
        for (category, lags) in map {
            let mut window = [0.0; 4];
            for (lag, value) in lags {
                window[lag.window_index()] = value;
            }
            series.set_window(category, window);
        }
        series
    }
}

/// Weighted sums at each lag, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LagTerms {
    /// Current period.
    pub term1: f64,
    /// One period prior.
    pub term2: f64,
    /// Two periods prior.
    pub term3: f64,
    /// Three periods prior.
    pub term4: f64,
}

impl LagTerms {
    /// Combines the terms into the raw (unfloored) price change.
    pub fn combine(&self, convention: LagConvention) -> f64 {
        match convention {
            LagConvention::Signed => self.term1 + self.term2 + self.term3 + self.term4,
            LagConvention::Subtractive => self.term1 + self.term2 - self.term3 - self.term4,
        }
    }
}

/// Summary of a predicted price-change distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted change in percent.
    pub mean: f64,
    #[serde(rename = "stdDev")]
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl PredictionResult {
    /// Builds the uncertainty band around a predicted change.
    pub fn from_mean(mean: f64) -> Self {
        let std_dev = mean.abs() * STD_DEV_SCALE + STD_DEV_FLOOR;
        let min = (mean - BAND_WIDTH * std_dev).max(0.0);
        let max = (mean + BAND_WIDTH * std_dev).max(min);
        Self { mean, std_dev, min, max }
    }

    /// Width of the band, never negative.
    pub fn range(&self) -> f64 {
        (self.max - self.min).max(0.0)
    }

    /// Checks `std_dev >= 0` and `min <= mean <= max`.
    pub fn is_consistent(&self) -> bool {
        self.std_dev >= 0.0 && self.min <= self.mean && self.mean <= self.max
    }
}

/// Full model output returned by `POST /api/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    #[serde(flatten)]
    pub result: PredictionResult,
    /// Floored price change (same as `mean`).
    #[serde(rename = "delta_P")]
    pub delta_p: f64,
    /// Price change before flooring at zero.
    #[serde(rename = "delta_P_raw")]
    pub raw_change: f64,
    #[serde(flatten)]
    pub terms: LagTerms,
    pub convention: LagConvention,
    pub inputs: InputSeries,
}

/// Computes the weighted term for every lag.
pub fn lag_terms(inputs: &InputSeries, coefficients: &CoefficientSet) -> LagTerms {
    let term = |lag: Lag| -> f64 {
        Category::ALL
            .into_iter()
            .map(|c| coefficients.get(c, lag) * inputs.value(c, lag))
            .sum()
    };
    LagTerms {
        term1: term(Lag::Current),
        term2: term(Lag::Prior1),
        term3: term(Lag::Prior2),
        term4: term(Lag::Prior3),
    }
}

/// Evaluates the model for one set of input windows.
pub fn evaluate(inputs: &InputSeries, coefficients: &CoefficientSet) -> PredictionReport {
    let terms = lag_terms(inputs, coefficients);
    let convention = coefficients.convention();
    let raw_change = terms.combine(convention);
    let delta_p = raw_change.max(0.0);
    PredictionReport {
        result: PredictionResult::from_mean(delta_p),
        delta_p,
        raw_change,
        terms,
        convention,
        inputs: *inputs,
    }
}
