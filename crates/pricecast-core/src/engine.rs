//! Prediction engine: resolves request inputs against the latest history and
//! evaluates the model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::CostAllocation;
use crate::category::Category;
use crate::coefficients::CoefficientSet;
use crate::error::{ForecastError, Result};
use crate::model::{self, InputSeries, PredictionReport};
use crate::normalizer::LatestData;

const WINDOW: usize = 4;

/// Per-category percentage-change history, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    series: BTreeMap<Category, Vec<f64>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_series(mut self, category: Category, values: Vec<f64>) -> Self {
        self.insert(category, values);
        self
    }

    pub fn insert(&mut self, category: Category, values: Vec<f64>) {
        self.series.insert(category, values);
    }

    pub fn series(&self, category: Category) -> &[f64] {
        self.series.get(&category).map_or(&[], Vec::as_slice)
    }

    /// True when the category has at least one observation.
    pub fn has_data(&self, category: Category) -> bool {
        !self.series(category).is_empty()
    }

    /// Last four observations, left-padded with zeros.
    pub fn window(&self, category: Category) -> [f64; 4] {
        let series = self.series(category);
        let tail = &series[series.len().saturating_sub(WINDOW)..];
        let mut window = [0.0; WINDOW];
        window[WINDOW - tail.len()..].copy_from_slice(tail);
        window
    }

    /// Most recent observation, or 0 when there is none.
    pub fn latest(&self, category: Category) -> f64 {
        self.series(category).last().copied().unwrap_or(0.0)
    }

    /// Payload for `GET /api/data/latest`.
    pub fn latest_data(&self) -> LatestData {
        LatestData {
            labor: self.latest(Category::Labor),
            capital: self.latest(Category::Capital),
            materials: self.latest(Category::Materials),
            energy: self.latest(Category::Energy),
            other: self.latest(Category::Other),
            full_data: Some(
                Category::ALL.into_iter().map(|c| (c, self.series(c).to_vec())).collect(),
            ),
        }
    }
}

/// How a predict request specifies one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryInput {
    /// Explicit `[t-3, t-2, t-1, t]` changes, used as-is.
    Series([f64; 4]),
    /// Percentage share (0-100) that scales the category's baseline window.
    Share(f64),
}

impl CategoryInput {
    fn is_finite(&self) -> bool {
        match self {
            Self::Series(values) => values.iter().all(|v| v.is_finite()),
            Self::Share(value) => value.is_finite(),
        }
    }
}

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor: Option<CategoryInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<CategoryInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<CategoryInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<CategoryInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<CategoryInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<CoefficientSet>,
}

impl PredictBody {
    pub fn input(&self, category: Category) -> Option<CategoryInput> {
        match category {
            Category::Labor => self.labor,
            Category::Capital => self.capital,
            Category::Materials => self.materials,
            Category::Energy => self.energy,
            Category::Other => self.other,
        }
    }

    fn input_mut(&mut self, category: Category) -> &mut Option<CategoryInput> {
        match category {
            Category::Labor => &mut self.labor,
            Category::Capital => &mut self.capital,
            Category::Materials => &mut self.materials,
            Category::Energy => &mut self.energy,
            Category::Other => &mut self.other,
        }
    }

    /// Returns the shares when every category is given as a share.
    pub fn share_allocation(&self) -> Option<CostAllocation> {
        let mut allocation = CostAllocation::uniform();
        for category in Category::ALL {
            match self.input(category)? {
                CategoryInput::Share(value) => allocation.set(category, value),
                CategoryInput::Series(_) => return None,
            }
        }
        Some(allocation)
    }
}

/// A dashboard prediction: allocation shares plus coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub allocation: CostAllocation,
    pub coefficients: CoefficientSet,
}

impl PredictionRequest {
    /// Validates the allocation before building a request.
    pub fn new(allocation: CostAllocation, coefficients: CoefficientSet) -> Result<Self> {
        allocation.validate()?;
        Ok(Self { allocation, coefficients })
    }

    /// Wire body with every category sent as a share.
    pub fn to_body(&self) -> PredictBody {
        let mut body = PredictBody { coefficients: Some(self.coefficients), ..PredictBody::default() };
        for (category, share) in self.allocation.iter() {
            *body.input_mut(category) = Some(CategoryInput::Share(share));
        }
        body
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Resolves one category input against its baseline history.
pub fn resolve_input(input: Option<CategoryInput>, category: Category, history: &History) -> [f64; 4] {
    match input {
        Some(CategoryInput::Series(values)) => values,
        Some(CategoryInput::Share(share)) => {
            let weight = share.clamp(0.0, 100.0) / 100.0;
            if history.has_data(category) {
                history.window(category).map(|v| round6(v * weight))
            } else {
                [round6(weight * 100.0); 4]
            }
        }
        None => history.window(category),
    }
}

/// Resolves every category of a body into model input windows.
pub fn resolve_inputs(body: &PredictBody, history: &History) -> InputSeries {
    let mut inputs = InputSeries::default();
    for category in Category::ALL {
        inputs.set_window(category, resolve_input(body.input(category), category, history));
    }
    inputs
}

/// Evaluates a predict body.
///
/// When all five categories are given as shares they must add up to 100.
/// Coefficients default to [`CoefficientSet::model_defaults`].
pub fn predict_body(body: &PredictBody, history: &History) -> Result<PredictionReport> {
    for category in Category::ALL {
        if let Some(input) = body.input(category) {
            if !input.is_finite() {
                return Err(ForecastError::NonFinite(category.to_string()));
            }
        }
    }
    if let Some(allocation) = body.share_allocation() {
        allocation.validate()?;
    }

    let coefficients = body.coefficients.unwrap_or_else(CoefficientSet::model_defaults);
    let inputs = resolve_inputs(body, history);
    let report = model::evaluate(&inputs, &coefficients);
    debug!(
        mean = report.result.mean,
        raw = report.raw_change,
        convention = ?report.convention,
        "Evaluated price model"
    );
    Ok(report)
}

/// Validates and evaluates a dashboard request in-process.
pub fn predict(request: &PredictionRequest, history: &History) -> Result<PredictionReport> {
    request.allocation.validate()?;
    predict_body(&request.to_body(), history)
}
