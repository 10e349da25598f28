//! Regression coefficients for the four-lag price model.
//!
//! A [`CoefficientSet`] holds one weight per (category, lag) pair. On the wire
//! it is a flat object keyed `<category>_<lag>`, e.g. `labor_t` or
//! `capital_t3`. The `other_*` weights may be omitted and default to zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{Category, Lag};
use crate::error::ForecastError;

/// Model weights in subtractive form: t-2 and t-3 terms are subtracted.
const MODEL_DEFAULTS: [[f64; 4]; 5] = [
    // t, t-1, t-2, t-3
    [0.14, 0.07, 0.05, 0.06],
    [0.07, 0.07, 0.01, -0.11],
    [0.07, 0.07, 0.04, 0.04],
    [0.04, 0.08, 0.08, 0.08],
    [0.06, 0.06, 0.02, 0.02],
];

/// How the t-2 and t-3 weights combine with the first two terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagConvention {
    /// All four terms are added; lagged weights already carry their sign.
    Signed,
    /// The t-2 and t-3 terms are subtracted from the first two.
    Subtractive,
}

/// Twenty regression weights, one per category and lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct CoefficientSet {
    values: [[f64; 4]; 5],
}

impl CoefficientSet {
    /// All weights zero.
    pub fn zeros() -> Self {
        Self { values: [[0.0; 4]; 5] }
    }

    /// Defaults served by the prediction API (subtractive form).
    pub fn model_defaults() -> Self {
        Self { values: MODEL_DEFAULTS }
    }

    /// Defaults shown on the dashboard: the model weights in signed form.
    pub fn dashboard_defaults() -> Self {
        Self::model_defaults().to_signed()
    }

    pub fn get(&self, category: Category, lag: Lag) -> f64 {
        self.values[category.index()][lag.offset()]
    }

    pub fn set(&mut self, category: Category, lag: Lag, value: f64) {
        self.values[category.index()][lag.offset()] = value;
    }

    /// Sum of a category's four lag weights.
    pub fn category_sum(&self, category: Category) -> f64 {
        self.values[category.index()].iter().sum()
    }

    /// The weight with the largest magnitude for a category.
    pub fn dominant(&self, category: Category) -> f64 {
        self.values[category.index()]
            .iter()
            .copied()
            .fold(0.0, |best, value| if value.abs() > best.abs() { value } else { best })
    }

    /// Detects the convention from the sign of `labor_t2`.
    pub fn convention(&self) -> LagConvention {
        if self.get(Category::Labor, Lag::Prior2) < 0.0 {
            LagConvention::Signed
        } else {
            LagConvention::Subtractive
        }
    }

    /// Rewrites subtractive weights into signed form. Signed sets are returned unchanged.
    pub fn to_signed(&self) -> Self {
        if self.convention() == LagConvention::Signed {
            return *self;
        }
        let mut signed = *self;
        for category in Category::ALL {
            for lag in [Lag::Prior2, Lag::Prior3] {
                signed.set(category, lag, -self.get(category, lag));
            }
        }
        signed
    }

    /// Flat wire key for a category and lag.
    pub fn key(category: Category, lag: Lag) -> String {
        format!("{}_{}", category.as_str(), lag.key_suffix())
    }

    /// Parses a flat wire key such as `energy_t1`.
    pub fn parse_key(key: &str) -> Result<(Category, Lag), ForecastError> {
        let (category, lag) = key
            .rsplit_once('_')
            .ok_or_else(|| ForecastError::UnknownCoefficient(key.to_string()))?;
        let category = category
            .parse::<Category>()
            .map_err(|_| ForecastError::UnknownCoefficient(key.to_string()))?;
        let lag = Lag::ALL
            .into_iter()
            .find(|candidate| candidate.key_suffix() == lag)
            .ok_or_else(|| ForecastError::UnknownCoefficient(key.to_string()))?;
        Ok((category, lag))
    }

    /// Iterates `(category, lag, weight)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Lag, f64)> + '_ {
        Category::ALL
            .into_iter()
            .flat_map(move |c| Lag::ALL.into_iter().map(move |l| (c, l, self.get(c, l))))
    }
}

impl Default for CoefficientSet {
    fn default() -> Self {
        Self::model_defaults()
    }
}

impl TryFrom<BTreeMap<String, f64>> for CoefficientSet {
    type Error = ForecastError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut set = Self::zeros();
        for (key, value) in &map {
            let (category, lag) = Self::parse_key(key)?;
            if !value.is_finite() {
                return Err(ForecastError::NonFinite(key.clone()));
            }
            set.set(category, lag, *value);
        }
        for category in Category::ALL.into_iter().filter(|c| *c != Category::Other) {
            for lag in Lag::ALL {
                let key = Self::key(category, lag);
                if !map.contains_key(&key) {
                    return Err(ForecastError::MissingCoefficient(key));
                }
            }
        }
        Ok(set)
    }
}

impl From<CoefficientSet> for BTreeMap<String, f64> {
    fn from(set: CoefficientSet) -> Self {
        set.iter().map(|(c, l, v)| (CoefficientSet::key(c, l), v)).collect()
    }
}
