//! Cost categories and lag periods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// One of the five input cost categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Wages and salaries.
    Labor,
    /// Equipment and financing.
    Capital,
    /// Raw materials and commodities.
    Materials,
    /// Fuel and electricity.
    Energy,
    /// Manually supplied remainder.
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 5] = [Self::Labor, Self::Capital, Self::Materials, Self::Energy, Self::Other];

    /// Wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Labor => "labor",
            Self::Capital => "capital",
            Self::Materials => "materials",
            Self::Energy => "energy",
            Self::Other => "other",
        }
    }

    /// Capitalized name for prose.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Labor => "Labor",
            Self::Capital => "Capital",
            Self::Materials => "Materials",
            Self::Energy => "Energy",
            Self::Other => "Other",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Labor => 0,
            Self::Capital => 1,
            Self::Materials => 2,
            Self::Energy => 3,
            Self::Other => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForecastError::UnknownCategory(s.to_string()))
    }
}

/// Lag period at which a cost change feeds the predicted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lag {
    /// Current period (t).
    #[serde(rename = "t")]
    Current,
    /// One period prior (t-1).
    #[serde(rename = "t-1")]
    Prior1,
    /// Two periods prior (t-2).
    #[serde(rename = "t-2")]
    Prior2,
    /// Three periods prior (t-3).
    #[serde(rename = "t-3")]
    Prior3,
}

impl Lag {
    /// All lags, newest first.
    pub const ALL: [Self; 4] = [Self::Current, Self::Prior1, Self::Prior2, Self::Prior3];

    /// Suffix used in flat coefficient keys (`labor_t2`).
    pub fn key_suffix(self) -> &'static str {
        match self {
            Self::Current => "t",
            Self::Prior1 => "t1",
            Self::Prior2 => "t2",
            Self::Prior3 => "t3",
        }
    }

    /// Human label (`t-2`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Current => "t",
            Self::Prior1 => "t-1",
            Self::Prior2 => "t-2",
            Self::Prior3 => "t-3",
        }
    }

    /// Number of periods back from the current one.
    pub fn offset(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Prior1 => 1,
            Self::Prior2 => 2,
            Self::Prior3 => 3,
        }
    }

    /// Position of this lag inside an oldest-to-newest window of four values.
    pub fn window_index(self) -> usize {
        3 - self.offset()
    }
}

impl fmt::Display for Lag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Lag {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|lag| lag.key_suffix() == s || lag.label() == s)
            .ok_or_else(|| ForecastError::UnknownCoefficient(format!("lag {}", s)))
    }
}
