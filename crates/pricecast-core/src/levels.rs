//! Qualitative coefficient bands.
//!
//! The dashboard edits coefficients through three canonical magnitudes. The
//! mapping is lossy: `level_to_numeric(numeric_to_level(x), x)` keeps the sign
//! of `x` but not its magnitude.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Magnitude at or above which a coefficient is "high".
pub const HIGH_THRESHOLD: f64 = 0.7;
/// Magnitude at or above which a coefficient is "medium".
pub const MEDIUM_THRESHOLD: f64 = 0.4;

/// Qualitative coefficient magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Canonical magnitude written back when a level is picked.
    pub fn magnitude(self) -> f64 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.6,
            Self::High => 0.8,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForecastError::UnknownCoefficient(format!("level {}", s)))
    }
}

/// Classifies a coefficient by absolute magnitude.
pub fn numeric_to_level(value: f64) -> Level {
    let magnitude = value.abs();
    if magnitude >= HIGH_THRESHOLD {
        Level::High
    } else if magnitude >= MEDIUM_THRESHOLD {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Canonical magnitude for `level`, signed like `original` (zero counts as positive).
pub fn level_to_numeric(level: Level, original: f64) -> f64 {
    if original < 0.0 { -level.magnitude() } else { level.magnitude() }
}
