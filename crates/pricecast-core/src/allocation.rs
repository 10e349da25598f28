//! Cost allocation percentages.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{ForecastError, Result};

/// Allowed distance between the allocation total and 100.
pub const ALLOCATION_TOLERANCE: f64 = 0.01;

/// Absorbs binary rounding of decimal inputs such as `100.01 - 100.0`.
const FLOAT_SLACK: f64 = 1e-9;

/// Share of cost pressure attributed to each category, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostAllocation {
    pub labor: f64,
    pub capital: f64,
    pub materials: f64,
    pub energy: f64,
    pub other: f64,
}

impl CostAllocation {
    /// Builds an allocation from explicit values.
    pub fn new(labor: f64, capital: f64, materials: f64, energy: f64, other: f64) -> Self {
        Self { labor, capital, materials, energy, other }
    }

    /// 20% for every category.
    pub fn uniform() -> Self {
        Self::new(20.0, 20.0, 20.0, 20.0, 20.0)
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Labor => self.labor,
            Category::Capital => self.capital,
            Category::Materials => self.materials,
            Category::Energy => self.energy,
            Category::Other => self.other,
        }
    }

    /// Sets a category value without clamping.
    pub fn set(&mut self, category: Category, value: f64) {
        let slot = match category {
            Category::Labor => &mut self.labor,
            Category::Capital => &mut self.capital,
            Category::Materials => &mut self.materials,
            Category::Energy => &mut self.energy,
            Category::Other => &mut self.other,
        };
        *slot = value;
    }

    /// Sets a category value clamped into `[0, 100]`. NaN becomes 0.
    pub fn set_clamped(&mut self, category: Category, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) };
        self.set(category, value);
    }

    /// Sum of the five shares.
    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// True when the shares add up to 100 within [`ALLOCATION_TOLERANCE`].
    pub fn is_balanced(&self) -> bool {
        (self.total() - 100.0).abs() <= ALLOCATION_TOLERANCE + FLOAT_SLACK
    }

    /// Checks the allocation can be sent to the model.
    pub fn validate(&self) -> Result<()> {
        for category in Category::ALL {
            if !self.get(category).is_finite() {
                return Err(ForecastError::NonFinite(category.to_string()));
            }
        }
        if self.is_balanced() {
            Ok(())
        } else {
            Err(ForecastError::AllocationSum { total: self.total() })
        }
    }

    /// Iterates `(category, share)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

impl Default for CostAllocation {
    fn default() -> Self {
        Self::uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_balanced() {
        let allocation = CostAllocation::uniform();
        assert_eq!(allocation.total(), 100.0);
        assert!(allocation.validate().is_ok());
    }

    #[test]
    fn test_tolerance_edges() {
        assert!(CostAllocation::new(20.0, 20.0, 20.0, 20.0, 20.01).is_balanced());
        assert!(CostAllocation::new(20.0, 20.0, 20.0, 20.0, 19.99).is_balanced());
        assert!(!CostAllocation::new(20.0, 20.0, 20.0, 20.0, 20.02).is_balanced());
        assert!(!CostAllocation::new(20.0, 20.0, 20.0, 20.0, 19.98).is_balanced());
    }

    #[test]
    fn test_validate_reports_running_total() {
        let allocation = CostAllocation::new(30.0, 20.0, 20.0, 20.0, 20.0);
        match allocation.validate() {
            Err(ForecastError::AllocationSum { total }) => assert_eq!(total, 110.0),
            other => panic!("Expected AllocationSum, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_nan() {
        let allocation = CostAllocation::new(f64::NAN, 25.0, 25.0, 25.0, 25.0);
        assert!(matches!(allocation.validate(), Err(ForecastError::NonFinite(c)) if c == "labor"));
    }

    #[test]
    fn test_set_clamped() {
        let mut allocation = CostAllocation::uniform();
        allocation.set_clamped(Category::Energy, 140.0);
        assert_eq!(allocation.energy, 100.0);
        allocation.set_clamped(Category::Energy, -3.0);
        assert_eq!(allocation.energy, 0.0);
        allocation.set_clamped(Category::Energy, f64::NAN);
        assert_eq!(allocation.energy, 0.0);
    }
}
