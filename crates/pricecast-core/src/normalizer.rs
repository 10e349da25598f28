//! Turns an external multi-series dataset into allocation percentages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::allocation::CostAllocation;
use crate::category::Category;

/// Response of the latest-data service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestData {
    #[serde(default)]
    pub labor: f64,
    #[serde(default)]
    pub capital: f64,
    #[serde(default)]
    pub materials: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub other: f64,
    /// Ordered series per category; a missing or empty series falls back to the scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_data: Option<BTreeMap<Category, Vec<f64>>>,
}

impl LatestData {
    pub fn scalar(&self, category: Category) -> f64 {
        match category {
            Category::Labor => self.labor,
            Category::Capital => self.capital,
            Category::Materials => self.materials,
            Category::Energy => self.energy,
            Category::Other => self.other,
        }
    }

    /// Latest observed value for a category.
    pub fn latest(&self, category: Category) -> f64 {
        self.full_data
            .as_ref()
            .and_then(|data| data.get(&category))
            .and_then(|series| series.last().copied())
            .unwrap_or_else(|| self.scalar(category))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Proportional allocation of the latest magnitudes, summing to exactly 100.00.
///
/// Rounding leftovers go to `other`. If the rounded shares overshoot 100 by
/// more than `other` holds, `other` drops to zero and the largest share
/// absorbs the rest. When every magnitude is zero (or the
/// data is not finite) the uniform 20% split is returned.
pub fn normalize(data: &LatestData) -> CostAllocation {
    let magnitudes = Category::ALL.map(|c| data.latest(c).abs());
    let total: f64 = magnitudes.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return CostAllocation::uniform();
    }

    let mut allocation = CostAllocation::uniform();
    for (category, magnitude) in Category::ALL.into_iter().zip(magnitudes) {
        allocation.set(category, round2(magnitude / total * 100.0));
    }
    let remainder = 100.0 - allocation.total();
    let other = round2(allocation.other + remainder);
    if other >= 0.0 {
        allocation.other = other;
        return allocation;
    }

    // Rounding overshot past what `other` can absorb; the largest share gives it back.
    allocation.other = 0.0;
    let largest = allocation.iter().max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((category, share)) = largest {
        allocation.set(category, round2(share + other));
    }
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_series(pairs: &[(Category, Vec<f64>)]) -> LatestData {
        LatestData { full_data: Some(pairs.iter().cloned().collect()), ..LatestData::default() }
    }

    #[test]
    fn test_single_nonzero_category_takes_everything() {
        let data = with_series(&[
            (Category::Labor, vec![1.0, 2.0, 3.0, 4.0]),
            (Category::Capital, vec![0.0]),
            (Category::Materials, vec![0.0]),
            (Category::Energy, vec![0.0]),
        ]);
        let allocation = normalize(&data);
        assert_eq!(allocation, CostAllocation::new(100.0, 0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_all_zero_falls_back_to_uniform() {
        assert_eq!(normalize(&LatestData::default()), CostAllocation::uniform());
        let data = with_series(&[(Category::Labor, vec![5.0, 0.0])]);
        assert_eq!(normalize(&data), CostAllocation::uniform());
    }

    #[test]
    fn test_uses_magnitudes() {
        let data = LatestData { labor: -3.0, capital: 1.0, ..LatestData::default() };
        let allocation = normalize(&data);
        assert_eq!(allocation.labor, 75.0);
        assert_eq!(allocation.capital, 25.0);
    }

    #[test]
    fn test_series_wins_over_scalar() {
        let data = LatestData {
            labor: 100.0,
            energy: 1.0,
            full_data: Some([(Category::Labor, vec![7.0, 1.0])].into_iter().collect()),
            ..LatestData::default()
        };
        assert_eq!(data.latest(Category::Labor), 1.0);
        assert_eq!(data.latest(Category::Energy), 1.0);
        assert_eq!(normalize(&data).labor, 50.0);
    }

    #[test]
    fn test_empty_series_falls_back_to_scalar() {
        let data = LatestData {
            capital: 2.0,
            full_data: Some([(Category::Capital, Vec::new())].into_iter().collect()),
            ..LatestData::default()
        };
        assert_eq!(data.latest(Category::Capital), 2.0);
    }

    #[test]
    fn test_rounding_remainder_goes_to_other() {
        let data = LatestData { labor: 1.0, capital: 1.0, materials: 1.0, ..LatestData::default() };
        let allocation = normalize(&data);
        assert_eq!(allocation.labor, 33.33);
        assert_eq!(allocation.capital, 33.33);
        assert_eq!(allocation.materials, 33.33);
        assert_eq!(allocation.other, 0.01);
        assert!((allocation.total() - 100.0).abs() < 1e-9);
        assert!(allocation.is_balanced());
    }

    #[test]
    fn test_overshooting_remainder_is_taken_from_largest_share() {
        let data = LatestData {
            labor: 0.24996,
            capital: 0.24996,
            materials: 0.24996,
            energy: 0.25012,
            ..LatestData::default()
        };
        let allocation = normalize(&data);
        assert_eq!(allocation, CostAllocation::new(25.0, 25.0, 25.0, 25.0, 0.0));
        assert!(allocation.is_balanced());
    }

    #[test]
    fn test_totals_are_exact_for_irregular_data() {
        let data = LatestData {
            labor: 0.731,
            capital: -2.113,
            materials: 5.5,
            energy: 0.004,
            other: 1.9,
            full_data: None,
        };
        let allocation = normalize(&data);
        assert!((allocation.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_deserializes_without_full_data() {
        let json = r#"{"labor": 4, "capital": 0, "materials": 0, "energy": 0}"#;
        let data: LatestData = serde_json::from_str(json).unwrap();
        assert_eq!(data.other, 0.0);
        assert!(data.full_data.is_none());
    }
}
