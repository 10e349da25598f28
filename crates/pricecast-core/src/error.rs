//! Error types for Pricecast Core.

use thiserror::Error;

/// Core error type for forecasting operations.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Allocation percentages do not add up to 100.
    #[error("Allocations must sum to 100% (currently {total:.2}%)")]
    AllocationSum {
        /// The running total of the five allocations.
        total: f64,
    },

    /// A numeric input was NaN or infinite.
    #[error("Non-finite value for {0}")]
    NonFinite(String),

    /// A coefficient key was missing from a coefficient map.
    #[error("Missing coefficient: {0}")]
    MissingCoefficient(String),

    /// A coefficient key did not name any category/lag pair.
    #[error("Unknown coefficient: {0}")]
    UnknownCoefficient(String),

    /// A category name could not be parsed.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The prediction or data service failed or was unreachable.
    #[error("Service error: {0}")]
    Backend(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForecastError {
    /// Returns true for failures the user can fix by editing inputs.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AllocationSum { .. }
                | Self::NonFinite(_)
                | Self::MissingCoefficient(_)
                | Self::UnknownCoefficient(_)
                | Self::UnknownCategory(_)
        )
    }
}

/// Result type alias for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_sum_message_shows_total() {
        let err = ForecastError::AllocationSum { total: 95.5 };
        let msg = format!("{}", err);
        assert!(msg.contains("sum to 100%"));
        assert!(msg.contains("95.50%"));
    }

    #[test]
    fn test_serialization_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: ForecastError = json_err.into();
        match err {
            ForecastError::Serialization(_) => {}
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_validation_classification() {
        assert!(ForecastError::AllocationSum { total: 90.0 }.is_validation());
        assert!(ForecastError::MissingCoefficient("labor_t".to_string()).is_validation());
        assert!(!ForecastError::Backend("connection refused".to_string()).is_validation());
    }
}
