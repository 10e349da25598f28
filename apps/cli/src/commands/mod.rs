//! Command implementations for the Pricecast CLI.

pub mod coefficients;
pub mod compile;
pub mod health;
pub mod latest;
pub mod predict;

pub use predict::PredictArgs;
