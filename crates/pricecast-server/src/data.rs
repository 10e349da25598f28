//! Latest percentage-change history for the prediction API.
//!
//! The compiled CSV has one row per observation with columns
//! `category,date,value,pct_change`, sorted by category then date.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pricecast_core::{Category, History};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::compile::{compile_dir, write_compiled};
use crate::error::{Result, ServerError};

/// Observations kept per category.
const WINDOW: usize = 4;

/// Labor placeholder used until at least four labor rows exist.
const LABOR_PLACEHOLDER: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

/// Where the API reads its history from.
pub trait HistorySource: Send + Sync {
    fn load(&self) -> Result<History>;
}

/// Fixed in-memory history.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory(pub History);

impl HistorySource for StaticHistory {
    fn load(&self) -> Result<History> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CompiledRow {
    category: String,
    #[serde(default)]
    pct_change: Option<f64>,
}

/// Reads the compiled CSV on every load.
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    path: PathBuf,
}

impl CsvHistorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds the compiled CSV from the raw datasets next to it when it is absent.
    ///
    /// Returns `true` if a file was written. Nothing is written when no raw
    /// dataset yields a change.
    pub fn ensure_compiled(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        let data_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let report = compile_dir(data_dir);
        if report.records.is_empty() {
            warn!(dir = %data_dir.display(), "No raw datasets to compile");
            return Ok(false);
        }
        write_compiled(&self.path, &report.records)?;
        info!(path = %self.path.display(), skipped = report.skipped.len(), "Compiled missing history");
        Ok(true)
    }
}

impl HistorySource for CsvHistorySource {
    fn load(&self) -> Result<History> {
        if !self.path.exists() {
            return Err(ServerError::DataNotFound(self.path.display().to_string()));
        }
        let reader = csv::Reader::from_path(&self.path)?;
        let history = read_history(reader)?;
        debug!(path = %self.path.display(), "Loaded compiled history");
        Ok(history)
    }
}

/// Builds the API history from compiled rows.
///
/// Keeps the last four changes per category. Labor falls back to a
/// placeholder ramp when it has fewer than four rows; capital, materials and
/// energy fall back to zeros when empty; `other` is a manual channel and is
/// always zeros.
pub fn read_history<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<History> {
    let mut history = History::new();
    let mut collected: BTreeMap<Category, Vec<f64>> = BTreeMap::new();

    for row in reader.deserialize::<CompiledRow>() {
        let row = row?;
        let Some(change) = row.pct_change.filter(|v| v.is_finite()) else {
            continue;
        };
        match row.category.parse::<Category>() {
            Ok(category) => collected.entry(category).or_default().push(change),
            Err(_) => warn!(category = %row.category, "Skipping row with unknown category"),
        }
    }

    for category in Category::ALL {
        let values = collected.remove(&category).unwrap_or_default();
        let tail = values[values.len().saturating_sub(WINDOW)..].to_vec();
        let series = match category {
            Category::Labor if tail.len() < WINDOW => LABOR_PLACEHOLDER.to_vec(),
            Category::Other => vec![0.0; WINDOW],
            _ if tail.is_empty() => vec![0.0; WINDOW],
            _ => tail,
        };
        history.insert(category, series);
    }
    Ok(history)
}
