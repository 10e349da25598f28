//! Compiles raw per-category value series into the percentage-change CSV
//! served by the API.

use std::path::Path;

use pricecast_core::Category;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Observations kept per raw dataset before differencing.
const RAW_WINDOW: usize = 5;

/// Raw input file per category. `other` has no dataset.
pub const RAW_DATASETS: [(Category, &str); 4] = [
    (Category::Capital, "capital_last5months.csv"),
    (Category::Energy, "energy_data_last5months.csv"),
    (Category::Labor, "labor_last5months.csv"),
    (Category::Materials, "materials_last5months.csv"),
];

/// Name of the compiled output inside the data directory.
pub const COMPILED_FILE: &str = "compiled_percentage_changes.csv";

#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    value: f64,
}

/// One row of the compiled CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRecord {
    pub category: Category,
    pub date: String,
    pub value: f64,
    pub pct_change: f64,
}

/// Outcome of compiling a data directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileReport {
    pub records: Vec<CompiledRecord>,
    /// Datasets left out, with the reason.
    pub skipped: Vec<(Category, String)>,
}

impl CompileReport {
    pub fn count(&self, category: Category) -> usize {
        self.records.iter().filter(|r| r.category == category).count()
    }
}

/// Percentage changes over the last five observations of one series.
///
/// Rows are ordered by date; the first kept observation only serves as the
/// base of the first change. Changes from a zero base are dropped.
pub fn percentage_changes(category: Category, mut rows: Vec<(String, f64)>) -> Vec<CompiledRecord> {
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    let tail = &rows[rows.len().saturating_sub(RAW_WINDOW)..];
    tail.windows(2)
        .filter_map(|pair| {
            let (_, base) = &pair[0];
            let (date, value) = &pair[1];
            let pct_change = (value / base - 1.0) * 100.0;
            pct_change.is_finite().then(|| CompiledRecord {
                category,
                date: date.clone(),
                value: *value,
                pct_change,
            })
        })
        .collect()
}

fn read_raw(path: &Path) -> std::result::Result<Vec<(String, f64)>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader.deserialize::<RawRow>().map(|row| row.map(|r| (r.date, r.value))).collect()
}

/// Compiles every raw dataset found in `data_dir`.
///
/// Missing or unreadable datasets are skipped and reported, not fatal.
pub fn compile_dir(data_dir: &Path) -> CompileReport {
    let mut report = CompileReport::default();
    for (category, file) in RAW_DATASETS {
        let path = data_dir.join(file);
        if !path.exists() {
            warn!(%category, file, "Missing raw dataset, skipping");
            report.skipped.push((category, format!("missing {}", file)));
            continue;
        }
        match read_raw(&path) {
            Ok(rows) => report.records.extend(percentage_changes(category, rows)),
            Err(e) => {
                warn!(%category, file, error = %e, "Unreadable raw dataset, skipping");
                report.skipped.push((category, e.to_string()));
            }
        }
    }
    report.records.sort_by(|a, b| {
        a.category.as_str().cmp(b.category.as_str()).then_with(|| a.date.cmp(&b.date))
    });
    report
}

/// Writes compiled records as `category,date,value,pct_change`.
pub fn write_compiled(path: &Path, records: &[CompiledRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "Wrote compiled percentage changes");
    Ok(())
}
