//! Compile command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use pricecast_core::Category;
use pricecast_server::compile::{COMPILED_FILE, RAW_DATASETS, compile_dir, write_compiled};
use serde_json::json;

/// Execute the compile command.
///
/// Reads the raw datasets in `data_dir` and writes the compiled
/// percentage-change CSV (by default next to them).
pub fn execute(data_dir: &Path, output: Option<PathBuf>, json_output: bool) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| data_dir.join(COMPILED_FILE));
    let report = compile_dir(data_dir);
    if report.records.is_empty() {
        anyhow::bail!("No raw datasets could be compiled from {}", data_dir.display());
    }
    write_compiled(&output, &report.records)?;

    if json_output {
        let skipped: Vec<_> = report
            .skipped
            .iter()
            .map(|(category, reason)| json!({ "category": category, "reason": reason }))
            .collect();
        let output = json!({
            "output": output.display().to_string(),
            "rows": report.records.len(),
            "skipped": skipped,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Compiled Percentage Changes".bold().cyan());
    println!("  Output: {}", output.display().to_string().green());
    println!();

    let mut table = Table::new();
    table.set_header(vec!["Category", "Rows", "Latest change (%)"]);
    for (category, _) in RAW_DATASETS {
        let latest = report
            .records
            .iter()
            .rev()
            .find(|r| r.category == category)
            .map_or_else(|| "-".to_string(), |r| format!("{:.2}", r.pct_change));
        table.add_row(vec![
            Cell::new(category.display_name()),
            Cell::new(report.count(category).to_string()).set_alignment(CellAlignment::Right),
            Cell::new(latest).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    for (category, reason) in &report.skipped {
        println!("  {} {}: {}", "⚠".yellow(), category.display_name(), reason.dimmed());
    }
    if !report.skipped.is_empty() {
        println!("  {}", format!("{} has no dataset and stays at zero", Category::Other.display_name()).dimmed());
    }
    Ok(())
}
