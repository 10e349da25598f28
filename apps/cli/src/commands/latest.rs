//! Latest data command implementation.

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use pricecast_core::{Category, ForecastBackend, normalize};
use serde_json::json;

use crate::backend::Backend;

/// Execute the latest command.
///
/// Shows the latest change per category and the allocation it normalizes to.
pub async fn execute(backend: &Backend, json_output: bool) -> anyhow::Result<()> {
    let data = backend.latest_data().await?;
    let allocation = normalize(&data);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&json!({ "data": data, "allocation": allocation }))?);
        return Ok(());
    }

    println!("{}", "Latest Data".bold().cyan());
    println!();

    let mut table = Table::new();
    table.set_header(vec!["Category", "Latest change (%)", "Observations", "Allocation (%)"]);
    for category in Category::ALL {
        let observations = data
            .full_data
            .as_ref()
            .and_then(|full| full.get(&category))
            .map_or(0, Vec::len);
        table.add_row(vec![
            Cell::new(category.display_name()),
            Cell::new(format!("{:.2}", data.latest(category))).set_alignment(CellAlignment::Right),
            Cell::new(observations.to_string()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", allocation.get(category))).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}
