//! Coefficients command implementation.

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color, Table};
use pricecast_core::{Category, CoefficientSet, Lag, Level, numeric_to_level};

use crate::backend::Backend;

fn level_color(level: Level) -> Color {
    match level {
        Level::Low => Color::Green,
        Level::Medium => Color::Yellow,
        Level::High => Color::Red,
    }
}

/// Renders a coefficient set as a category by lag table with levels.
pub fn render(coefficients: &CoefficientSet) -> Table {
    let mut table = Table::new();
    let mut header = vec!["Category".to_string()];
    header.extend(Lag::ALL.iter().map(|lag| lag.label().to_string()));
    table.set_header(header);

    for category in Category::ALL {
        let mut row = vec![Cell::new(category.display_name())];
        for lag in Lag::ALL {
            let value = coefficients.get(category, lag);
            let level = numeric_to_level(value);
            row.push(
                Cell::new(format!("{:+.2} ({})", value, level))
                    .fg(level_color(level))
                    .set_alignment(CellAlignment::Right),
            );
        }
        table.add_row(row);
    }
    table
}

/// Execute the coefficients command.
///
/// With `signed`, t-2 and t-3 weights are shown with their effective sign.
pub async fn execute(backend: &Backend, signed: bool, json_output: bool) -> anyhow::Result<()> {
    let mut coefficients = backend.default_coefficients().await?;
    if signed {
        coefficients = coefficients.to_signed();
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&coefficients)?);
        return Ok(());
    }

    println!("{}", "Default Coefficients".bold().cyan());
    println!("  Convention: {}", format!("{:?}", coefficients.convention()).to_lowercase().yellow());
    println!();
    println!("{}", render(&coefficients));
    Ok(())
}
