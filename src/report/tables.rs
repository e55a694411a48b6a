//! Printed tables: diagnostics, model comparison, coefficients

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::model::evaluate::RecipeComparison;
use crate::model::ols::Coefficient;
use crate::pipeline::explore::NumericSummary;

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn header_cells(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

/// Per-column missing-entry counts.
pub fn print_missing_table(counts: &[(String, usize)]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header_cells(&["Column", "Missing"]));

    for (column, missing) in counts {
        table.add_row(vec![
            Cell::new(column),
            Cell::new(missing).fg(if *missing == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
    }

    print_indented(&table);
}

/// Mean/median/min/max/sd for every numeric column.
pub fn print_numeric_summary_table(summaries: &[NumericSummary]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header_cells(&["Column", "Mean", "Median", "Min", "Max", "Std"]));

    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.column),
            Cell::new(format!("{:.2}", s.mean)),
            Cell::new(format!("{:.2}", s.median)),
            Cell::new(format!("{:.2}", s.min)),
            Cell::new(format!("{:.2}", s.max)),
            Cell::new(format!("{:.2}", s.std)),
        ]);
    }

    print_indented(&table);
}

/// Frequency table for one label column.
pub fn print_level_counts_table(column: &str, counts: &[(String, usize)]) {
    println!(
        "      {} {}",
        style(column).cyan().bold(),
        style(format!("({} levels)", counts.len())).dim()
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header_cells(&["Level", "Rows"]));

    for (level, n) in counts {
        table.add_row(vec![Cell::new(level), Cell::new(n)]);
    }

    print_indented(&table);
}

/// Pearson correlation matrix over the daily numeric columns.
pub fn print_correlation_table(names: &[String], matrix: &[Vec<f64>]) {
    let mut header = vec![Cell::new("")];
    header.extend(names.iter().map(|n| Cell::new(n).add_attribute(Attribute::Bold)));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header);

    for (i, name) in names.iter().enumerate() {
        let mut row = vec![Cell::new(name).add_attribute(Attribute::Bold)];
        for j in 0..names.len() {
            let r = matrix[i][j];
            let cell = Cell::new(format!("{:+.2}", r));
            // Flag strong off-diagonal correlations
            let cell = if i != j && r.abs() > 0.7 {
                cell.fg(Color::Yellow)
            } else {
                cell
            };
            row.push(cell);
        }
        table.add_row(row);
    }

    print_indented(&table);
}

/// Cross-validated comparison of the three recipes.
pub fn print_comparison_table(comparisons: &[RecipeComparison], best: &RecipeComparison) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header_cells(&[
        "Recipe", "Terms", "RMSE", "RMSE SE", "R²", "R² SE",
    ]));

    for c in comparisons {
        let selected = c.kind == best.kind;
        let name_cell = if selected {
            Cell::new(format!("{} *", c.name()))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(c.name())
        };
        table.add_row(vec![
            name_cell,
            Cell::new(c.n_terms),
            Cell::new(format!("{:.3}", c.mean_rmse)),
            Cell::new(format!("{:.3}", c.rmse_se)),
            Cell::new(format!("{:.4}", c.mean_r2)),
            Cell::new(format!("{:.4}", c.r2_se)),
        ]);
    }

    print_indented(&table);
    println!(
        "      {} lowest cross-validated RMSE",
        style("* selected:").dim()
    );
}

/// Final coefficient table of the refitted model.
pub fn print_coefficient_table(coefficients: &[Coefficient]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header_cells(&[
        "Term", "Estimate", "Std Error", "t value", "Pr(>|t|)",
    ]));

    for c in coefficients {
        let p_cell = Cell::new(format!("{:.4}", c.p_value));
        let p_cell = if c.p_value < 0.05 {
            p_cell.fg(Color::Green)
        } else {
            p_cell
        };
        table.add_row(vec![
            Cell::new(&c.term),
            Cell::new(format!("{:.3}", c.estimate)),
            Cell::new(format!("{:.3}", c.std_error)),
            Cell::new(format!("{:.3}", c.t_value)),
            p_cell,
        ]);
    }

    print_indented(&table);
}
