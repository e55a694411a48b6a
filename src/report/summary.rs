//! Run summary report generation

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// Summary of one analysis run, printed at the end.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub hourly_rows: usize,
    pub daily_days: usize,
    pub train_days: usize,
    pub test_days: usize,
    pub folds: usize,
    pub selected_recipe: Option<&'static str>,
    pub test_rmse: Option<f64>,
    pub test_r2: Option<f64>,
    step_times: Vec<(String, Duration)>,
}

impl RunSummary {
    pub fn new(folds: usize) -> Self {
        Self {
            folds,
            ..Default::default()
        }
    }

    pub fn record_step(&mut self, name: &str, elapsed: Duration) {
        self.step_times.push((name.to_string(), elapsed));
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("▣").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("Hourly rows"), Cell::new(self.hourly_rows)]);
        table.add_row(vec![Cell::new("Operating days"), Cell::new(self.daily_days)]);
        table.add_row(vec![
            Cell::new("Train / test days"),
            Cell::new(format!("{} / {}", self.train_days, self.test_days)),
        ]);
        table.add_row(vec![Cell::new("CV folds"), Cell::new(self.folds)]);

        if let Some(recipe) = self.selected_recipe {
            table.add_row(vec![
                Cell::new("Selected recipe"),
                Cell::new(recipe).fg(Color::Green).add_attribute(Attribute::Bold),
            ]);
        }
        if let Some(rmse) = self.test_rmse {
            table.add_row(vec![
                Cell::new("Test RMSE"),
                Cell::new(format!("{:.3}", rmse)).fg(Color::Green),
            ]);
        }
        if let Some(r2) = self.test_r2 {
            table.add_row(vec![
                Cell::new("Test R²"),
                Cell::new(format!("{:.4}", r2)).fg(Color::Green),
            ]);
        }

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.step_times.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("◷").cyan(),
                style("STEP TIMINGS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for (name, elapsed) in &self.step_times {
                println!(
                    "      {:<24} {}",
                    name,
                    style(format!("{:.2?}", elapsed)).dim()
                );
            }
        }
    }
}
