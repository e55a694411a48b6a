//! Terminal styling utilities for the analysis run

use console::style;
use std::path::Path;
use std::time::Duration;

/// Print the application banner with ASCII art
pub fn print_banner(version: &str) {
    let banner = r#"
    ██╗   ██╗███████╗██╗      ██████╗ ███████╗████████╗ █████╗ ████████╗
    ██║   ██║██╔════╝██║     ██╔═══██╗██╔════╝╚══██╔══╝██╔══██╗╚══██╔══╝
    ██║   ██║█████╗  ██║     ██║   ██║███████╗   ██║   ███████║   ██║
    ╚██╗ ██╔╝██╔══╝  ██║     ██║   ██║╚════██║   ██║   ██╔══██║   ██║
     ╚████╔╝ ███████╗███████╗╚██████╔╝███████║   ██║   ██║  ██║   ██║
      ╚═══╝  ╚══════╝╚══════╝ ╚═════╝ ╚══════╝   ╚═╝   ╚═╝  ╚═╝   ╚═╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Bike-share demand analysis and model comparison").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(
    input: &Path,
    encoding: &str,
    seed: u64,
    folds: usize,
    train_fraction: f64,
    report_path: &Path,
) {
    println!("    {}", style("Configuration").cyan().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!("      Input:          {}", truncate_path(input, 40));
    println!("      Encoding:       {}", style(encoding).yellow());
    println!("      Seed:           {}", style(seed).yellow());
    println!("      CV folds:       {}", style(folds).yellow());
    println!(
        "      Train fraction: {}",
        style(format!("{:.0}%", train_fraction * 100.0)).yellow()
    );
    println!("      Report:         {}", truncate_path(report_path, 40));
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", style("ℹ").cyan(), message);
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, extra: Option<&str>) {
    if let Some(info) = extra {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!(
            "      Found {} {}",
            style(count).yellow().bold(),
            description
        );
    }
}

/// Print the elapsed time of a pipeline step
pub fn print_step_time(elapsed: Duration) {
    println!("    {}", style(format!("took {:.2?}", elapsed)).dim());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        style("»").cyan(),
        style("Velostat analysis complete!").green().bold()
    );
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("...{}", &s[s.len() - max_len + 3..])
    }
}
