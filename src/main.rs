//! Velostat: Bike-Share Demand Analysis CLI
//!
//! A one-shot batch job: load an hourly bike-rental log, clean and
//! aggregate it to daily records, explore it, then compare three
//! linear-regression feature recipes with cross-validation and report the
//! winning model's coefficients.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use velostat::cli::Cli;
use velostat::model::{cross_validate, evaluate_on_test, select_best, RecipeKind};
use velostat::pipeline::{
    aggregate_daily, clean_dataset, correlation_matrix, functioning_rental_total,
    k_fold_partition, level_counts, load_dataset_with_stats, missing_counts, numeric_summaries,
    stratified_split, DAILY_PREDICTORS, FUNC_DAY, HOLIDAY, MEAN_TEMP, MEAN_VISIBILITY, SEASON,
    TOTAL_RENT_BIKE,
};
use velostat::report::{
    export_model_report, print_coefficient_table, print_comparison_table,
    print_correlation_table, print_level_counts_table, print_missing_table,
    print_numeric_summary_table, print_rentals_histogram, print_scatter,
    print_season_holiday_bars, write_coefficients_csv, ExportParams, RunSummary,
};
use velostat::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.input,
        &cli.encoding,
        cli.seed,
        cli.folds,
        cli.train_fraction,
        &cli.model_report_path(),
    );

    let mut summary = RunSummary::new(cli.folds);

    // Step 1: Load the raw hourly table, decoding the non-UTF-8 export
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading and decoding input...");
    let (raw, rows, cols, memory_mb) =
        load_dataset_with_stats(&cli.input, &cli.encoding, cli.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    summary.hourly_rows = rows;
    summary.record_step("load", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 2: Rename, validate labels, parse dates
    print_step_header(2, "Clean");
    let step_start = Instant::now();
    let hourly = clean_dataset(raw)?;
    print_success("Columns renamed, labels validated, dates parsed");
    summary.record_step("clean", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 3: Diagnostics; nothing downstream depends on these
    print_step_header(3, "Explore");
    let step_start = Instant::now();

    let missing = missing_counts(&hourly);
    let total_missing: usize = missing.iter().map(|(_, n)| n).sum();
    println!("      Missing entries per column:");
    print_missing_table(&missing);
    if total_missing == 0 {
        print_info("No missing entries");
    }

    println!("\n      Numeric column summaries:");
    print_numeric_summary_table(&numeric_summaries(&hourly)?);

    println!("\n      Label column frequencies:");
    for column in [SEASON, HOLIDAY, FUNC_DAY] {
        print_level_counts_table(column, &level_counts(&hourly, column)?);
    }

    summary.record_step("explore", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 4: Reduce hours to one row per operating date
    print_step_header(4, "Aggregate to Daily Records");
    let step_start = Instant::now();
    let daily = aggregate_daily(&hourly)?;
    let conserved = functioning_rental_total(&hourly)?;
    print_count("operating day(s)", daily.height(), None);
    println!(
        "      Total rentals across all operating hours: {}",
        style(conserved).yellow()
    );
    summary.daily_days = daily.height();
    summary.record_step("aggregate", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 5: Descriptive charts and the correlation matrix
    print_step_header(5, "Describe");
    let step_start = Instant::now();

    if cli.no_charts {
        print_info("Charts suppressed (--no-charts)");
    } else {
        print_season_holiday_bars(&daily)?;
        print_rentals_histogram(&daily, 10)?;
        print_scatter(&daily, MEAN_TEMP, "mean temperature")?;
        print_scatter(&daily, MEAN_VISIBILITY, "mean visibility")?;
    }

    let mut corr_columns = vec![TOTAL_RENT_BIKE];
    corr_columns.extend(DAILY_PREDICTORS);
    let (corr_names, corr) = correlation_matrix(&daily, &corr_columns)?;
    println!("      Pearson correlations (daily records):");
    print_correlation_table(&corr_names, &corr);

    summary.record_step("describe", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 6: Seeded stratified split and fold assignment
    print_step_header(6, "Split");
    let step_start = Instant::now();
    let split = stratified_split(&daily, SEASON, cli.train_fraction, cli.seed)?;
    let folds = k_fold_partition(&split.train, cli.folds, cli.seed)?;
    println!(
        "      {} training days, {} test days (stratified by season, seed {})",
        style(split.train.len()).yellow(),
        style(split.test.len()).yellow(),
        cli.seed
    );
    println!(
        "      {} cross-validation folds of {}-{} days",
        style(folds.len()).yellow(),
        folds.iter().map(|f| f.len()).min().unwrap_or(0),
        folds.iter().map(|f| f.len()).max().unwrap_or(0)
    );
    summary.train_days = split.train.len();
    summary.test_days = split.test.len();
    summary.record_step("split", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 7: Cross-validated comparison of the three recipes
    print_step_header(7, "Compare Recipes");
    let step_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Fitting {} recipes x {} folds...",
        RecipeKind::ALL.len(),
        folds.len()
    ));
    let comparisons = cross_validate(&daily, &folds, &RecipeKind::ALL)?;
    finish_with_success(&spinner, "Cross-validation complete");

    let best = select_best(&comparisons)
        .ok_or_else(|| anyhow::anyhow!("no recipe produced cross-validation metrics"))?;
    print_comparison_table(&comparisons, best);
    summary.selected_recipe = Some(best.name());
    let best_kind = best.kind;
    summary.record_step("cross-validate", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 8: Refit the winner, evaluate once on the untouched test set
    print_step_header(8, "Final Model");
    let step_start = Instant::now();
    let evaluation = evaluate_on_test(&daily, &split, best_kind)?;

    println!(
        "      Recipe {} refitted on {} training days",
        style(evaluation.name()).green().bold(),
        split.train.len()
    );
    println!(
        "      Train RMSE {} / R² {}   Test RMSE {} / R² {}",
        style(format!("{:.3}", evaluation.train_rmse)).yellow(),
        style(format!("{:.4}", evaluation.train_r2)).yellow(),
        style(format!("{:.3}", evaluation.test_rmse)).green().bold(),
        style(format!("{:.4}", evaluation.test_r2)).green().bold(),
    );
    println!("\n      Coefficients:");
    print_coefficient_table(&evaluation.coefficients);

    let input_display = cli.input.display().to_string();
    let params = ExportParams {
        input_file: &input_display,
        encoding: &cli.encoding,
        seed: cli.seed,
        folds: cli.folds,
        train_fraction: cli.train_fraction,
        train_days: split.train.len(),
        test_days: split.test.len(),
    };
    export_model_report(&cli.model_report_path(), &params, &comparisons, &evaluation)?;
    write_coefficients_csv(&cli.coefficients_path(), &evaluation.coefficients)?;
    print_success(&format!(
        "Report written to {}",
        cli.model_report_path().display()
    ));
    print_success(&format!(
        "Coefficients written to {}",
        cli.coefficients_path().display()
    ));

    summary.test_rmse = Some(evaluation.test_rmse);
    summary.test_r2 = Some(evaluation.test_r2);
    summary.record_step("final model", step_start.elapsed());
    print_step_time(step_start.elapsed());

    summary.display();
    print_completion();

    Ok(())
}
