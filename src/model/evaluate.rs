//! Cross-validated recipe comparison and final test-set evaluation

use polars::prelude::*;
use rayon::prelude::*;

use crate::error::{Result, VelostatError};
use crate::model::ols::{fit_ols, r_squared, rmse, Coefficient};
use crate::model::recipe::{build_recipe, design_matrix, response_vector, RecipeKind};
use crate::pipeline::split::{take_rows, TrainTestSplit};

/// Metrics of one validation fold.
#[derive(Debug, Clone)]
pub struct FoldMetrics {
    pub fold: usize,
    pub rmse: f64,
    pub r2: f64,
}

/// Cross-validation outcome for one recipe.
#[derive(Debug, Clone)]
pub struct RecipeComparison {
    pub kind: RecipeKind,
    pub fold_metrics: Vec<FoldMetrics>,
    pub mean_rmse: f64,
    pub rmse_se: f64,
    pub mean_r2: f64,
    pub r2_se: f64,
    /// Design-matrix width (including the intercept); the complexity
    /// measure used to break RMSE ties.
    pub n_terms: usize,
}

impl RecipeComparison {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Run k-fold cross-validation for every recipe over the daily table.
///
/// For each recipe x fold cell, the recipe and the model are fitted on the
/// other k-1 folds and evaluated on the held-out fold. The grid is
/// embarrassingly parallel and runs on the rayon pool. Fold metrics are
/// averaged per recipe; the standard error of the mean accompanies each
/// average.
pub fn cross_validate(
    daily: &DataFrame,
    folds: &[Vec<usize>],
    kinds: &[RecipeKind],
) -> Result<Vec<RecipeComparison>> {
    let grid: Vec<(usize, usize)> = (0..kinds.len())
        .flat_map(|ki| (0..folds.len()).map(move |fi| (ki, fi)))
        .collect();

    let cells: Vec<(usize, FoldMetrics)> = grid
        .par_iter()
        .map(|&(ki, fi)| {
            let metrics = evaluate_fold(daily, folds, kinds[ki], fi)?;
            Ok((ki, metrics))
        })
        .collect::<Result<_>>()?;

    let all_train: Vec<usize> = folds.iter().flatten().copied().collect();

    let mut comparisons = Vec::with_capacity(kinds.len());
    for (ki, &kind) in kinds.iter().enumerate() {
        let mut fold_metrics: Vec<FoldMetrics> = cells
            .iter()
            .filter(|(cell_ki, _)| *cell_ki == ki)
            .map(|(_, m)| m.clone())
            .collect();
        fold_metrics.sort_by_key(|m| m.fold);

        let rmses: Vec<f64> = fold_metrics.iter().map(|m| m.rmse).collect();
        let r2s: Vec<f64> = fold_metrics.iter().map(|m| m.r2).collect();
        let (mean_rmse, rmse_se) = mean_and_se(&rmses);
        let (mean_r2, r2_se) = mean_and_se(&r2s);

        comparisons.push(RecipeComparison {
            kind,
            fold_metrics,
            mean_rmse,
            rmse_se,
            mean_r2,
            r2_se,
            n_terms: count_terms(daily, &all_train, kind)?,
        });
    }

    Ok(comparisons)
}

fn evaluate_fold(
    daily: &DataFrame,
    folds: &[Vec<usize>],
    kind: RecipeKind,
    fold_idx: usize,
) -> Result<FoldMetrics> {
    let train_rows: Vec<usize> = folds
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != fold_idx)
        .flat_map(|(_, f)| f.iter().copied())
        .collect();
    let val_rows = &folds[fold_idx];

    let train_df = take_rows(daily, &train_rows)?;
    let val_df = take_rows(daily, val_rows)?;

    let mut recipe = build_recipe(kind);
    let train_t = recipe.fit_transform(&train_df)?;
    let val_t = recipe.transform(&val_df)?;

    let (x_train, terms) = design_matrix(&train_t)?;
    let y_train = response_vector(&train_t)?;
    let model = fit_ols(&x_train, &y_train, &terms)?;

    let (x_val, _) = design_matrix(&val_t)?;
    let y_val = response_vector(&val_t)?;
    let predicted = model.predict(&x_val);

    Ok(FoldMetrics {
        fold: fold_idx,
        rmse: rmse(&y_val, &predicted),
        r2: r_squared(&y_val, &predicted),
    })
}

fn count_terms(daily: &DataFrame, train_rows: &[usize], kind: RecipeKind) -> Result<usize> {
    let train_df = take_rows(daily, train_rows)?;
    let mut recipe = build_recipe(kind);
    let transformed = recipe.fit_transform(&train_df)?;
    let (_, terms) = design_matrix(&transformed)?;
    Ok(terms.len())
}

fn mean_and_se(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, (var / n).sqrt())
}

/// Pick the winning recipe: lowest mean cross-validated RMSE. Ties go to
/// the recipe with fewer design-matrix terms, then to the one declared
/// first.
pub fn select_best(comparisons: &[RecipeComparison]) -> Option<&RecipeComparison> {
    comparisons.iter().min_by(|a, b| {
        a.mean_rmse
            .partial_cmp(&b.mean_rmse)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.n_terms.cmp(&b.n_terms))
    })
}

/// Final refit of the selected recipe on the full training partition and a
/// single evaluation on the untouched test partition.
#[derive(Debug, Clone)]
pub struct FinalEvaluation {
    pub kind: RecipeKind,
    pub train_rmse: f64,
    pub train_r2: f64,
    pub test_rmse: f64,
    pub test_r2: f64,
    pub coefficients: Vec<Coefficient>,
}

impl FinalEvaluation {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Refit `kind` on the training partition, evaluate once on the test
/// partition, and extract the coefficient table.
pub fn evaluate_on_test(
    daily: &DataFrame,
    split: &TrainTestSplit,
    kind: RecipeKind,
) -> Result<FinalEvaluation> {
    if split.train.is_empty() || split.test.is_empty() {
        return Err(VelostatError::Fit(
            "both train and test partitions must be non-empty".to_string(),
        ));
    }

    let train_df = take_rows(daily, &split.train)?;
    let test_df = take_rows(daily, &split.test)?;

    let mut recipe = build_recipe(kind);
    let train_t = recipe.fit_transform(&train_df)?;
    let test_t = recipe.transform(&test_df)?;

    let (x_train, terms) = design_matrix(&train_t)?;
    let y_train = response_vector(&train_t)?;
    let model = fit_ols(&x_train, &y_train, &terms)?;

    let train_pred = model.predict(&x_train);

    let (x_test, _) = design_matrix(&test_t)?;
    let y_test = response_vector(&test_t)?;
    let test_pred = model.predict(&x_test);

    Ok(FinalEvaluation {
        kind,
        train_rmse: rmse(&y_train, &train_pred),
        train_r2: r_squared(&y_train, &train_pred),
        test_rmse: rmse(&y_test, &test_pred),
        test_r2: r_squared(&y_test, &test_pred),
        coefficients: model.coefficients,
    })
}
