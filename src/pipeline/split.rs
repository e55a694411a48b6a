//! Stratified train/test splitting and k-fold partitioning
//!
//! All randomness is driven by an explicit seed so every reported metric is
//! reproducible across runs.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use crate::error::{Result, VelostatError};

/// Disjoint train/test row-index partitions of a dataframe.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices into train/test partitions, stratified by the given
/// label column.
///
/// Within each stratum, `round(train_fraction * n)` shuffled rows go to the
/// training partition and the rest to the test partition, so each level's
/// proportion is preserved within rounding. The partitions are disjoint and
/// together cover every row exactly once.
pub fn stratified_split(
    df: &DataFrame,
    stratify_column: &str,
    train_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(VelostatError::Fit(format!(
            "train fraction must be in (0, 1), got {}",
            train_fraction
        )));
    }

    let labels = df.column(stratify_column)?.str().map_err(|_| {
        VelostatError::Schema(format!(
            "stratification column '{}' is not a text column",
            stratify_column
        ))
    })?;

    // Strata iterated in sorted-label order so the shuffle sequence is
    // stable for a given seed.
    let mut strata: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.into_iter().enumerate() {
        let label = label.ok_or_else(|| VelostatError::Parse {
            what: format!("column '{}'", stratify_column),
            message: format!("missing value at row {}", idx),
        })?;
        strata.entry(label.to_string()).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for indices in strata.values() {
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);

        let n_train = ((shuffled.len() as f64) * train_fraction).round() as usize;
        let n_train = n_train.min(shuffled.len());

        train.extend_from_slice(&shuffled[..n_train]);
        test.extend_from_slice(&shuffled[n_train..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    Ok(TrainTestSplit { train, test })
}

/// Partition `indices` into `n_folds` disjoint folds of near-equal size
/// (difference at most one row).
///
/// Indices are shuffled with the seeded generator, then dealt into
/// contiguous chunks; the first `len % n_folds` folds take the extra row.
pub fn k_fold_partition(indices: &[usize], n_folds: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
    if n_folds < 2 {
        return Err(VelostatError::Fit(format!(
            "cross-validation needs at least 2 folds, got {}",
            n_folds
        )));
    }
    if indices.len() < n_folds {
        return Err(VelostatError::Fit(format!(
            "cannot build {} folds from {} training rows",
            n_folds,
            indices.len()
        )));
    }

    let mut shuffled = indices.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let base = shuffled.len() / n_folds;
    let remainder = shuffled.len() % n_folds;

    let mut folds = Vec::with_capacity(n_folds);
    let mut start = 0;
    for fold_idx in 0..n_folds {
        let size = if fold_idx < remainder { base + 1 } else { base };
        folds.push(shuffled[start..start + size].to_vec());
        start += size;
    }

    Ok(folds)
}

/// Materialize the rows at the given indices, in the given order.
pub fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), rows.iter().map(|&i| i as IdxSize).collect());
    Ok(df.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_frame(per_season: usize) -> DataFrame {
        let mut labels = Vec::new();
        for season in ["Winter", "Spring", "Summer", "Autumn"] {
            labels.extend(std::iter::repeat(season).take(per_season));
        }
        let values: Vec<f64> = (0..labels.len()).map(|i| i as f64).collect();
        df! {
            "season" => labels,
            "value" => values,
        }
        .unwrap()
    }

    #[test]
    fn test_split_partitions_exactly() {
        let df = seasonal_frame(20);
        let split = stratified_split(&df, "season", 0.75, 42).unwrap();

        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..80).collect::<Vec<_>>());
        assert!(split.train.iter().all(|i| !split.test.contains(i)));
    }

    #[test]
    fn test_split_preserves_stratum_proportions() {
        let df = seasonal_frame(20);
        let split = stratified_split(&df, "season", 0.75, 42).unwrap();

        // 20 rows per season: exactly 15 train / 5 test in each stratum.
        for stratum in 0..4 {
            let range = (stratum * 20)..((stratum + 1) * 20);
            let in_train = split.train.iter().filter(|&i| range.contains(i)).count();
            assert_eq!(in_train, 15);
        }
        assert_eq!(split.train.len(), 60);
        assert_eq!(split.test.len(), 20);
    }

    #[test]
    fn test_split_is_reproducible() {
        let df = seasonal_frame(10);
        let a = stratified_split(&df, "season", 0.75, 7).unwrap();
        let b = stratified_split(&df, "season", 0.75, 7).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.test, b.test);

        let c = stratified_split(&df, "season", 0.75, 8).unwrap();
        assert!(a.train != c.train || a.test != c.test);
    }

    #[test]
    fn test_folds_partition_training_set() {
        let indices: Vec<usize> = (0..63).collect();
        let folds = k_fold_partition(&indices, 10, 42).unwrap();

        assert_eq!(folds.len(), 10);

        let sizes: Vec<usize> = folds.iter().map(|f| f.len()).collect();
        let min = sizes.iter().min().unwrap();
        let max = sizes.iter().max().unwrap();
        assert!(max - min <= 1, "fold sizes {:?}", sizes);

        let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, indices);
    }

    #[test]
    fn test_too_few_rows_for_folds() {
        let indices: Vec<usize> = (0..5).collect();
        assert!(k_fold_partition(&indices, 10, 42).is_err());
    }

    #[test]
    fn test_take_rows_selects_in_order() {
        let df = df! {
            "x" => [10i64, 20, 30, 40],
        }
        .unwrap();

        let taken = take_rows(&df, &[3, 1]).unwrap();
        let xs: Vec<i64> = taken.column("x").unwrap().i64().unwrap().into_iter().flatten().collect();
        assert_eq!(xs, vec![40, 20]);
    }
}
