//! Feature recipes: declarative, composable transformation pipelines
//!
//! A recipe is an ordered list of transform steps. Each step estimates its
//! parameters on training rows only (`fit`) and is then applied unchanged to
//! any other subset (`apply`), so no statistic ever leaks from validation or
//! test rows into the features.

use faer::Mat;
use polars::prelude::*;

use crate::error::{Result, VelostatError};
use crate::pipeline::aggregate::{DAILY_PREDICTORS, MEAN_TEMP, TOTAL_RAIN, TOTAL_RENT_BIKE};
use crate::pipeline::clean::{Holiday, Season, DATE, HOLIDAY, SEASON};

/// Derived day-type column and its levels. The first level is the
/// drop-first baseline.
pub const WEEKEND: &str = "weekend";
pub const WEEKEND_LEVELS: [&str; 2] = ["Weekday", "Weekend"];

/// Intercept term name, first column of every design matrix.
pub const INTERCEPT: &str = "(Intercept)";

/// One composable transformation over the daily table.
pub trait TransformStep: Send + Sync {
    fn name(&self) -> &'static str;

    /// Estimate parameters from training rows. Steps without parameters are
    /// no-ops here.
    fn fit(&mut self, df: &DataFrame) -> Result<()>;

    /// Apply the step without re-estimating anything.
    fn apply(&self, df: &DataFrame) -> Result<DataFrame>;
}

/// Adds a Weekday/Weekend label derived from the date column
/// (weekend = Saturday or Sunday).
struct DeriveWeekend;

impl TransformStep for DeriveWeekend {
    fn name(&self) -> &'static str {
        "derive_weekend"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        // polars weekday(): Monday = 1 .. Sunday = 7
        let out = df
            .clone()
            .lazy()
            .with_column(
                when(col(DATE).dt().weekday().gt(lit(5)))
                    .then(lit(WEEKEND_LEVELS[1]))
                    .otherwise(lit(WEEKEND_LEVELS[0]))
                    .alias(WEEKEND),
            )
            .collect()?;
        Ok(out)
    }
}

/// Z-score normalization with mean/sd estimated on training rows only.
struct Standardize {
    columns: Vec<String>,
    stats: Option<Vec<(f64, f64)>>,
}

impl Standardize {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            stats: None,
        }
    }
}

impl TransformStep for Standardize {
    fn name(&self) -> &'static str {
        "standardize"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut stats = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let values = numeric_column(df, column)?;
            let n = values.len();
            if n < 2 {
                return Err(VelostatError::Fit(format!(
                    "cannot standardize '{}' from {} row(s)",
                    column, n
                )));
            }
            let mean = values.iter().sum::<f64>() / n as f64;
            let var =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            let sd = var.sqrt();
            if sd == 0.0 || !sd.is_finite() {
                return Err(VelostatError::Fit(format!(
                    "constant predictor '{}' cannot be standardized",
                    column
                )));
            }
            stats.push((mean, sd));
        }
        self.stats = Some(stats);
        Ok(())
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let stats = self.stats.as_ref().ok_or_else(|| {
            VelostatError::Fit("standardization applied before fitting".to_string())
        })?;

        let exprs: Vec<Expr> = self
            .columns
            .iter()
            .zip(stats.iter())
            .map(|(column, &(mean, sd))| {
                ((col(column.as_str()) - lit(mean)) / lit(sd)).alias(column.as_str())
            })
            .collect();

        let out = df.clone().lazy().with_columns(exprs).collect()?;
        Ok(out)
    }
}

/// Drop-first indicator encoding of a label column with a fixed level set.
///
/// Levels come from the column's enum definition, not from the data, so
/// every subset - however small - produces exactly the same indicator
/// columns. The first level is the baseline and gets no column.
struct OneHot {
    column: String,
    levels: Vec<String>,
}

impl OneHot {
    fn new(column: &str, levels: &[&str]) -> Self {
        Self {
            column: column.to_string(),
            levels: levels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl TransformStep for OneHot {
    fn name(&self) -> &'static str {
        "one_hot"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let exprs: Vec<Expr> = self.levels[1..]
            .iter()
            .map(|level| {
                when(col(self.column.as_str()).eq(lit(level.as_str())))
                    .then(lit(1.0))
                    .otherwise(lit(0.0))
                    .alias(indicator_name(&self.column, level))
            })
            .collect();

        let out = df.clone().lazy().with_columns(exprs).collect()?;
        Ok(out.drop(&self.column)?)
    }
}

/// Pairwise product terms between existing numeric columns.
struct Interactions {
    pairs: Vec<(String, String)>,
}

impl TransformStep for Interactions {
    fn name(&self) -> &'static str {
        "interactions"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let exprs: Vec<Expr> = self
            .pairs
            .iter()
            .map(|(a, b)| {
                (col(a.as_str()) * col(b.as_str())).alias(format!("{}_x_{}", a, b))
            })
            .collect();

        let out = df.clone().lazy().with_columns(exprs).collect()?;
        Ok(out)
    }
}

/// Degree-2 polynomial expansion: a squared term per column.
struct Polynomial {
    columns: Vec<String>,
}

impl TransformStep for Polynomial {
    fn name(&self) -> &'static str {
        "polynomial"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let exprs: Vec<Expr> = self
            .columns
            .iter()
            .map(|c| (col(c.as_str()) * col(c.as_str())).alias(format!("{}_sq", c)))
            .collect();

        let out = df.clone().lazy().with_columns(exprs).collect()?;
        Ok(out)
    }
}

/// Indicator column name for a level of a label column,
/// e.g. ("holiday", "No Holiday") -> "holiday_no_holiday".
pub fn indicator_name(column: &str, level: &str) -> String {
    let slug: String = level
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", column, slug)
}

/// The three model specifications compared by cross-validation, in
/// increasing order of complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeKind {
    /// Weekend derivation, standardization, indicator encoding.
    Base,
    /// Base plus season x holiday, season x temperature, and
    /// temperature x rainfall product terms.
    Interactions,
    /// Interactions plus squared terms for all continuous predictors.
    Polynomial,
}

impl RecipeKind {
    pub const ALL: [RecipeKind; 3] = [
        RecipeKind::Base,
        RecipeKind::Interactions,
        RecipeKind::Polynomial,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecipeKind::Base => "base",
            RecipeKind::Interactions => "interactions",
            RecipeKind::Polynomial => "polynomial",
        }
    }
}

/// An ordered transformation pipeline over the daily table.
pub struct Recipe {
    kind: RecipeKind,
    steps: Vec<Box<dyn TransformStep>>,
    fitted: bool,
}

impl Recipe {
    pub fn kind(&self) -> RecipeKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Estimate every step's parameters from training rows, feeding each
    /// step the output of the previous ones.
    pub fn fit(&mut self, train: &DataFrame) -> Result<()> {
        let mut current = train.clone();
        for step in &mut self.steps {
            step.fit(&current)?;
            current = step.apply(&current)?;
        }
        self.fitted = true;
        Ok(())
    }

    /// Apply the fitted steps to any subset without re-estimation.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.fitted {
            return Err(VelostatError::Fit(format!(
                "recipe '{}' applied before fitting",
                self.name()
            )));
        }
        let mut current = df.clone();
        for step in &self.steps {
            current = step.apply(&current)?;
        }
        Ok(current)
    }

    /// Fit on training rows and return their transformed frame.
    pub fn fit_transform(&mut self, train: &DataFrame) -> Result<DataFrame> {
        self.fit(train)?;
        self.transform(train)
    }
}

/// Build an unfitted recipe of the given kind.
pub fn build_recipe(kind: RecipeKind) -> Recipe {
    let mut steps: Vec<Box<dyn TransformStep>> = vec![
        Box::new(DeriveWeekend),
        Box::new(Standardize::new(&DAILY_PREDICTORS)),
        Box::new(OneHot::new(SEASON, &Season::LEVELS)),
        Box::new(OneHot::new(HOLIDAY, &Holiday::LEVELS)),
        Box::new(OneHot::new(WEEKEND, &WEEKEND_LEVELS)),
    ];

    if kind != RecipeKind::Base {
        steps.push(Box::new(Interactions {
            pairs: interaction_pairs(),
        }));
    }
    if kind == RecipeKind::Polynomial {
        steps.push(Box::new(Polynomial {
            columns: DAILY_PREDICTORS.iter().map(|c| c.to_string()).collect(),
        }));
    }

    Recipe {
        kind,
        steps,
        fitted: false,
    }
}

/// Product-term pairs of the interactions recipe: every season indicator
/// against the holiday indicator and against mean temperature, plus mean
/// temperature against total rainfall.
fn interaction_pairs() -> Vec<(String, String)> {
    let season_indicators: Vec<String> = Season::LEVELS[1..]
        .iter()
        .map(|level| indicator_name(SEASON, level))
        .collect();
    let holiday_indicator = indicator_name(HOLIDAY, Holiday::LEVELS[1]);

    let mut pairs = Vec::new();
    for s in &season_indicators {
        pairs.push((s.clone(), holiday_indicator.clone()));
    }
    for s in &season_indicators {
        pairs.push((s.clone(), MEAN_TEMP.to_string()));
    }
    pairs.push((MEAN_TEMP.to_string(), TOTAL_RAIN.to_string()));
    pairs
}

/// Extract a numeric column as f64 values. Nulls are a schema defect at
/// this point in the pipeline.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let ca = df.column(name)?.cast(&DataType::Float64)?;
    ca.f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                VelostatError::Schema(format!("null value in numeric column '{}'", name))
            })
        })
        .collect()
}

/// Build the design matrix from a transformed frame: an intercept column
/// followed by every numeric feature column in frame order (the response
/// and the date are excluded).
pub fn design_matrix(df: &DataFrame) -> Result<(Mat<f64>, Vec<String>)> {
    let mut names = vec![INTERCEPT.to_string()];
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == TOTAL_RENT_BIKE || !column.dtype().is_primitive_numeric() {
            continue;
        }
        names.push(name.to_string());
        columns.push(numeric_column(df, name)?);
    }

    let n_rows = df.height();
    let n_cols = columns.len() + 1;
    let x = Mat::from_fn(n_rows, n_cols, |i, j| {
        if j == 0 {
            1.0
        } else {
            columns[j - 1][i]
        }
    });

    Ok((x, names))
}

/// Extract the response column (total rented bikes) as f64.
pub fn response_vector(df: &DataFrame) -> Result<Vec<f64>> {
    numeric_column(df, TOTAL_RENT_BIKE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_names() {
        assert_eq!(indicator_name(SEASON, "Spring"), "season_spring");
        assert_eq!(indicator_name(HOLIDAY, "No Holiday"), "holiday_no_holiday");
        assert_eq!(indicator_name(WEEKEND, "Weekend"), "weekend_weekend");
    }

    #[test]
    fn test_recipe_rejects_transform_before_fit() {
        let recipe = build_recipe(RecipeKind::Base);
        let df = df! { "x" => [1.0f64] }.unwrap();
        let err = recipe.transform(&df).unwrap_err();
        assert!(matches!(err, VelostatError::Fit(_)));
    }

    #[test]
    fn test_recipe_kind_order() {
        assert_eq!(RecipeKind::ALL[0].name(), "base");
        assert_eq!(RecipeKind::ALL[1].name(), "interactions");
        assert_eq!(RecipeKind::ALL[2].name(), "polynomial");
    }

    #[test]
    fn test_interaction_pairs_complete() {
        let pairs = interaction_pairs();
        // 3 season x holiday, 3 season x temperature, 1 temperature x rain
        assert_eq!(pairs.len(), 7);
        assert!(pairs.contains(&("season_spring".to_string(), "holiday_holiday".to_string())));
        assert!(pairs.contains(&("season_autumn".to_string(), "mean_temp".to_string())));
        assert!(pairs.contains(&("mean_temp".to_string(), "total_rain".to_string())));
    }
}
