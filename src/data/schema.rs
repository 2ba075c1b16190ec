//! Fixed feature/label schema and projection into ndarray

use crate::error::{DiabetesError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Model inputs, in matrix column order
pub const FEATURE_COLUMNS: [&str; 5] = ["Pregnancies", "Glucose", "BloodPressure", "BMI", "Age"];

/// Model target
pub const LABEL_COLUMN: &str = "Outcome";

/// Number of feature columns a fitted model expects
pub const N_FEATURES: usize = FEATURE_COLUMNS.len();

/// Feature names as owned strings, for metadata
pub fn feature_names() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect()
}

/// Names of required columns absent from `df`
pub fn missing_columns(df: &DataFrame) -> Vec<String> {
    let present: Vec<&str> = df.get_column_names().into_iter().map(|s| s.as_str()).collect();
    FEATURE_COLUMNS
        .iter()
        .chain(std::iter::once(&LABEL_COLUMN))
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect()
}

/// Project `df` onto the feature matrix and label vector.
///
/// Every required column is checked before any data is copied, so a bad
/// schema fails fast with the first missing name.
pub fn select(df: &DataFrame) -> Result<(Array2<f64>, Array1<f64>)> {
    if let Some(name) = missing_columns(df).into_iter().next() {
        return Err(DiabetesError::FeatureNotFound(name));
    }

    let x = columns_to_array2(df, &FEATURE_COLUMNS)?;
    let y = Array1::from_vec(column_to_vec(df, LABEL_COLUMN)?);

    Ok((x, y))
}

/// Extract named columns into a row-major `Array2<f64>`
pub fn columns_to_array2(df: &DataFrame, col_names: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| column_to_vec(df, name))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_data[c][r]))
}

// Nulls become 0.0, matching how the dataset encodes unmeasured values.
fn column_to_vec(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| DiabetesError::FeatureNotFound(name.to_string()))?;

    let as_f64 = column
        .cast(&DataType::Float64)
        .map_err(|e| DiabetesError::DataError(format!("{}: {}", name, e)))?;

    let values = as_f64
        .f64()
        .map_err(|e| DiabetesError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "Pregnancies" => &[6i64, 1, 8],
            "Glucose" => &[148i64, 85, 183],
            "BloodPressure" => &[72i64, 66, 64],
            "SkinThickness" => &[35i64, 29, 0],
            "BMI" => &[33.6, 26.6, 23.3],
            "Age" => &[50i64, 31, 32],
            "Outcome" => &[1i64, 0, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_select_fixed_order() {
        let (x, y) = select(&sample_df()).unwrap();

        assert_eq!(x.dim(), (3, 5));
        assert_eq!(x.row(0).to_vec(), vec![6.0, 148.0, 72.0, 33.6, 50.0]);
        assert_eq!(x.row(2).to_vec(), vec![8.0, 183.0, 64.0, 23.3, 32.0]);
        assert_eq!(y.to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_feature() {
        let df = sample_df().drop("BMI").unwrap();
        let err = select(&df).unwrap_err();
        assert!(matches!(err, DiabetesError::FeatureNotFound(ref n) if n == "BMI"));
    }

    #[test]
    fn test_missing_label() {
        let df = sample_df().drop("Outcome").unwrap();
        assert_eq!(missing_columns(&df), vec!["Outcome".to_string()]);
        assert!(matches!(select(&df), Err(DiabetesError::FeatureNotFound(_))));
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let mut df = sample_df();
        df.rename("Glucose", "glucose".into()).unwrap();
        assert_eq!(missing_columns(&df), vec!["Glucose".to_string()]);
    }
}
