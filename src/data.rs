//! Data loading, mean imputation and standardization using Polars

use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;

use crate::error::{AnalysisError, Result};

/// Read a comma separated file with a header row into a DataFrame.
///
/// A path that does not resolve is reported as [`AnalysisError::DataNotFound`]
/// so callers can stop the pipeline early.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(AnalysisError::DataNotFound(path.to_path_buf()));
    }

    let df = CsvReader::new(File::open(path)?)
        .with_options(CsvReadOptions::default().with_has_header(true))
        .finish()?;

    log::debug!(
        "Loaded {} rows x {} columns from '{}'",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Extract a column as `f64`, with nulls and non-finite values as `None`.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    if !has_column(df, name) {
        return Err(AnalysisError::MissingColumn(name.to_string()));
    }
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(values)
}

/// Per-column standardization parameters, kept so centroids can be mapped
/// back to original units.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    /// Fit on the columns of `data` using the population standard deviation.
    /// Zero-variance columns get a scale of 1.0 and therefore standardize to 0.
    pub fn fit(data: &Array2<f64>) -> Self {
        let n_features = data.ncols();
        if data.nrows() == 0 {
            return Self {
                means: Array1::zeros(n_features),
                scales: Array1::ones(n_features),
            };
        }

        let means = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_features));
        let scales = data.std_axis(Axis(0), 0.0).mapv(|s| {
            if s.is_finite() && s > f64::EPSILON {
                s
            } else {
                1.0
            }
        });

        Self { means, scales }
    }

    pub fn transform(&self, data: Array2<f64>) -> Array2<f64> {
        (data - &self.means) / &self.scales
    }

    pub fn inverse_transform(&self, data: Array2<f64>) -> Array2<f64> {
        data * &self.scales + &self.means
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn scales(&self) -> &Array1<f64> {
        &self.scales
    }
}

/// Feature matrix ready for clustering.
#[derive(Debug)]
pub struct FeatureMatrix {
    /// Feature names in column order
    pub features: Vec<String>,
    /// Imputed values in original units (n_records, n_features)
    pub raw: Array2<f64>,
    /// Standardized values (n_records, n_features)
    pub scaled: Array2<f64>,
    /// Fitted scaler used to produce `scaled`
    pub scaler: StandardScaler,
    /// Number of missing cells filled with the column mean, per feature
    pub imputed: Vec<usize>,
}

impl FeatureMatrix {
    pub fn n_records(&self) -> usize {
        self.raw.nrows()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }
}

/// Select `features` from `df`, impute missing values with the column mean
/// and standardize every column.
///
/// # Arguments
/// * `df` - Customer usage table
/// * `features` - Ordered feature columns; the order is kept in the matrix
///
/// # Returns
/// * `FeatureMatrix` with imputed raw values, standardized values, the
///   fitted scaler and per-feature imputation counts
pub fn prepare_features(df: &DataFrame, features: &[String]) -> Result<FeatureMatrix> {
    let n_records = df.height();
    let mut raw = Array2::<f64>::zeros((n_records, features.len()));
    let mut imputed = Vec::with_capacity(features.len());

    for (j, feature) in features.iter().enumerate() {
        let values = numeric_column(df, feature)?;
        let (sum, count) = values
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        // An entirely missing column has no mean to impute with.
        let mean = if count > 0 { sum / count as f64 } else { 0.0 };

        let missing = n_records - count;
        if missing > 0 {
            log::debug!("Imputed {missing} missing values in '{feature}' with mean {mean:.4}");
        }
        imputed.push(missing);

        for (i, value) in values.into_iter().enumerate() {
            raw[[i, j]] = value.unwrap_or(mean);
        }
    }

    let scaler = StandardScaler::fit(&raw);
    let scaled = scaler.transform(raw.clone());

    Ok(FeatureMatrix {
        features: features.to_vec(),
        raw,
        scaled,
        scaler,
        imputed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "user_id,images_generated_monthly,api_calls_monthly,feature_x_used").unwrap();
        writeln!(file, "u1,120,5,1").unwrap();
        writeln!(file, "u2,,300,1").unwrap();
        writeln!(file, "u3,60,10,1").unwrap();
        writeln!(file, "u4,20,250,1").unwrap();
        file
    }

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_table_missing_file() {
        let result = load_table(Path::new("definitely/not/here.csv"));
        assert!(matches!(result, Err(AnalysisError::DataNotFound(_))));
    }

    #[test]
    fn test_load_table() {
        let file = create_test_csv();
        let df = load_table(file.path()).unwrap();
        assert_eq!(df.height(), 4);
        assert!(has_column(&df, "api_calls_monthly"));
        assert!(!has_column(&df, "templates_used_monthly"));
    }

    #[test]
    fn test_numeric_column_keeps_missing() {
        let file = create_test_csv();
        let df = load_table(file.path()).unwrap();
        let values = numeric_column(&df, "images_generated_monthly").unwrap();
        assert_eq!(values, vec![Some(120.0), None, Some(60.0), Some(20.0)]);

        let missing = numeric_column(&df, "nope");
        assert!(matches!(missing, Err(AnalysisError::MissingColumn(_))));
    }

    #[test]
    fn test_prepare_features_imputes_and_standardizes() {
        let file = create_test_csv();
        let df = load_table(file.path()).unwrap();
        let matrix = prepare_features(
            &df,
            &names(&["images_generated_monthly", "api_calls_monthly", "feature_x_used"]),
        )
        .unwrap();

        assert_eq!(matrix.scaled.shape(), &[4, 3]);
        assert_eq!(matrix.imputed, vec![1, 0, 0]);
        // mean of 120, 60, 20
        assert_abs_diff_eq!(matrix.raw[[1, 0]], 200.0 / 3.0, epsilon = 1e-9);

        for j in 0..2 {
            let column = matrix.scaled.column(j);
            assert_abs_diff_eq!(column.mean().unwrap(), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(column.std(0.0), 1.0, epsilon = 1e-9);
        }

        // constant indicator column collapses to zero
        assert!(matrix.scaled.column(2).iter().all(|&v| v == 0.0));
        assert_abs_diff_eq!(matrix.scaler.scales()[2], 1.0);
    }

    #[test]
    fn test_scaler_round_trip() {
        let data = Array2::from_shape_vec((3, 2), vec![1.0, 10.0, 2.0, 10.0, 3.0, 10.0]).unwrap();
        let scaler = StandardScaler::fit(&data);
        let restored = scaler.inverse_transform(scaler.transform(data.clone()));
        for (a, b) in restored.iter().zip(data.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(scaler.means()[0], 2.0);
    }
}
