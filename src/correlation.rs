//! North Star Metric correlation and retention lift analysis

use polars::prelude::*;

use crate::data::{has_column, numeric_column};
use crate::error::{AnalysisError, Result};
use crate::stats::{pearson, spearman};

/// Correlation of one behavioral feature with the NSM target.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    pub feature: String,
    pub pearson: f64,
    pub pearson_p: f64,
    pub spearman: f64,
    pub spearman_p: f64,
    /// Rows with both the feature and the target present
    pub n_observations: usize,
}

/// Correlate each feature with `target` over pairwise-complete rows.
///
/// Features that are absent, have fewer than two paired observations or are
/// constant are skipped with a warning.
///
/// # Arguments
/// * `df` - User table loaded from the CSV export
/// * `target` - Name of the NSM column
/// * `features` - Behavioral columns to correlate, in report order
///
/// # Returns
/// * One `CorrelationResult` per usable feature, sorted by Pearson
///   coefficient, highest first
pub fn analyze_correlations(
    df: &DataFrame,
    target: &str,
    features: &[String],
) -> Vec<CorrelationResult> {
    let target_values = match numeric_column(df, target) {
        Ok(values) => values,
        Err(AnalysisError::MissingColumn(_)) => {
            for feature in features {
                log::warn!("Feature '{feature}' or NSM column '{target}' not found in data.");
            }
            return Vec::new();
        }
        Err(e) => {
            log::warn!("Cannot read NSM column '{target}': {e}");
            return Vec::new();
        }
    };

    let mut results: Vec<CorrelationResult> = features
        .iter()
        .filter_map(|feature| match correlate_feature(df, feature, &target_values) {
            Ok(result) => Some(result),
            Err(AnalysisError::MissingColumn(_)) => {
                log::warn!("Feature '{feature}' or NSM column '{target}' not found in data.");
                None
            }
            Err(e) => {
                log::warn!("Skipping correlation between {feature} and {target}: {e}");
                None
            }
        })
        .collect();

    results.sort_by(|a, b| b.pearson.total_cmp(&a.pearson));
    results
}

fn correlate_feature(
    df: &DataFrame,
    feature: &str,
    target_values: &[Option<f64>],
) -> Result<CorrelationResult> {
    let feature_values = numeric_column(df, feature)?;

    let (x, y): (Vec<f64>, Vec<f64>) = feature_values
        .iter()
        .zip(target_values)
        .filter_map(|(f, t)| Some(((*f)?, (*t)?)))
        .unzip();

    if x.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            context: format!("correlation of '{feature}'"),
            found: x.len(),
            required: 2,
        });
    }

    let linear = pearson(&x, &y).map_err(|e| describe(e, feature))?;
    let ranked = spearman(&x, &y).map_err(|e| describe(e, feature))?;

    Ok(CorrelationResult {
        feature: feature.to_string(),
        pearson: linear.coefficient,
        pearson_p: linear.p_value,
        spearman: ranked.coefficient,
        spearman_p: ranked.p_value,
        n_observations: x.len(),
    })
}

fn describe(error: AnalysisError, feature: &str) -> AnalysisError {
    match error {
        AnalysisError::ConstantInput(_) => AnalysisError::ConstantInput(format!("'{feature}'")),
        other => other,
    }
}

/// Retention of NSM achievers against non-achievers.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionSummary {
    /// Retention rate of achievers, in percent
    pub achiever_rate: f64,
    /// Retention rate of non-achievers, in percent
    pub non_achiever_rate: f64,
    /// Percentage lift of achievers over non-achievers; `+inf` when the
    /// non-achiever rate is zero
    pub lift: f64,
    pub achievers: usize,
    pub non_achievers: usize,
}

/// Compare mean retention between rows with `target == 1` and `target == 0`.
///
/// Rows whose target is missing or any other value are left out of both groups.
pub fn analyze_retention(df: &DataFrame, target: &str, retention: &str) -> Result<RetentionSummary> {
    for name in [target, retention] {
        if !has_column(df, name) {
            return Err(AnalysisError::MissingColumn(name.to_string()));
        }
    }

    let grouped = df
        .clone()
        .lazy()
        .select([
            col(target).cast(DataType::Float64).alias("nsm"),
            col(retention).cast(DataType::Float64).alias("retained"),
        ])
        .filter(col("nsm").eq(lit(1.0)).or(col("nsm").eq(lit(0.0))))
        .group_by([col("nsm").eq(lit(1.0)).alias("achiever")])
        .agg([
            col("retained").mean().alias("rate"),
            col("retained").count().alias("n"),
        ])
        .collect()?;

    let groups = grouped.column("achiever")?.bool()?;
    let rates = grouped.column("rate")?.f64()?;
    let counts = grouped.column("n")?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    let mut achievers: Option<(f64, usize)> = None;
    let mut non_achievers: Option<(f64, usize)> = None;
    for ((group, rate), count) in groups.into_iter().zip(rates).zip(counts) {
        let (Some(achiever), Some(rate), Some(count)) = (group, rate, count) else {
            continue;
        };
        let entry = Some((rate * 100.0, count as usize));
        if achiever {
            achievers = entry;
        } else {
            non_achievers = entry;
        }
    }

    let (achiever_rate, n_achievers) = achievers.ok_or_else(|| empty_group("NSM achievers"))?;
    let (non_achiever_rate, n_non_achievers) =
        non_achievers.ok_or_else(|| empty_group("NSM non-achievers"))?;

    let lift = if non_achiever_rate > 0.0 {
        (achiever_rate - non_achiever_rate) / non_achiever_rate * 100.0
    } else {
        f64::INFINITY
    };

    Ok(RetentionSummary {
        achiever_rate,
        non_achiever_rate,
        lift,
        achievers: n_achievers,
        non_achievers: n_non_achievers,
    })
}

fn empty_group(context: &str) -> AnalysisError {
    AnalysisError::InsufficientData {
        context: format!("retention rate of {context}"),
        found: 0,
        required: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    fn user_frame() -> DataFrame {
        df!(
            "nsm_achieved_week2" => &[1i64, 1, 1, 0, 0, 0, 1, 0],
            "retention_status_week_8" => &[1i64, 1, 0, 0, 1, 0, 1, 0],
            "image_downloads_week1" => &[12.0, 15.0, 9.0, 2.0, 3.0, 1.0, 11.0, 4.0],
            "num_searches_week1" => &[Some(1.0), None, Some(2.0), Some(8.0), Some(6.0), None, Some(3.0), Some(7.0)],
            "smart_crop_used_week1" => &[1i64, 1, 1, 1, 1, 1, 1, 1],
            "sparse_week1" => &[Some(1.0), None, None, None, None, None, None, None]
        )
        .unwrap()
    }

    #[test]
    fn test_correlations_sorted_descending() {
        let df = user_frame();
        let results = analyze_correlations(
            &df,
            "nsm_achieved_week2",
            &names(&["num_searches_week1", "image_downloads_week1"]),
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].feature, "image_downloads_week1");
        assert!(results[0].pearson > 0.0);
        assert_eq!(results[1].feature, "num_searches_week1");
        assert!(results[1].pearson < 0.0);
        assert_eq!(results[1].n_observations, 6);

        for r in &results {
            assert!((-1.0..=1.0).contains(&r.pearson));
            assert!((-1.0..=1.0).contains(&r.spearman));
            assert!((0.0..=1.0).contains(&r.pearson_p));
            assert!((0.0..=1.0).contains(&r.spearman_p));
        }
    }

    #[test]
    fn test_skips_missing_sparse_and_constant_features() {
        let df = user_frame();
        let results = analyze_correlations(
            &df,
            "nsm_achieved_week2",
            &names(&[
                "avg_session_time_min_week1",
                "sparse_week1",
                "smart_crop_used_week1",
                "image_downloads_week1",
            ]),
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].feature, "image_downloads_week1");
    }

    #[test]
    fn test_missing_target_skips_everything() {
        let df = user_frame();
        let results = analyze_correlations(&df, "no_target", &names(&["image_downloads_week1"]));
        assert!(results.is_empty());
    }

    #[test]
    fn test_retention_lift() {
        let df = user_frame();
        let summary = analyze_retention(&df, "nsm_achieved_week2", "retention_status_week_8").unwrap();

        assert_eq!(summary.achievers, 4);
        assert_eq!(summary.non_achievers, 4);
        assert_abs_diff_eq!(summary.achiever_rate, 75.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.non_achiever_rate, 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.lift, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_retention_lift_infinite_when_non_achievers_never_retain() {
        let df = df!(
            "nsm" => &[1i64, 1, 0, 0],
            "retained" => &[1i64, 0, 0, 0]
        )
        .unwrap();
        let summary = analyze_retention(&df, "nsm", "retained").unwrap();
        assert_abs_diff_eq!(summary.achiever_rate, 50.0, epsilon = 1e-9);
        assert_eq!(summary.non_achiever_rate, 0.0);
        assert!(summary.lift.is_infinite() && summary.lift > 0.0);
    }

    #[test]
    fn test_retention_ignores_non_binary_targets() {
        let df = df!(
            "nsm" => &[1.0, 1.0, 0.0, 0.0, 0.5, 0.7],
            "retained" => &[1i64, 1, 1, 0, 0, 0]
        )
        .unwrap();
        let summary = analyze_retention(&df, "nsm", "retained").unwrap();
        assert_eq!(summary.achievers, 2);
        assert_eq!(summary.non_achievers, 2);
        assert_abs_diff_eq!(summary.achiever_rate, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.non_achiever_rate, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.lift, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_retention_errors() {
        let df = user_frame();
        let missing = analyze_retention(&df, "nsm_achieved_week2", "retention_week_12");
        assert!(matches!(missing, Err(AnalysisError::MissingColumn(_))));

        let only_achievers = df!(
            "nsm" => &[1i64, 1],
            "retained" => &[1i64, 0]
        )
        .unwrap();
        let result = analyze_retention(&only_achievers, "nsm", "retained");
        assert!(matches!(result, Err(AnalysisError::InsufficientData { .. })));
    }
}
