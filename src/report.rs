//! Console reports for both analyses

use crate::correlation::{CorrelationResult, RetentionSummary};
use crate::data::FeatureMatrix;
use crate::error::AnalysisError;
use crate::persona::strategy_for;
use crate::pipeline::{CorrelationOutcome, SegmentationOutcome};

/// Print centroids, cluster sizes, persona labels and engagement strategies.
pub fn print_segmentation_report(outcome: &SegmentationOutcome) {
    let model = &outcome.model;
    let total = outcome.matrix.n_records();

    print!("{}", format_imputation(&outcome.matrix));

    println!("\n--- Cluster Centroids (Mean Feature Values for Each Cluster) ---");
    println!("These values represent the 'average' user for each cluster, on the original scale.");
    print!("{}", format_centroid_table(outcome));

    println!("\n=== Cluster Statistics ===");
    for (i, &size) in model.cluster_sizes().iter().enumerate() {
        let percentage = if total > 0 {
            size as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        println!("Cluster {}: {} customers ({:.1}%)", i, size, percentage);
    }
    println!("Within-cluster sum of squares: {:.2}", model.inertia);

    println!("\n--- Interpreted Cluster Labels ---");
    for (cluster, label) in outcome.labels.iter().enumerate() {
        println!("Cluster {}: {}", cluster, label);
    }

    println!("\n--- Proposing Engagement Strategies for Each Cluster ---");
    for (cluster, label) in outcome.labels.iter().enumerate() {
        println!("\nCluster {}: **{}**", cluster, label);
        println!("- Strategy: {}", strategy_for(label));
    }
}

/// Missing cells filled with the column mean, one line per imputed feature.
pub fn format_imputation(matrix: &FeatureMatrix) -> String {
    let total = matrix.n_records();
    let imputed: Vec<(&String, usize)> = matrix
        .features
        .iter()
        .zip(matrix.imputed.iter().copied())
        .filter(|(_, count)| *count > 0)
        .collect();

    if imputed.is_empty() {
        return format!("\nNo missing values among {} customers.\n", total);
    }

    let mut out = String::from("\n--- Missing Values Imputed With Column Mean ---\n");
    for (feature, count) in imputed {
        out.push_str(&format!("{}: {} of {} values\n", feature, count, total));
    }
    out
}

fn format_centroid_table(outcome: &SegmentationOutcome) -> String {
    let features = &outcome.model.features;
    let widths: Vec<usize> = features.iter().map(|f| f.len().max(10)).collect();

    let mut out = format!("{:>7}", "cluster");
    for (feature, width) in features.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", feature, width = width));
    }
    out.push('\n');

    for (cluster, row) in outcome.model.original_centroids.outer_iter().enumerate() {
        out.push_str(&format!("{:>7}", cluster));
        for (value, width) in row.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$.4}", value, width = width));
        }
        out.push('\n');
    }
    out
}

/// Print the sorted correlation table and the retention comparison.
pub fn print_correlation_report(outcome: &CorrelationOutcome) {
    println!("\n--- Correlation Results with NSM ---");
    if outcome.correlations.is_empty() {
        println!("No features could be correlated with '{}'.", outcome.target);
    } else {
        print!("{}", format_correlation_table(&outcome.correlations));
    }

    match &outcome.retention {
        Ok(summary) => print!("{}", format_retention(summary)),
        Err(AnalysisError::MissingColumn(column)) => {
            println!("\nCannot perform retention analysis: column '{column}' not found in data.");
        }
        Err(e) => println!("\nCannot perform retention analysis: {e}"),
    }
}

pub fn format_correlation_table(results: &[CorrelationResult]) -> String {
    let name_width = results
        .iter()
        .map(|r| r.feature.len())
        .max()
        .unwrap_or(0)
        .max("Feature".len());

    let mut out = format!(
        "{:<name_width$}  {:>12}  {:>12}  {:>12}  {:>12}  {:>6}\n",
        "Feature", "Pearson_r", "Pearson_p", "Spearman_rho", "Spearman_p", "n",
    );
    for r in results {
        out.push_str(&format!(
            "{:<name_width$}  {:>12.6}  {:>12.6e}  {:>12.6}  {:>12.6e}  {:>6}\n",
            r.feature, r.pearson, r.pearson_p, r.spearman, r.spearman_p, r.n_observations,
        ));
    }
    out
}

pub fn format_retention(summary: &RetentionSummary) -> String {
    format!(
        "\n--- Retention Analysis (NSM Achievers vs. Non-Achievers) ---\n\
         Retention Rate for NSM Achievers: {:.2}% (n={})\n\
         Retention Rate for Non-NSM Achievers: {:.2}% (n={})\n\
         Retention Lift for NSM Achievers: {:.2}%\n",
        summary.achiever_rate,
        summary.achievers,
        summary.non_achiever_rate,
        summary.non_achievers,
        summary.lift,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_with_imputed(imputed: Vec<usize>) -> FeatureMatrix {
        let raw = ndarray::Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let scaler = crate::data::StandardScaler::fit(&raw);
        FeatureMatrix {
            features: vec![
                "images_generated_monthly".to_string(),
                "api_calls_monthly".to_string(),
            ],
            scaled: scaler.transform(raw.clone()),
            raw,
            scaler,
            imputed,
        }
    }

    #[test]
    fn test_format_imputation_lists_filled_columns() {
        let text = format_imputation(&matrix_with_imputed(vec![0, 1]));
        assert!(text.contains("api_calls_monthly: 1 of 2 values"));
        assert!(!text.contains("images_generated_monthly"));

        let text = format_imputation(&matrix_with_imputed(vec![0, 0]));
        assert!(text.contains("No missing values among 2 customers."));
    }

    #[test]
    fn test_format_retention_two_decimals() {
        let summary = RetentionSummary {
            achiever_rate: 75.0,
            non_achiever_rate: 33.333333,
            lift: 125.000002,
            achievers: 4,
            non_achievers: 3,
        };
        let text = format_retention(&summary);
        assert!(text.contains("Retention Rate for NSM Achievers: 75.00% (n=4)"));
        assert!(text.contains("Retention Rate for Non-NSM Achievers: 33.33% (n=3)"));
        assert!(text.contains("Retention Lift for NSM Achievers: 125.00%"));
    }

    #[test]
    fn test_format_retention_infinite_lift() {
        let summary = RetentionSummary {
            achiever_rate: 50.0,
            non_achiever_rate: 0.0,
            lift: f64::INFINITY,
            achievers: 2,
            non_achievers: 2,
        };
        assert!(format_retention(&summary).contains("Lift for NSM Achievers: inf%"));
    }

    #[test]
    fn test_format_correlation_table_keeps_order() {
        let results = vec![
            CorrelationResult {
                feature: "image_downloads_week1".to_string(),
                pearson: 0.8,
                pearson_p: 0.01,
                spearman: 0.75,
                spearman_p: 0.02,
                n_observations: 10,
            },
            CorrelationResult {
                feature: "num_searches_week1".to_string(),
                pearson: -0.4,
                pearson_p: 0.2,
                spearman: -0.3,
                spearman_p: 0.3,
                n_observations: 10,
            },
        ];
        let table = format_correlation_table(&results);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Feature"));
        assert!(lines[1].starts_with("image_downloads_week1"));
        assert!(lines[2].starts_with("num_searches_week1"));
    }
}
