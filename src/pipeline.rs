//! Computation stages of the two analyses, free of any console output

use crate::config::{CorrelationConfig, SegmentationConfig};
use crate::correlation::{analyze_correlations, analyze_retention, CorrelationResult, RetentionSummary};
use crate::data::{load_table, prepare_features, FeatureMatrix};
use crate::error::Result;
use crate::model::{fit_kmeans, ClusterModel, KMeansParams};
use crate::persona::label_clusters;

#[derive(Debug)]
pub struct SegmentationOutcome {
    pub matrix: FeatureMatrix,
    pub model: ClusterModel,
    /// Persona label per cluster id
    pub labels: Vec<String>,
}

impl SegmentationOutcome {
    pub fn label_of(&self, cluster: usize) -> &str {
        self.labels
            .get(cluster)
            .map(String::as_str)
            .unwrap_or("Unlabeled")
    }
}

/// Load, standardize, cluster and label customer usage data.
pub fn run_segmentation(config: &SegmentationConfig) -> Result<SegmentationOutcome> {
    config.validate()?;

    let df = load_table(&config.input)?;
    let matrix = prepare_features(&df, &config.features)?;

    let model = fit_kmeans(&matrix, &KMeansParams::from(config))?;
    let labels = label_clusters(&model);

    Ok(SegmentationOutcome {
        matrix,
        model,
        labels,
    })
}

#[derive(Debug)]
pub struct CorrelationOutcome {
    pub target: String,
    /// Sorted by Pearson coefficient, highest first
    pub correlations: Vec<CorrelationResult>,
    /// Retention comparison; a failure here does not invalidate the correlations
    pub retention: Result<RetentionSummary>,
}

/// Correlate early signals with the NSM and compare retention of achievers.
pub fn run_correlation(config: &CorrelationConfig) -> Result<CorrelationOutcome> {
    let df = load_table(&config.input)?;

    let correlations = analyze_correlations(&df, &config.target, &config.features);
    let retention = analyze_retention(&df, &config.target, &config.retention);

    Ok(CorrelationOutcome {
        target: config.target.clone(),
        correlations,
        retention,
    })
}
