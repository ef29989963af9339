//! Pipeline configuration passed explicitly into each analysis

use std::path::PathBuf;

use crate::error::{AnalysisError, Result};

/// Usage metrics clustered into personas.
pub const SEGMENTATION_FEATURES: [&str; 6] = [
    "images_generated_monthly",
    "api_calls_monthly",
    "login_frequency_weekly",
    "templates_used_monthly",
    "custom_generation_minutes_monthly",
    "feature_x_used",
];

/// Week-1 behavioral signals correlated with the North Star Metric.
pub const CORRELATION_FEATURES: [&str; 5] = [
    "image_downloads_week1",
    "smart_crop_used_week1",
    "avg_session_time_min_week1",
    "num_searches_week1",
    "saved_to_favorites_week1",
];

pub const NSM_TARGET_COLUMN: &str = "nsm_achieved_week2";
pub const RETENTION_COLUMN: &str = "retention_status_week_8";

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub n_clusters: usize,
    /// Ordered feature columns; the same order is used for scaling and clustering.
    pub features: Vec<String>,
    pub seed: u64,
    /// Number of k-means restarts; the lowest-inertia run is kept.
    pub n_init: usize,
    pub max_iters: u64,
    pub tolerance: f64,
    pub plot_x: String,
    pub plot_y: String,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("customer_segmentation_data.csv"),
            output: PathBuf::from("customer_clusters.png"),
            n_clusters: 3,
            features: SEGMENTATION_FEATURES.iter().map(|s| s.to_string()).collect(),
            seed: 42,
            n_init: 10,
            max_iters: 300,
            tolerance: 1e-4,
            plot_x: "images_generated_monthly".to_string(),
            plot_y: "api_calls_monthly".to_string(),
        }
    }
}

impl SegmentationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(AnalysisError::InvalidConfig(
                "number of clusters must be at least 1".to_string(),
            ));
        }
        if self.n_init == 0 {
            return Err(AnalysisError::InvalidConfig(
                "number of initializations must be at least 1".to_string(),
            ));
        }
        if self.features.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "at least one feature column is required".to_string(),
            ));
        }
        for axis in [&self.plot_x, &self.plot_y] {
            if !self.features.contains(axis) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "plot axis '{axis}' is not one of the clustering features"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationConfig {
    pub input: PathBuf,
    pub target: String,
    pub retention: String,
    pub features: Vec<String>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("simulated_user_data.csv"),
            target: NSM_TARGET_COLUMN.to_string(),
            retention: RETENTION_COLUMN.to_string(),
            features: CORRELATION_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
