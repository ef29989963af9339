//! Cohortscope: behavioral analytics over customer usage exports
//!
//! Two independent batch analyses over a CSV file:
//! - segmentation: standardize usage metrics, cluster them with K-Means and
//!   name each cluster with a persona
//! - correlation: relate early behavioral signals to a North Star Metric and
//!   compare retention of NSM achievers against non-achievers

pub mod cli;
pub mod config;
pub mod correlation;
pub mod data;
pub mod error;
pub mod model;
pub mod persona;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use cli::Cli;
pub use config::{CorrelationConfig, SegmentationConfig};
pub use correlation::{analyze_correlations, analyze_retention, CorrelationResult, RetentionSummary};
pub use data::{load_table, prepare_features, FeatureMatrix, StandardScaler};
pub use error::AnalysisError;
pub use model::{fit_kmeans, Centroid, ClusterModel, KMeansParams};
pub use persona::{label_centroid, label_clusters, strategy_for};
pub use pipeline::{run_correlation, run_segmentation};
pub use viz::plot_clusters;

/// Application-level result type used by the binary and plotting layer
pub type Result<T> = anyhow::Result<T>;
