//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    CorrelationConfig, SegmentationConfig, CORRELATION_FEATURES, NSM_TARGET_COLUMN,
    RETENTION_COLUMN, SEGMENTATION_FEATURES,
};

/// Customer persona segmentation and North Star Metric analysis
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cluster customer usage metrics into personas and plot the segments
    Segment(SegmentArgs),
    /// Correlate week-1 signals with the NSM and measure retention lift
    Correlate(CorrelateArgs),
}

#[derive(Args, Debug)]
pub struct SegmentArgs {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "customer_segmentation_data.csv")]
    pub input: PathBuf,

    /// Output path for the cluster plot
    #[arg(short, long, default_value = "customer_clusters.png")]
    pub output: PathBuf,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value = "3")]
    pub clusters: usize,

    /// Feature columns to cluster on, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = SEGMENTATION_FEATURES.map(String::from))]
    pub features: Vec<String>,

    /// Random seed for centroid initialization
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of K-Means initializations; the best run is kept
    #[arg(long, default_value = "10")]
    pub n_init: usize,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Feature shown on the plot's x axis
    #[arg(long, default_value = "images_generated_monthly")]
    pub plot_x: String,

    /// Feature shown on the plot's y axis
    #[arg(long, default_value = "api_calls_monthly")]
    pub plot_y: String,
}

impl From<SegmentArgs> for SegmentationConfig {
    fn from(args: SegmentArgs) -> Self {
        Self {
            input: args.input,
            output: args.output,
            n_clusters: args.clusters,
            features: args.features,
            seed: args.seed,
            n_init: args.n_init,
            max_iters: args.max_iters,
            tolerance: args.tolerance,
            plot_x: args.plot_x,
            plot_y: args.plot_y,
        }
    }
}

#[derive(Args, Debug)]
pub struct CorrelateArgs {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "simulated_user_data.csv")]
    pub input: PathBuf,

    /// Binary North Star Metric column
    #[arg(long, default_value = NSM_TARGET_COLUMN)]
    pub target: String,

    /// Binary retention column
    #[arg(long, default_value = RETENTION_COLUMN)]
    pub retention: String,

    /// Feature columns to correlate with the NSM, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = CORRELATION_FEATURES.map(String::from))]
    pub features: Vec<String>,
}

impl From<CorrelateArgs> for CorrelationConfig {
    fn from(args: CorrelateArgs) -> Self {
        Self {
            input: args.input,
            target: args.target,
            retention: args.retention,
            features: args.features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_defaults_match_config() {
        let cli = Cli::try_parse_from(["cohortscope", "segment"]).unwrap();
        let Command::Segment(args) = cli.command else {
            panic!("expected segment subcommand");
        };
        assert_eq!(SegmentationConfig::from(args), SegmentationConfig::default());
    }

    #[test]
    fn test_segment_overrides() {
        let cli = Cli::try_parse_from([
            "cohortscope",
            "-v",
            "segment",
            "-k",
            "2",
            "--features",
            "api_calls_monthly,login_frequency_weekly",
            "--plot-x",
            "api_calls_monthly",
            "--plot-y",
            "login_frequency_weekly",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Segment(args) = cli.command else {
            panic!("expected segment subcommand");
        };
        let config = SegmentationConfig::from(args);
        assert_eq!(config.n_clusters, 2);
        assert_eq!(config.features, vec!["api_calls_monthly", "login_frequency_weekly"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_correlate_defaults_match_config() {
        let cli = Cli::try_parse_from(["cohortscope", "correlate", "--input", "users.csv"]).unwrap();
        let Command::Correlate(args) = cli.command else {
            panic!("expected correlate subcommand");
        };
        let config = CorrelationConfig::from(args);
        assert_eq!(config.input, PathBuf::from("users.csv"));
        assert_eq!(config.target, NSM_TARGET_COLUMN);
        assert_eq!(config.features.len(), 5);
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["cohortscope"]).is_err());
    }
}
