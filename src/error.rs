//! Error taxonomy shared by both analysis pipelines

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Input file '{}' not found. Please check the path.", .0.display())]
    DataNotFound(PathBuf),

    #[error("The column '{0}' was not found in the input data.")]
    MissingColumn(String),

    #[error("Not enough data for {context}: found {found} usable rows, need at least {required}.")]
    InsufficientData {
        context: String,
        found: usize,
        required: usize,
    },

    #[error("Correlation is undefined for {0}: one of the inputs is constant.")]
    ConstantInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Error from the underlying Polars DataFrame library: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("K-Means fitting failed: {0}")]
    Clustering(#[from] linfa_clustering::KMeansError),

    #[error("Statistics error: {0}")]
    Statistics(String),
}

impl AnalysisError {
    /// Process exit code for this failure when it ends a pipeline.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::DataNotFound(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
