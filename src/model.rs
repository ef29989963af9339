//! K-Means clustering model implementation

use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SegmentationConfig;
use crate::data::FeatureMatrix;
use crate::error::{AnalysisError, Result};

/// Parameters controlling a k-means fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    pub n_clusters: usize,
    pub seed: u64,
    /// Independent initializations; the run with the lowest inertia wins
    pub n_init: usize,
    pub max_iters: u64,
    pub tolerance: f64,
}

impl From<&SegmentationConfig> for KMeansParams {
    fn from(config: &SegmentationConfig) -> Self {
        Self {
            n_clusters: config.n_clusters,
            seed: config.seed,
            n_init: config.n_init,
            max_iters: config.max_iters,
            tolerance: config.tolerance,
        }
    }
}

/// A cluster's mean feature vector in original units.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    pub cluster: usize,
    pub values: Vec<(String, f64)>,
}

impl Centroid {
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| *value)
    }
}

/// Fitted clustering of a feature matrix
#[derive(Debug, Clone)]
pub struct ClusterModel {
    pub n_clusters: usize,
    /// Feature names in centroid column order
    pub features: Vec<String>,
    /// Cluster assignment per record
    pub labels: Array1<usize>,
    /// Per-cluster means of the standardized features (n_clusters, n_features)
    pub centroids: Array2<f64>,
    /// Per-cluster means of the imputed features in original units
    pub original_centroids: Array2<f64>,
    /// Within-cluster sum of squares in standardized space
    pub inertia: f64,
}

impl ClusterModel {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }

    pub fn centroid(&self, cluster: usize) -> Centroid {
        let row = self.original_centroids.row(cluster);
        Centroid {
            cluster,
            values: self
                .features
                .iter()
                .cloned()
                .zip(row.iter().copied())
                .collect(),
        }
    }

    pub fn centroids_original(&self) -> Vec<Centroid> {
        (0..self.n_clusters).map(|i| self.centroid(i)).collect()
    }
}

/// Fit K-Means on the standardized features of `matrix`.
///
/// Uses k-means++ seeding from a fixed-seed generator so repeated runs on
/// the same data produce the same assignment.
///
/// # Arguments
/// * `matrix` - Imputed and standardized customer features
/// * `params` - Cluster count, seed, restarts and convergence settings
///
/// # Returns
/// * Fitted `ClusterModel` whose centroids are the exact means of the
///   records assigned to each cluster
pub fn fit_kmeans(matrix: &FeatureMatrix, params: &KMeansParams) -> Result<ClusterModel> {
    let n_samples = matrix.scaled.nrows();
    if n_samples < params.n_clusters {
        return Err(AnalysisError::InsufficientData {
            context: format!("{} clusters", params.n_clusters),
            found: n_samples,
            required: params.n_clusters,
        });
    }

    // Dummy targets for unsupervised learning
    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(matrix.scaled.clone(), targets);

    let rng = StdRng::seed_from_u64(params.seed);
    let model = KMeans::params_with(params.n_clusters, rng, L2Dist)
        .n_runs(params.n_init)
        .max_n_iterations(params.max_iters)
        .tolerance(params.tolerance)
        .fit(&dataset)?;

    let labels = model.predict(&dataset);

    // linfa stops within `tolerance` of the fixed point, so take the exact
    // member means; an empty cluster keeps linfa's centroid.
    let fitted = model.centroids();
    let centroids = cluster_means(&matrix.scaled, &labels, fitted);
    let original_centroids = cluster_means(
        &matrix.raw,
        &labels,
        &matrix.scaler.inverse_transform(fitted.clone()),
    );
    let inertia = compute_inertia(&matrix.scaled, &labels, &centroids);

    log::debug!(
        "K-Means converged: k={}, runs={}, inertia={:.4}",
        params.n_clusters,
        params.n_init,
        inertia
    );

    Ok(ClusterModel {
        n_clusters: params.n_clusters,
        features: matrix.features.clone(),
        labels,
        centroids,
        original_centroids,
        inertia,
    })
}

/// Mean row of `data` per cluster label, falling back to `fallback` rows.
fn cluster_means(data: &Array2<f64>, labels: &Array1<usize>, fallback: &Array2<f64>) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros(fallback.raw_dim());
    let mut counts = vec![0usize; fallback.nrows()];
    for (row, &cluster) in data.outer_iter().zip(labels.iter()) {
        if cluster < counts.len() {
            let mut sum = sums.row_mut(cluster);
            sum += &row;
            counts[cluster] += 1;
        }
    }

    for (cluster, &count) in counts.iter().enumerate() {
        if count == 0 {
            sums.row_mut(cluster).assign(&fallback.row(cluster));
        } else {
            sums.row_mut(cluster).mapv_inplace(|v| v / count as f64);
        }
    }
    sums
}

fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    labels
        .iter()
        .enumerate()
        .filter(|(_, cluster)| **cluster < centroids.nrows())
        .map(|(i, &cluster)| {
            features
                .row(i)
                .iter()
                .zip(centroids.row(cluster).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        })
        .sum()
}
