use ndarray::{Array2, ArrayView2};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error("cannot cluster an empty set of vectors")]
    EmptyInput,
    #[error("cluster count must be at least 1")]
    ZeroClusters,
    #[error("cannot form {k} clusters from {vectors} vectors")]
    TooFewVectors { vectors: usize, k: usize },
    #[error("clustering backend failed: {0}")]
    Backend(String),
}

/// Result of one k-means invocation.
#[derive(Clone, Debug)]
pub struct KMeansOutcome {
    /// `k` rows, same width as the input vectors.
    pub centroids: Array2<f32>,
    /// One label in `[0, k)` per input row, in input order.
    pub labels: Vec<usize>,
    /// Sum of squared distances from each vector to its centroid.
    pub compactness: f64,
}

/// Partitions row vectors into `k` clusters.
pub trait ClusteringBackend: Send + Sync {
    /// Runs k-means `attempts` times and returns the most compact result.
    ///
    /// An attempt stops once no centroid moves further than `epsilon`.
    fn kmeans(
        &self,
        vectors: ArrayView2<'_, f32>,
        k: usize,
        attempts: usize,
        epsilon: f64,
    ) -> Result<KMeansOutcome, ClusteringError>;
}
