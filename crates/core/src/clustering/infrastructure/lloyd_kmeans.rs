use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clustering::domain::clustering_backend::{
    ClusteringBackend, ClusteringError, KMeansOutcome,
};
use crate::shared::constants::DEFAULT_KMEANS_MAX_ITERATIONS;

/// Lloyd's k-means with k-means++ seeding.
///
/// Each attempt iterates until the largest centroid shift is at most
/// `epsilon` or `max_iterations` is reached; the attempt with the lowest
/// compactness wins.
pub struct LloydKMeans {
    max_iterations: usize,
    seed: Option<u64>,
}

impl LloydKMeans {
    pub fn new(max_iterations: usize, seed: Option<u64>) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            seed,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn run_attempt(
        &self,
        data: ArrayView2<'_, f32>,
        k: usize,
        epsilon: f64,
        rng: &mut StdRng,
    ) -> KMeansOutcome {
        let mut centroids = initialize_centroids(data, k, rng);
        let mut labels = assign(data, centroids.view());

        for _ in 0..self.max_iterations {
            let updated = update_centroids(data, &labels, &centroids, k);
            let shift = max_shift(centroids.view(), updated.view());
            centroids = updated;
            labels = assign(data, centroids.view());
            if shift <= epsilon {
                break;
            }
        }

        let compactness: f64 = data
            .rows()
            .into_iter()
            .zip(&labels)
            .map(|(row, &label)| squared_distance(row, centroids.row(label)))
            .sum();

        KMeansOutcome {
            centroids,
            labels,
            compactness,
        }
    }
}

impl Default for LloydKMeans {
    fn default() -> Self {
        Self::new(DEFAULT_KMEANS_MAX_ITERATIONS, None)
    }
}

impl ClusteringBackend for LloydKMeans {
    fn kmeans(
        &self,
        vectors: ArrayView2<'_, f32>,
        k: usize,
        attempts: usize,
        epsilon: f64,
    ) -> Result<KMeansOutcome, ClusteringError> {
        if vectors.nrows() == 0 {
            return Err(ClusteringError::EmptyInput);
        }
        if k == 0 {
            return Err(ClusteringError::ZeroClusters);
        }
        if vectors.nrows() < k {
            return Err(ClusteringError::TooFewVectors {
                vectors: vectors.nrows(),
                k,
            });
        }

        let mut rng = self.rng();
        let mut best: Option<KMeansOutcome> = None;
        for attempt in 0..attempts.max(1) {
            let outcome = self.run_attempt(vectors, k, epsilon, &mut rng);
            log::debug!(
                "k-means attempt {}: compactness {:.3}",
                attempt + 1,
                outcome.compactness
            );
            if best
                .as_ref()
                .map_or(true, |b| outcome.compactness < b.compactness)
            {
                best = Some(outcome);
            }
        }
        best.ok_or(ClusteringError::EmptyInput)
    }
}

fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x as f64 - y as f64;
            diff * diff
        })
        .sum()
}

/// Index of the nearest centroid; ties go to the lowest index.
fn nearest(row: ArrayView1<'_, f32>, centroids: ArrayView2<'_, f32>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (j, centroid) in centroids.rows().into_iter().enumerate() {
        let d = squared_distance(row, centroid);
        if d < best.1 {
            best = (j, d);
        }
    }
    best
}

fn assign(data: ArrayView2<'_, f32>, centroids: ArrayView2<'_, f32>) -> Vec<usize> {
    data.rows()
        .into_iter()
        .map(|row| nearest(row, centroids).0)
        .collect()
}

/// k-means++: each further centroid is drawn with probability proportional to
/// its squared distance from the nearest centroid chosen so far.
fn initialize_centroids(data: ArrayView2<'_, f32>, k: usize, rng: &mut StdRng) -> Array2<f32> {
    let n = data.nrows();
    let mut chosen = vec![rng.random_range(0..n)];

    while chosen.len() < k {
        let picked = data.select(Axis(0), &chosen);
        let distances: Vec<f64> = data
            .rows()
            .into_iter()
            .map(|row| nearest(row, picked.view()).1)
            .collect();

        let total: f64 = distances.iter().sum();
        let next = if total <= 0.0 {
            // Every point already coincides with a centroid.
            rng.random_range(0..n)
        } else {
            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            distances
                .iter()
                .position(|&d| {
                    cumsum += d;
                    cumsum >= threshold && d > 0.0
                })
                .unwrap_or(n - 1)
        };
        chosen.push(next);
    }

    data.select(Axis(0), &chosen)
}

/// Mean of each cluster's members. An empty cluster is re-seeded with the
/// point farthest from its current centroid.
fn update_centroids(
    data: ArrayView2<'_, f32>,
    labels: &[usize],
    previous: &Array2<f32>,
    k: usize,
) -> Array2<f32> {
    let width = data.ncols();
    let mut sums = Array2::<f64>::zeros((k, width));
    let mut counts = vec![0usize; k];
    for (row, &label) in data.rows().into_iter().zip(labels) {
        let mut sum = sums.row_mut(label);
        for (s, &v) in sum.iter_mut().zip(row.iter()) {
            *s += v as f64;
        }
        counts[label] += 1;
    }

    let mut centroids = Array2::<f32>::zeros((k, width));
    for j in 0..k {
        if counts[j] > 0 {
            let mean = sums.row(j).mapv(|s| (s / counts[j] as f64) as f32);
            centroids.row_mut(j).assign(&mean);
        } else {
            let farthest = data
                .rows()
                .into_iter()
                .zip(labels)
                .map(|(row, &label)| squared_distance(row, previous.row(label)))
                .enumerate()
                .fold((0, f64::MIN), |acc, (i, d)| if d > acc.1 { (i, d) } else { acc })
                .0;
            centroids.row_mut(j).assign(&data.row(farthest));
        }
    }
    centroids
}

fn max_shift(before: ArrayView2<'_, f32>, after: ArrayView2<'_, f32>) -> f64 {
    before
        .rows()
        .into_iter()
        .zip(after.rows())
        .map(|(a, b)| squared_distance(a, b).sqrt())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn two_blobs() -> Array2<f32> {
        array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [10.0, 10.0],
            [10.1, 10.0],
            [10.0, 10.1],
        ]
    }

    #[test]
    fn test_separates_two_blobs() {
        let kmeans = LloydKMeans::new(100, Some(1));
        let data = two_blobs();
        let outcome = kmeans.kmeans(data.view(), 2, 3, 0.001).unwrap();

        assert_eq!(outcome.labels.len(), 6);
        assert_eq!(outcome.centroids.dim(), (2, 2));
        assert_eq!(outcome.labels[0], outcome.labels[1]);
        assert_eq!(outcome.labels[0], outcome.labels[2]);
        assert_eq!(outcome.labels[3], outcome.labels[4]);
        assert_eq!(outcome.labels[3], outcome.labels[5]);
        assert_ne!(outcome.labels[0], outcome.labels[3]);
        assert!(outcome.compactness < 0.1);
    }

    #[test]
    fn test_k_equal_to_n_has_zero_compactness() {
        let kmeans = LloydKMeans::new(100, Some(5));
        let data = array![[0.0, 0.0], [5.0, 5.0], [9.0, 1.0]];
        let outcome = kmeans.kmeans(data.view(), 3, 1, 0.0).unwrap();
        assert_relative_eq!(outcome.compactness, 0.0);
        let mut labels = outcome.labels.clone();
        labels.sort();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_cluster_centroid_is_mean() {
        let kmeans = LloydKMeans::new(100, Some(2));
        let data = array![[0.0, 0.0], [2.0, 4.0]];
        let outcome = kmeans.kmeans(data.view(), 1, 1, 0.0).unwrap();
        assert_relative_eq!(outcome.centroids[[0, 0]], 1.0);
        assert_relative_eq!(outcome.centroids[[0, 1]], 2.0);
        assert_eq!(outcome.labels, vec![0, 0]);
    }

    #[test]
    fn test_duplicate_points_still_produce_k_centroids() {
        let kmeans = LloydKMeans::new(10, Some(3));
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let outcome = kmeans.kmeans(data.view(), 2, 2, 0.1).unwrap();
        assert_eq!(outcome.centroids.nrows(), 2);
        assert!(outcome.labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let data = two_blobs();
        let a = LloydKMeans::new(100, Some(9))
            .kmeans(data.view(), 2, 2, 0.01)
            .unwrap();
        let b = LloydKMeans::new(100, Some(9))
            .kmeans(data.view(), 2, 2, 0.01)
            .unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_empty_input_is_error() {
        let data = Array2::<f32>::zeros((0, 2));
        assert!(matches!(
            LloydKMeans::default().kmeans(data.view(), 2, 1, 0.1),
            Err(ClusteringError::EmptyInput)
        ));
    }

    #[test]
    fn test_zero_clusters_is_error() {
        let data = two_blobs();
        assert!(matches!(
            LloydKMeans::default().kmeans(data.view(), 0, 1, 0.1),
            Err(ClusteringError::ZeroClusters)
        ));
    }

    #[test]
    fn test_more_clusters_than_vectors_is_error() {
        let data = array![[0.0, 0.0]];
        assert!(matches!(
            LloydKMeans::default().kmeans(data.view(), 2, 1, 0.1),
            Err(ClusteringError::TooFewVectors { vectors: 1, k: 2 })
        ));
    }

    #[test]
    fn test_nearest_breaks_ties_by_lowest_index() {
        let centroids = array![[0.0, 0.0], [2.0, 0.0]];
        let row = array![1.0, 0.0];
        assert_eq!(nearest(row.view(), centroids.view()).0, 0);
    }
}
