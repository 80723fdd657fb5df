use ndarray::Array2;

use crate::checkpoint::domain::artifact::Namespace;
use crate::checkpoint::domain::checkpoint_store::CheckpointStore;
use crate::clustering::domain::clustering_backend::ClusteringBackend;
use crate::pipeline::pipeline_error::PipelineError;
use crate::shared::artifact_maps::{ClustersMap, FeaturesMap};
use crate::shared::cluster_label::ClusterLabel;

pub const STAGE_NAME: &str = "clusters";

/// Groups webcams by their feature histograms.
///
/// Never served from cache: previous labels are cleared and every webcam in
/// `features` gets a fresh label in `[0, num_clusters)`.
pub struct ClusterStage {
    num_clusters: usize,
    attempts: usize,
    epsilon: f64,
}

impl ClusterStage {
    pub fn new(num_clusters: usize, attempts: usize, epsilon: f64) -> Self {
        Self {
            num_clusters,
            attempts,
            epsilon,
        }
    }

    pub fn run(
        &self,
        features: &FeaturesMap,
        backend: &dyn ClusteringBackend,
        checkpoints: &CheckpointStore,
    ) -> Result<ClustersMap, PipelineError> {
        let samples = feature_rows(features)?;
        let outcome = backend.kmeans(
            samples.view(),
            self.num_clusters,
            self.attempts,
            self.epsilon,
        )?;
        log::debug!("Webcam clustering compactness: {:.3}", outcome.compactness);
        self.check_labels(features, &outcome.labels)?;

        checkpoints.clear(Namespace::Clusters)?;
        let mut clusters = ClustersMap::new();
        for (id, &label) in features.keys().zip(&outcome.labels) {
            let label = ClusterLabel(label as u32);
            checkpoints.store(id, &label)?;
            clusters.insert(id.clone(), label);
        }
        Ok(clusters)
    }

    /// One label per webcam, each in `[0, num_clusters)`.
    fn check_labels(
        &self,
        features: &FeaturesMap,
        labels: &[usize],
    ) -> Result<(), PipelineError> {
        if labels.len() != features.len() {
            return Err(PipelineError::InconsistentLabels {
                expected: features.len(),
                found: labels.len(),
            });
        }
        match features
            .keys()
            .zip(labels)
            .find(|&(_, &label)| label >= self.num_clusters)
        {
            Some((id, &label)) => Err(PipelineError::LabelOutOfRange {
                id: id.clone(),
                label,
                num_clusters: self.num_clusters,
            }),
            None => Ok(()),
        }
    }
}

/// One `f32` row per webcam, in identifier order.
fn feature_rows(features: &FeaturesMap) -> Result<Array2<f32>, PipelineError> {
    let Some(first) = features.values().next() else {
        return Err(PipelineError::NoFeatures);
    };
    let width = first.len();
    let mut rows = Array2::zeros((features.len(), width));
    for ((id, histogram), mut row) in features.iter().zip(rows.rows_mut()) {
        if histogram.len() != width {
            return Err(PipelineError::InconsistentFeatures {
                id: id.clone(),
                expected: width,
                found: histogram.len(),
            });
        }
        for (cell, &count) in row.iter_mut().zip(histogram.counts()) {
            *cell = count as f32;
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::infrastructure::memory_artifact_store::MemoryArtifactStore;
    use crate::clustering::domain::clustering_backend::{ClusteringError, KMeansOutcome};
    use crate::clustering::infrastructure::lloyd_kmeans::LloydKMeans;
    use crate::shared::feature_histogram::FeatureHistogram;
    use ndarray::ArrayView2;
    use std::sync::Arc;

    /// Returns fixed labels regardless of the input.
    struct FixedLabels(Vec<usize>);

    impl ClusteringBackend for FixedLabels {
        fn kmeans(
            &self,
            vectors: ArrayView2<'_, f32>,
            k: usize,
            _attempts: usize,
            _epsilon: f64,
        ) -> Result<KMeansOutcome, ClusteringError> {
            Ok(KMeansOutcome {
                centroids: Array2::zeros((k, vectors.ncols())),
                labels: self.0.clone(),
                compactness: 0.0,
            })
        }
    }

    fn three_webcams() -> FeaturesMap {
        features(&[("a", vec![1, 0]), ("b", vec![0, 1]), ("c", vec![1, 1])])
    }

    fn features(entries: &[(&str, Vec<u32>)]) -> FeaturesMap {
        entries
            .iter()
            .map(|(id, counts)| (id.to_string(), FeatureHistogram::new(counts.clone())))
            .collect()
    }

    #[test]
    fn test_similar_histograms_share_a_label() {
        let memory = Arc::new(MemoryArtifactStore::new());
        let checkpoints = CheckpointStore::new(memory.clone());
        let features = features(&[
            ("a", vec![10, 0, 0]),
            ("b", vec![9, 1, 0]),
            ("c", vec![0, 0, 10]),
            ("d", vec![0, 1, 9]),
        ]);

        let clusters = ClusterStage::new(2, 3, 0.1)
            .run(&features, &LloydKMeans::new(100, Some(7)), &checkpoints)
            .unwrap();

        assert_eq!(clusters.len(), 4);
        assert_eq!(clusters["a"], clusters["b"]);
        assert_eq!(clusters["c"], clusters["d"]);
        assert_ne!(clusters["a"], clusters["c"]);
        assert!(clusters.values().all(|l| l.value() < 2));
        assert_eq!(memory.count(Namespace::Clusters), 4);
        assert_eq!(
            checkpoints.load::<ClusterLabel>("c").unwrap(),
            Some(clusters["c"])
        );
    }

    #[test]
    fn test_stale_labels_are_cleared() {
        let memory = Arc::new(MemoryArtifactStore::new());
        let checkpoints = CheckpointStore::new(memory.clone());
        checkpoints.store("gone", &ClusterLabel(1)).unwrap();

        ClusterStage::new(1, 1, 0.1)
            .run(
                &features(&[("a", vec![1, 2])]),
                &LloydKMeans::default(),
                &checkpoints,
            )
            .unwrap();

        assert!(checkpoints.load::<ClusterLabel>("gone").unwrap().is_none());
        assert_eq!(memory.count(Namespace::Clusters), 1);
    }

    #[test]
    fn test_no_features_is_error() {
        let checkpoints = CheckpointStore::new(Arc::new(MemoryArtifactStore::new()));
        let result =
            ClusterStage::new(3, 3, 0.1).run(&FeaturesMap::new(), &LloydKMeans::default(), &checkpoints);
        assert!(matches!(result, Err(PipelineError::NoFeatures)));
    }

    #[test]
    fn test_fewer_webcams_than_clusters_is_error() {
        let checkpoints = CheckpointStore::new(Arc::new(MemoryArtifactStore::new()));
        let result = ClusterStage::new(3, 3, 0.1).run(
            &features(&[("a", vec![1, 0]), ("b", vec![0, 1])]),
            &LloydKMeans::default(),
            &checkpoints,
        );
        assert!(matches!(
            result,
            Err(PipelineError::Clustering(ClusteringError::TooFewVectors { vectors: 2, k: 3 }))
        ));
    }

    #[test]
    fn test_mismatched_histogram_lengths_are_error() {
        let result = feature_rows(&features(&[("a", vec![1, 0]), ("b", vec![0, 1, 2])]));
        assert!(matches!(
            result,
            Err(PipelineError::InconsistentFeatures { ref id, expected: 2, found: 3 }) if id == "b"
        ));
    }

    #[test]
    fn test_missing_labels_are_error_and_keep_previous_labels() {
        let memory = Arc::new(MemoryArtifactStore::new());
        let checkpoints = CheckpointStore::new(memory.clone());
        checkpoints.store("a", &ClusterLabel(1)).unwrap();

        let result =
            ClusterStage::new(2, 1, 0.1).run(&three_webcams(), &FixedLabels(vec![0]), &checkpoints);

        assert!(matches!(
            result,
            Err(PipelineError::InconsistentLabels {
                expected: 3,
                found: 1
            })
        ));
        assert_eq!(memory.count(Namespace::Clusters), 1);
        assert_eq!(
            checkpoints.load::<ClusterLabel>("a").unwrap(),
            Some(ClusterLabel(1))
        );
    }

    #[test]
    fn test_out_of_range_label_is_error() {
        let memory = Arc::new(MemoryArtifactStore::new());
        let checkpoints = CheckpointStore::new(memory.clone());

        let result = ClusterStage::new(2, 1, 0.1).run(
            &three_webcams(),
            &FixedLabels(vec![0, 7, 1]),
            &checkpoints,
        );

        assert!(matches!(
            result,
            Err(PipelineError::LabelOutOfRange { ref id, label: 7, num_clusters: 2 }) if id == "b"
        ));
        assert_eq!(memory.count(Namespace::Clusters), 0);
    }
}
