use crate::bovw::bovw_error::BovwError;
use crate::clustering::domain::clustering_backend::ClusteringBackend;
use crate::shared::artifact_maps::DescriptorsMap;
use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::vocabulary::Vocabulary;

/// Clusters every cached descriptor row into a fixed number of visual words.
///
/// Row order across webcams does not matter: k-means treats its input as an
/// unordered set.
pub struct VocabularyBuilder {
    vocabulary_size: usize,
    attempts: usize,
    epsilon: f64,
}

impl VocabularyBuilder {
    pub fn new(vocabulary_size: usize, attempts: usize, epsilon: f64) -> Self {
        Self {
            vocabulary_size,
            attempts,
            epsilon,
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn build(
        &self,
        descriptors: &DescriptorsMap,
        backend: &dyn ClusteringBackend,
    ) -> Result<Vocabulary, BovwError> {
        let parts: Vec<DescriptorMatrix> = descriptors.values().cloned().collect();
        let all_descriptors = DescriptorMatrix::vstack(&parts)?;
        if all_descriptors.is_empty() {
            return Err(BovwError::NoDescriptors);
        }
        log::info!(
            "Clustering {} descriptors from {} webcams into {} words",
            all_descriptors.len(),
            descriptors.len(),
            self.vocabulary_size
        );

        let outcome = backend.kmeans(
            all_descriptors.view(),
            self.vocabulary_size,
            self.attempts,
            self.epsilon,
        )?;
        log::debug!("Vocabulary compactness: {:.3}", outcome.compactness);

        if outcome.centroids.nrows() != self.vocabulary_size {
            return Err(BovwError::WrongWordCount {
                expected: self.vocabulary_size,
                found: outcome.centroids.nrows(),
            });
        }
        Ok(Vocabulary::new(outcome.centroids))
    }
}
