use thiserror::Error;

use crate::clustering::domain::clustering_backend::ClusteringError;

#[derive(Error, Debug)]
pub enum BovwError {
    #[error("vocabulary has no words")]
    EmptyVocabulary,
    #[error("descriptor width {found} does not match vocabulary width {expected}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("no descriptors to build a vocabulary from")]
    NoDescriptors,
    #[error("expected {expected} vocabulary words, clustering returned {found}")]
    WrongWordCount { expected: usize, found: usize },
    #[error("descriptor matrices cannot be stacked: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Clustering(#[from] ClusteringError),
}
