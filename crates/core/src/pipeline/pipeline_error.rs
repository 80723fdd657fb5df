use thiserror::Error;

use crate::bovw::bovw_error::BovwError;
use crate::checkpoint::domain::artifact::Namespace;
use crate::checkpoint::domain::checkpoint_error::CheckpointError;
use crate::clustering::domain::clustering_backend::ClusteringError;
use crate::frames::domain::frame_source::FrameSourceError;
use crate::shared::pipeline_settings::SettingsError;
use crate::vision::domain::vision_backend::VisionError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Frames(#[from] FrameSourceError),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error(transparent)]
    Bovw(#[from] BovwError),
    #[error(transparent)]
    Clustering(#[from] ClusteringError),
    #[error("a worker in the {stage} stage panicked")]
    WorkerPanicked { stage: String },
    #[error("no webcam produced descriptors; cannot build a vocabulary")]
    NoDescriptors,
    #[error("no feature histograms to cluster")]
    NoFeatures,
    #[error("no descriptors for webcam '{id}'")]
    MissingDescriptors { id: String },
    #[error("feature histogram for '{id}' has {found} bins, expected {expected}")]
    InconsistentFeatures {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("clustering returned {found} labels for {expected} webcams")]
    InconsistentLabels { expected: usize, found: usize },
    #[error("webcam '{id}' got label {label}, outside [0, {num_clusters})")]
    LabelOutOfRange {
        id: String,
        label: usize,
        num_clusters: usize,
    },
    #[error("{namespace} artifact '{id}' missing right after it was stored")]
    ArtifactVanished { namespace: Namespace, id: String },
}
