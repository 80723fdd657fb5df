use std::time::Instant;

use crate::bovw::vocabulary_builder::VocabularyBuilder;
use crate::checkpoint::domain::artifact::Namespace;
use crate::checkpoint::domain::checkpoint_store::CheckpointStore;
use crate::clustering::domain::clustering_backend::ClusteringBackend;
use crate::frames::domain::frame_source::FrameSource;
use crate::pipeline::cluster_stage::{self, ClusterStage};
use crate::pipeline::compute_features_stage::{self, ComputeFeaturesStage};
use crate::pipeline::extract_descriptors_stage::{self, ExtractDescriptorsStage};
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::stage_executor::StageExecutor;
use crate::shared::artifact_maps::{ClustersMap, DescriptorsMap, FeaturesMap};
use crate::shared::constants::VOCABULARY_ID;
use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::feature_histogram::FeatureHistogram;
use crate::shared::pipeline_settings::PipelineSettings;
use crate::shared::vocabulary::Vocabulary;
use crate::vision::domain::representative_sampler::RepresentativeSampler;
use crate::vision::domain::vision_backend::VisionBackend;

const VOCABULARY_STAGE_NAME: &str = "vocabulary";
const TOTAL_STAGES: usize = 4;

/// Whether a stage's artifacts were reused or produced by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Cached,
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub descriptors: StageStatus,
    pub vocabulary: StageStatus,
    pub features: StageStatus,
}

/// Everything a run produced or reused, keyed by webcam identifier.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub descriptors: DescriptorsMap,
    pub vocabulary: Vocabulary,
    pub features: FeaturesMap,
    pub clusters: ClustersMap,
    pub report: StageReport,
}

/// Runs extract → vocabulary → features → clusters with resume semantics.
///
/// Descriptors, vocabulary and features are each reused when their checkpoint
/// namespace already holds anything for the current webcams, and recomputed
/// in full otherwise. Clusters are always recomputed.
pub struct ClusterWebcamsUseCase {
    frame_source: Box<dyn FrameSource>,
    vision: Box<dyn VisionBackend>,
    clustering: Box<dyn ClusteringBackend>,
    executor: Box<dyn StageExecutor>,
    checkpoints: CheckpointStore,
    settings: PipelineSettings,
}

impl ClusterWebcamsUseCase {
    pub fn new(
        frame_source: Box<dyn FrameSource>,
        vision: Box<dyn VisionBackend>,
        clustering: Box<dyn ClusteringBackend>,
        executor: Box<dyn StageExecutor>,
        checkpoints: CheckpointStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            frame_source,
            vision,
            clustering,
            executor,
            checkpoints,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn execute(
        &self,
        logger: &mut dyn PipelineLogger,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.settings.validate()?;

        let mut ids = self.frame_source.list_identifiers()?;
        ids.sort();
        logger.info(&format!("Found {} webcams.", ids.len()));
        logger.metric("webcams", ids.len() as f64);

        let (descriptors, descriptors_status) =
            timed(logger, extract_descriptors_stage::STAGE_NAME, |logger| {
                self.descriptors(&ids, logger)
            })?;
        logger.metric("webcams_described", descriptors.len() as f64);
        logger.progress(1, TOTAL_STAGES);

        let (vocabulary, vocabulary_status) = timed(logger, VOCABULARY_STAGE_NAME, |logger| {
            self.vocabulary(&descriptors, logger)
        })?;
        logger.metric("vocabulary_words", vocabulary.len() as f64);
        logger.progress(2, TOTAL_STAGES);

        let (features, features_status) =
            timed(logger, compute_features_stage::STAGE_NAME, |logger| {
                self.features(&ids, &descriptors, &vocabulary, logger)
            })?;
        logger.progress(3, TOTAL_STAGES);

        let clusters = timed(logger, cluster_stage::STAGE_NAME, |logger| {
            logger.info("Clustering webcams.");
            ClusterStage::new(
                self.settings.num_clusters,
                self.settings.cluster_attempts,
                self.settings.kmeans_epsilon,
            )
            .run(&features, self.clustering.as_ref(), &self.checkpoints)
        })?;
        logger.metric("webcams_clustered", clusters.len() as f64);
        logger.progress(4, TOTAL_STAGES);

        Ok(PipelineOutcome {
            descriptors,
            vocabulary,
            features,
            clusters,
            report: StageReport {
                descriptors: descriptors_status,
                vocabulary: vocabulary_status,
                features: features_status,
            },
        })
    }

    fn descriptors(
        &self,
        ids: &[String],
        logger: &mut dyn PipelineLogger,
    ) -> Result<(DescriptorsMap, StageStatus), PipelineError> {
        let cached = self.checkpoints.load_all::<DescriptorMatrix, _, _>(ids)?;
        if !cached.is_empty() {
            logger.info("Using cached descriptors.");
            return Ok((cached, StageStatus::Cached));
        }

        logger.info("Extracting descriptors.");
        let sampler = RepresentativeSampler::new(
            self.settings.frames_per_identifier,
            self.settings.max_descriptors_per_frame,
            self.settings.seed,
        );
        let stage = ExtractDescriptorsStage::new(
            self.frame_source.as_ref(),
            self.vision.as_ref(),
            &sampler,
            &self.checkpoints,
        );
        let descriptors = stage.run(
            ids,
            self.executor.as_ref(),
            self.settings.extract_threads,
        )?;
        Ok((descriptors, StageStatus::Computed))
    }

    fn vocabulary(
        &self,
        descriptors: &DescriptorsMap,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(Vocabulary, StageStatus), PipelineError> {
        if let Some(vocabulary) = self.checkpoints.load::<Vocabulary>(VOCABULARY_ID)? {
            logger.info("Using cached vocabulary.");
            return Ok((vocabulary, StageStatus::Cached));
        }
        if descriptors.is_empty() {
            return Err(PipelineError::NoDescriptors);
        }

        logger.info("Generating vocabulary.");
        let builder = VocabularyBuilder::new(
            self.settings.vocabulary_size,
            self.settings.vocabulary_attempts,
            self.settings.kmeans_epsilon,
        );
        let vocabulary = builder.build(descriptors, self.clustering.as_ref())?;
        self.checkpoints.store(VOCABULARY_ID, &vocabulary)?;

        let stored = self
            .checkpoints
            .load::<Vocabulary>(VOCABULARY_ID)?
            .ok_or_else(|| PipelineError::ArtifactVanished {
                namespace: Namespace::Vocabulary,
                id: VOCABULARY_ID.to_string(),
            })?;
        Ok((stored, StageStatus::Computed))
    }

    fn features(
        &self,
        ids: &[String],
        descriptors: &DescriptorsMap,
        vocabulary: &Vocabulary,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(FeaturesMap, StageStatus), PipelineError> {
        let cached = self.checkpoints.load_all::<FeatureHistogram, _, _>(ids)?;
        if !cached.is_empty() {
            logger.info("Using cached features.");
            return Ok((cached, StageStatus::Cached));
        }

        logger.info("Computing features.");
        let stage = ComputeFeaturesStage::new(descriptors, vocabulary, &self.checkpoints);
        let features = stage.run(self.executor.as_ref(), self.settings.feature_threads)?;
        Ok((features, StageStatus::Computed))
    }
}

/// Runs one stage and reports its wall-clock time, successful or not.
fn timed<T>(
    logger: &mut dyn PipelineLogger,
    stage: &str,
    run: impl FnOnce(&mut dyn PipelineLogger) -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    let start = Instant::now();
    let result = run(logger);
    logger.timing(stage, start.elapsed().as_secs_f64() * 1000.0);
    result
}
