use crate::bovw::quantizer;
use crate::checkpoint::domain::checkpoint_store::CheckpointStore;
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::stage_executor::StageExecutor;
use crate::pipeline::work_queue::WorkQueue;
use crate::shared::artifact_maps::{DescriptorsMap, FeaturesMap};
use crate::shared::feature_histogram::FeatureHistogram;
use crate::shared::vocabulary::Vocabulary;

pub const STAGE_NAME: &str = "features";

/// Quantizes every webcam's descriptors against the vocabulary and
/// checkpoints the histograms.
pub struct ComputeFeaturesStage<'a> {
    descriptors: &'a DescriptorsMap,
    vocabulary: &'a Vocabulary,
    checkpoints: &'a CheckpointStore,
}

impl<'a> ComputeFeaturesStage<'a> {
    pub fn new(
        descriptors: &'a DescriptorsMap,
        vocabulary: &'a Vocabulary,
        checkpoints: &'a CheckpointStore,
    ) -> Self {
        Self {
            descriptors,
            vocabulary,
            checkpoints,
        }
    }

    pub fn run(
        &self,
        executor: &dyn StageExecutor,
        threads: usize,
    ) -> Result<FeaturesMap, PipelineError> {
        let queue = WorkQueue::from_items(self.descriptors.keys().cloned());
        executor.execute(STAGE_NAME, &queue, threads, &|id| self.quantize(id))?;
        Ok(self
            .checkpoints
            .load_all::<FeatureHistogram, _, _>(self.descriptors.keys())?)
    }

    fn quantize(&self, id: &str) -> Result<(), PipelineError> {
        let descriptors = self
            .descriptors
            .get(id)
            .ok_or_else(|| PipelineError::MissingDescriptors { id: id.to_string() })?;
        let histogram = quantizer::quantize(descriptors, self.vocabulary)?;
        log::debug!("Webcam {id}: {} descriptors quantized", histogram.total());
        self.checkpoints.store(id, &histogram)?;
        Ok(())
    }
}
