use crate::checkpoint::domain::checkpoint_store::CheckpointStore;
use crate::frames::domain::frame_source::FrameSource;
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::stage_executor::StageExecutor;
use crate::pipeline::work_queue::WorkQueue;
use crate::shared::artifact_maps::DescriptorsMap;
use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::vision::domain::representative_sampler::RepresentativeSampler;
use crate::vision::domain::vision_backend::VisionBackend;

pub const STAGE_NAME: &str = "descriptors";

/// Describes every webcam and checkpoints the non-degenerate results.
///
/// The returned map is re-read from the checkpoint store, so it holds exactly
/// what a later run would find on disk.
pub struct ExtractDescriptorsStage<'a> {
    frames: &'a dyn FrameSource,
    vision: &'a dyn VisionBackend,
    sampler: &'a RepresentativeSampler,
    checkpoints: &'a CheckpointStore,
}

impl<'a> ExtractDescriptorsStage<'a> {
    pub fn new(
        frames: &'a dyn FrameSource,
        vision: &'a dyn VisionBackend,
        sampler: &'a RepresentativeSampler,
        checkpoints: &'a CheckpointStore,
    ) -> Self {
        Self {
            frames,
            vision,
            sampler,
            checkpoints,
        }
    }

    pub fn run(
        &self,
        ids: &[String],
        executor: &dyn StageExecutor,
        threads: usize,
    ) -> Result<DescriptorsMap, PipelineError> {
        let queue = WorkQueue::from_items(ids.iter().cloned());
        executor.execute(STAGE_NAME, &queue, threads, &|id| self.describe(id))?;
        Ok(self.checkpoints.load_all::<DescriptorMatrix, _, _>(ids)?)
    }

    fn describe(&self, id: &str) -> Result<(), PipelineError> {
        let frames = self.frames.frames(id)?;
        match self.sampler.sample(id, &frames, self.vision)? {
            Some(descriptors) => {
                log::debug!("Webcam {id}: {} descriptors", descriptors.len());
                self.checkpoints.store(id, &descriptors)?;
            }
            None => log::warn!(
                "Skipping webcam {id}: {} frames, {} required or no keypoints found",
                frames.len(),
                self.sampler.frames_per_identifier()
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::domain::artifact::Namespace;
    use crate::checkpoint::infrastructure::memory_artifact_store::MemoryArtifactStore;
    use crate::frames::domain::frame_source::FrameSourceError;
    use crate::pipeline::infrastructure::threaded_stage_executor::ThreadedStageExecutor;
    use crate::shared::frame::Frame;
    use crate::vision::domain::vision_backend::VisionError;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    struct CountFrameSource {
        counts: BTreeMap<String, usize>,
    }

    impl FrameSource for CountFrameSource {
        fn list_identifiers(&self) -> Result<Vec<String>, FrameSourceError> {
            Ok(self.counts.keys().cloned().collect())
        }

        fn frames(&self, id: &str) -> Result<Vec<Frame>, FrameSourceError> {
            let count = *self
                .counts
                .get(id)
                .ok_or_else(|| FrameSourceError::UnknownIdentifier(id.to_string()))?;
            Ok((0..count)
                .map(|i| Frame::new(vec![i as u8; 4], 2, 2, 1, i))
                .collect())
        }

        fn representative_frame(&self, _id: &str) -> Result<Option<Frame>, FrameSourceError> {
            Ok(None)
        }
    }

    /// One 2-wide row per frame.
    struct RowPerFrame;

    impl VisionBackend for RowPerFrame {
        fn detect_and_describe(
            &self,
            frames: &[Frame],
            _max_per_image: usize,
        ) -> Result<Vec<DescriptorMatrix>, VisionError> {
            frames
                .iter()
                .map(|f| -> Result<DescriptorMatrix, VisionError> {
                    let v = f.data()[0] as f32;
                    Ok(DescriptorMatrix::from_rows(&[vec![v, v]], 2)?)
                })
                .collect()
        }
    }

    fn source(counts: &[(&str, usize)]) -> CountFrameSource {
        CountFrameSource {
            counts: counts.iter().map(|&(id, n)| (id.to_string(), n)).collect(),
        }
    }

    #[test]
    fn test_degenerate_webcams_are_not_stored() {
        let frames = source(&[("a", 10), ("b", 2), ("c", 8)]);
        let sampler = RepresentativeSampler::new(8, 5, Some(1));
        let memory = Arc::new(MemoryArtifactStore::new());
        let checkpoints = CheckpointStore::new(memory.clone());
        let ids = frames.list_identifiers().unwrap();

        let stage = ExtractDescriptorsStage::new(&frames, &RowPerFrame, &sampler, &checkpoints);
        let descriptors = stage.run(&ids, &ThreadedStageExecutor::new(), 2).unwrap();

        assert_eq!(descriptors.keys().collect::<Vec<_>>(), ["a", "c"]);
        assert!(descriptors.values().all(|d| d.len() == 8));
        assert_eq!(memory.count(Namespace::Descriptors), 2);
    }

    #[test]
    fn test_unknown_webcam_fails_the_stage() {
        let frames = source(&[("a", 10)]);
        let sampler = RepresentativeSampler::new(8, 5, Some(1));
        let checkpoints = CheckpointStore::new(Arc::new(MemoryArtifactStore::new()));
        let ids = vec!["a".to_string(), "ghost".to_string()];

        let stage = ExtractDescriptorsStage::new(&frames, &RowPerFrame, &sampler, &checkpoints);
        let result = stage.run(&ids, &ThreadedStageExecutor::new(), 1);

        assert!(matches!(
            result,
            Err(PipelineError::Frames(FrameSourceError::UnknownIdentifier(ref id))) if id == "ghost"
        ));
    }
}
