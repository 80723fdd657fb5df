use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::frame::Frame;
use crate::vision::domain::vision_backend::{VisionBackend, VisionError};

/// Builds one representative descriptor matrix per webcam.
///
/// Draws `frames_per_identifier` frames uniformly at random with replacement,
/// describes each one and stacks the results. A webcam with fewer frames than
/// the sample size, or whose sample yields no descriptors, is degenerate and
/// produces `None`.
pub struct RepresentativeSampler {
    frames_per_identifier: usize,
    max_descriptors_per_frame: usize,
    seed: Option<u64>,
}

impl RepresentativeSampler {
    pub fn new(
        frames_per_identifier: usize,
        max_descriptors_per_frame: usize,
        seed: Option<u64>,
    ) -> Self {
        Self {
            frames_per_identifier,
            max_descriptors_per_frame,
            seed,
        }
    }

    pub fn frames_per_identifier(&self) -> usize {
        self.frames_per_identifier
    }

    pub fn sample(
        &self,
        id: &str,
        frames: &[Frame],
        backend: &dyn VisionBackend,
    ) -> Result<Option<DescriptorMatrix>, VisionError> {
        if frames.is_empty() || frames.len() < self.frames_per_identifier {
            return Ok(None);
        }

        let mut rng = self.rng_for(id);
        let subset: Vec<Frame> = (0..self.frames_per_identifier)
            .map(|_| frames[rng.random_range(0..frames.len())].clone())
            .collect();

        let parts = backend.detect_and_describe(&subset, self.max_descriptors_per_frame)?;
        let combined = DescriptorMatrix::vstack(&parts)?;
        Ok((!combined.is_empty()).then_some(combined))
    }

    /// Seeded runs derive a per-webcam stream so results do not depend on
    /// which worker handles which webcam.
    fn rng_for(&self, id: &str) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ fnv1a(id.as_bytes())),
            None => StdRng::from_os_rng(),
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
