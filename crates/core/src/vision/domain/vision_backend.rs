use thiserror::Error;

use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("frame {index} has {channels} channels; expected 1 or 3")]
    UnsupportedFrame { index: usize, channels: u8 },
    #[error("descriptor rows have inconsistent widths: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("vision backend failed: {0}")]
    Backend(String),
}

/// Keypoint detection plus descriptor extraction.
pub trait VisionBackend: Send + Sync {
    /// Returns one descriptor matrix per input frame, in input order.
    ///
    /// Rows come from the strongest keypoints first. When `max_per_image` is
    /// non-zero each matrix is truncated to that many rows.
    fn detect_and_describe(
        &self,
        frames: &[Frame],
        max_per_image: usize,
    ) -> Result<Vec<DescriptorMatrix>, VisionError>;
}
