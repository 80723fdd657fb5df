//! FAST corners described by gradient-orientation histograms.
//!
//! Each keypoint's 16×16 neighbourhood is split into a 4×4 grid of cells and
//! every cell contributes an 8-bin histogram of gradient orientations weighted
//! by gradient magnitude, giving 128-wide descriptors in the style of SIFT.

use std::cmp::Ordering;
use std::f32::consts::PI;

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::corners::{corners_fast9, Corner};
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use ndarray::Array2;

use crate::shared::descriptor_matrix::DescriptorMatrix;
use crate::shared::frame::Frame;
use crate::vision::domain::vision_backend::{VisionBackend, VisionError};

pub const DESCRIPTOR_WIDTH: usize = (GRID_CELLS * GRID_CELLS) as usize * ORIENTATION_BINS;

pub const DEFAULT_BLUR_SIGMA: f32 = 1.0;
/// Minimum intensity difference for a FAST circle pixel to count.
pub const DEFAULT_FAST_THRESHOLD: u8 = 20;

const GRID_CELLS: u32 = 4;
const CELL_SIZE: u32 = 4;
const ORIENTATION_BINS: usize = 8;
const PATCH_RADIUS: u32 = GRID_CELLS * CELL_SIZE / 2;
const DESCRIPTOR_CLAMP: f32 = 0.2;

type Gradient = ImageBuffer<Luma<i16>, Vec<i16>>;

pub struct GradientHistogramBackend {
    blur_sigma: f32,
    fast_threshold: u8,
}

impl GradientHistogramBackend {
    /// A non-positive `blur_sigma` disables smoothing before the gradients.
    pub fn new(blur_sigma: f32, fast_threshold: u8) -> Self {
        Self {
            blur_sigma,
            fast_threshold,
        }
    }

    fn describe_frame(
        &self,
        frame: &Frame,
        max_per_image: usize,
    ) -> Result<DescriptorMatrix, VisionError> {
        let gray = match frame.channels() {
            1 => frame.to_gray_image(),
            3 => frame.to_luma().to_gray_image(),
            channels => {
                return Err(VisionError::UnsupportedFrame {
                    index: frame.index(),
                    channels,
                })
            }
        }
        .ok_or_else(|| {
            VisionError::Backend(format!(
                "frame {}: pixel buffer does not match its dimensions",
                frame.index()
            ))
        })?;

        let mut keypoints = detect_keypoints(&gray, self.fast_threshold);
        if max_per_image > 0 {
            keypoints.truncate(max_per_image);
        }
        if keypoints.is_empty() {
            return Ok(DescriptorMatrix::empty(DESCRIPTOR_WIDTH));
        }

        let smoothed = if self.blur_sigma > 0.0 {
            gaussian_blur_f32(&gray, self.blur_sigma)
        } else {
            gray
        };
        let dx = horizontal_sobel(&smoothed);
        let dy = vertical_sobel(&smoothed);

        let mut rows = Array2::zeros((keypoints.len(), DESCRIPTOR_WIDTH));
        for (row, corner) in rows.rows_mut().into_iter().zip(&keypoints) {
            let descriptor = describe(&dx, &dy, corner);
            for (dst, src) in row.into_iter().zip(descriptor) {
                *dst = src;
            }
        }
        Ok(DescriptorMatrix::new(rows))
    }
}

impl Default for GradientHistogramBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_SIGMA, DEFAULT_FAST_THRESHOLD)
    }
}

impl VisionBackend for GradientHistogramBackend {
    fn detect_and_describe(
        &self,
        frames: &[Frame],
        max_per_image: usize,
    ) -> Result<Vec<DescriptorMatrix>, VisionError> {
        frames
            .iter()
            .map(|frame| self.describe_frame(frame, max_per_image))
            .collect()
    }
}

/// FAST-9 corners whose full patch fits in the image, strongest first.
fn detect_keypoints(gray: &GrayImage, threshold: u8) -> Vec<Corner> {
    let (width, height) = gray.dimensions();
    let mut corners: Vec<Corner> = corners_fast9(gray, threshold)
        .into_iter()
        .filter(|c| {
            c.x >= PATCH_RADIUS
                && c.y >= PATCH_RADIUS
                && c.x + PATCH_RADIUS <= width
                && c.y + PATCH_RADIUS <= height
        })
        .collect();
    // Stable, so equal scores keep scan order.
    corners.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    corners
}

fn describe(dx: &Gradient, dy: &Gradient, corner: &Corner) -> Vec<f32> {
    let mut descriptor = vec![0.0f32; DESCRIPTOR_WIDTH];
    for py in 0..2 * PATCH_RADIUS {
        for px in 0..2 * PATCH_RADIUS {
            let x = corner.x + px - PATCH_RADIUS;
            let y = corner.y + py - PATCH_RADIUS;
            let gx = dx.get_pixel(x, y)[0] as f32;
            let gy = dy.get_pixel(x, y)[0] as f32;
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude == 0.0 {
                continue;
            }
            let angle = gy.atan2(gx);
            let bin = (((angle + PI) / (2.0 * PI)) * ORIENTATION_BINS as f32) as usize
                % ORIENTATION_BINS;
            let cell = ((py / CELL_SIZE) * GRID_CELLS + px / CELL_SIZE) as usize;
            descriptor[cell * ORIENTATION_BINS + bin] += magnitude;
        }
    }

    // Normalise, damp dominant gradients, renormalise.
    normalize(&mut descriptor);
    for v in &mut descriptor {
        *v = v.min(DESCRIPTOR_CLAMP);
    }
    normalize(&mut descriptor);
    descriptor
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
