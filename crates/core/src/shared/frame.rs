use image::GrayImage;

/// A single decoded webcam frame: contiguous bytes in row-major order.
///
/// Grayscale frames have one channel, colour frames three (RGB). Decoding
/// happens at I/O boundaries only; the vision layer reads pixels through
/// [`Frame::to_gray_image`].
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Position of the frame within its webcam's lexicographic frame list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a single-channel copy using Rec. 601 luma weights.
    ///
    /// Already-grayscale frames are cloned unchanged.
    pub fn to_luma(&self) -> Frame {
        if self.channels == 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let data = self
            .data
            .chunks_exact(channels)
            .map(|px| {
                let (r, g, b) = if channels >= 3 {
                    (px[0] as f32, px[1] as f32, px[2] as f32)
                } else {
                    (px[0] as f32, px[0] as f32, px[0] as f32)
                };
                (0.299 * r + 0.587 * g + 0.114 * b).round().min(255.0) as u8
            })
            .collect();
        Frame::new(data, self.width, self.height, 1, self.index)
    }

    /// Copies a grayscale frame into an `image` buffer; `None` for
    /// multi-channel frames.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        if self.channels != 1 {
            return None;
        }
        GrayImage::from_raw(self.width, self.height, self.data.clone())
    }
}
