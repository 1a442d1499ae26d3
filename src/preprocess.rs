//! Image preprocessing for recognition
//!
//! Turns the normalized color image into a binarized image the recognizer
//! copes well with. Two capability variants exist: the adaptive path built on
//! imageproc, and a reduced-quality basic path for environments where the
//! adaptive filters are not wanted. Both are total: preprocessing always
//! returns some binarized image and never fails.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::adaptive_threshold;
use imageproc::filter::median_filter;
use tracing::debug;

/// Shorter image dimension below which the image is upscaled 2x.
/// Small chat screenshots lose stroke detail without this.
const UPSCALE_MIN_DIM: u32 = 400;

/// Adaptive threshold block radius (block size 11).
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;

/// Which preprocessing implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreprocessBackend {
    /// Median blur + adaptive thresholding (imageproc).
    #[default]
    Adaptive,
    /// Luminosity grayscale + global mean threshold. Lower quality,
    /// best-effort degradation.
    Basic,
}

/// Preprocessor producing a binarized image for recognition
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor {
    backend: PreprocessBackend,
}

impl Preprocessor {
    /// Create a preprocessor using the given backend.
    pub fn new(backend: PreprocessBackend) -> Self {
        Self { backend }
    }

    /// Binarize a color image. Always returns an image of the same or 2x
    /// spatial dimensions.
    pub fn binarize(&self, image: &RgbImage) -> GrayImage {
        match self.backend {
            PreprocessBackend::Adaptive => binarize_adaptive(image),
            PreprocessBackend::Basic => binarize_basic(image),
        }
    }
}

fn binarize_adaptive(image: &RgbImage) -> GrayImage {
    let gray = imageops::grayscale(image);
    // 3x3 median blur suppresses compression noise without eating strokes
    let gray = median_filter(&gray, 1, 1);

    let (w, h) = gray.dimensions();
    let gray = if w.min(h) < UPSCALE_MIN_DIM {
        debug!("upscaling {}x{} image 2x before thresholding", w, h);
        imageops::resize(&gray, w * 2, h * 2, FilterType::Triangle)
    } else {
        gray
    };

    // Adaptive thresholding tolerates the uneven lighting and gradient
    // backgrounds typical of chat screenshots
    adaptive_threshold(&gray, ADAPTIVE_BLOCK_RADIUS)
}

fn binarize_basic(image: &RgbImage) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (x, y, px) in image.enumerate_pixels() {
        let lum = 0.2989 * px.0[0] as f32 + 0.5870 * px.0[1] as f32 + 0.1140 * px.0[2] as f32;
        gray.put_pixel(x, y, Luma([lum as u8]));
    }

    let gray = if w.min(h) < UPSCALE_MIN_DIM {
        replicate_2x(&gray)
    } else {
        gray
    };

    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    let mean = (sum / gray.pixels().len().max(1) as u64) as u8;

    let mut out = GrayImage::new(gray.width(), gray.height());
    for (x, y, px) in gray.enumerate_pixels() {
        let v = if px.0[0] > mean { 255 } else { 0 };
        out.put_pixel(x, y, Luma([v]));
    }
    out
}

/// Upscale by exact pixel replication (nearest-neighbor, factor 2).
fn replicate_2x(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w * 2, h * 2);
    for (x, y, px) in gray.enumerate_pixels() {
        for dy in 0..2 {
            for dx in 0..2 {
                out.put_pixel(x * 2 + dx, y * 2 + dy, *px);
            }
        }
    }
    out
}
