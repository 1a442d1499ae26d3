//! Text region detection
//!
//! Heuristic segmentation of a chat screenshot into candidate text-bearing
//! rectangles. Message bubbles stack vertically, so a morphological gradient
//! followed by a wide horizontal dilation merges characters into line-level
//! blobs while keeping separate lines apart. When detection is disabled (or
//! nothing qualifies) the caller treats the whole image as a single region.

use image::imageops::{self, crop_imm};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, erode};
use tracing::debug;

/// Minimum region area in pixels; smaller blobs are noise.
const MIN_AREA: u32 = 400;

/// Maximum region area as a fraction of the image; larger blobs are
/// background.
const MAX_AREA_RATIO: f32 = 0.9;

/// Horizontal dilation element half-width (25x3 kernel).
const DILATE_HALF_WIDTH: u32 = 12;

/// Horizontal dilation element half-height.
const DILATE_HALF_HEIGHT: u32 = 1;

/// Which region detection implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionBackend {
    /// Gradient/morphology segmentation (imageproc).
    #[default]
    Morphological,
    /// No detection; always returns an empty list so callers fall back to
    /// whole-image recognition.
    Disabled,
}

/// A rectangular sub-image with its source coordinates
///
/// Coordinates are clamped to the parent image's bounds, in the parent's
/// coordinate space.
#[derive(Debug, Clone)]
pub struct Region {
    /// Top edge (inclusive).
    pub top: u32,
    /// Left edge (inclusive).
    pub left: u32,
    /// Bottom edge (exclusive).
    pub bottom: u32,
    /// Right edge (exclusive).
    pub right: u32,
    /// Cropped pixels for this region.
    pub image: RgbImage,
}

impl Region {
    /// A region covering the entire image.
    pub fn whole(image: &RgbImage) -> Self {
        let (w, h) = image.dimensions();
        Self {
            top: 0,
            left: 0,
            bottom: h,
            right: w,
            image: image.clone(),
        }
    }
}

/// Detector producing regions sorted top-to-bottom
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionDetector {
    backend: RegionBackend,
}

impl RegionDetector {
    /// Create a detector using the given backend.
    pub fn new(backend: RegionBackend) -> Self {
        Self { backend }
    }

    /// Detect candidate text regions, sorted by top edge ascending.
    ///
    /// Returns an empty vec when the backend is disabled or nothing
    /// qualifies; callers must then treat the whole image as one region.
    pub fn detect(&self, image: &RgbImage) -> Vec<Region> {
        match self.backend {
            RegionBackend::Morphological => detect_morphological(image),
            RegionBackend::Disabled => Vec::new(),
        }
    }
}

fn detect_morphological(image: &RgbImage) -> Vec<Region> {
    let gray = imageops::grayscale(image);
    let (img_w, img_h) = gray.dimensions();
    if img_w < 3 || img_h < 3 {
        return Vec::new();
    }

    // Morphological gradient reveals text stroke edges
    let dilated = dilate(&gray, Norm::LInf, 1);
    let eroded = erode(&gray, Norm::LInf, 1);
    let mut grad = GrayImage::new(img_w, img_h);
    for (x, y, px) in grad.enumerate_pixels_mut() {
        *px = Luma([dilated.get_pixel(x, y).0[0].saturating_sub(eroded.get_pixel(x, y).0[0])]);
    }

    let blurred = gaussian_blur_f32(&grad, 0.8);

    let level = otsu_level(&blurred);
    let mut mask = GrayImage::new(img_w, img_h);
    for (x, y, px) in mask.enumerate_pixels_mut() {
        *px = Luma([if blurred.get_pixel(x, y).0[0] > level {
            255
        } else {
            0
        }]);
    }

    // Wide horizontal dilation merges characters and words into line blobs
    // without bridging vertically separated lines
    for _ in 0..2 {
        mask = dilate_rect(&mask, DILATE_HALF_WIDTH, DILATE_HALF_HEIGHT);
    }

    let max_area = (img_w as f32 * img_h as f32 * MAX_AREA_RATIO) as u32;
    let mut rects: Vec<(u32, u32, u32, u32)> = Vec::new();

    for contour in find_contours::<u32>(&mask) {
        if contour.border_type != BorderType::Outer || contour.points.is_empty() {
            continue;
        }
        let min_x = contour.points.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = contour.points.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = contour.points.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = contour.points.iter().map(|p| p.y).max().unwrap_or(0);

        let w = max_x - min_x + 1;
        let h = max_y - min_y + 1;
        let area = w * h;
        if area < MIN_AREA || area > max_area {
            continue;
        }

        // Pad so stroke edges are not clipped, then clamp to image bounds
        let pad_x = w * 2 / 100 + 2;
        let pad_y = h * 5 / 100 + 2;
        let left = min_x.saturating_sub(pad_x);
        let top = min_y.saturating_sub(pad_y);
        let right = (max_x + 1 + pad_x).min(img_w);
        let bottom = (max_y + 1 + pad_y).min(img_h);
        rects.push((top, left, bottom, right));
    }

    // Top-to-bottom approximates reading order for stacked chat bubbles
    rects.sort_by_key(|r| (r.0, r.1));
    debug!("detected {} candidate text regions", rects.len());

    rects
        .into_iter()
        .map(|(top, left, bottom, right)| Region {
            top,
            left,
            bottom,
            right,
            image: crop_imm(image, left, top, right - left, bottom - top).to_image(),
        })
        .collect()
}

/// Binary dilation with a (2*half_w+1) x (2*half_h+1) rectangular element,
/// applied as two separable max passes.
fn dilate_rect(mask: &GrayImage, half_w: u32, half_h: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut horiz = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let lo = x.saturating_sub(half_w);
            let hi = (x + half_w).min(w - 1);
            let any = (lo..=hi).any(|cx| mask.get_pixel(cx, y).0[0] > 0);
            horiz.put_pixel(x, y, Luma([if any { 255 } else { 0 }]));
        }
    }
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let lo = y.saturating_sub(half_h);
        let hi = (y + half_h).min(h - 1);
        for x in 0..w {
            let any = (lo..=hi).any(|cy| horiz.get_pixel(x, cy).0[0] > 0);
            out.put_pixel(x, y, Luma([if any { 255 } else { 0 }]));
        }
    }
    out
}
