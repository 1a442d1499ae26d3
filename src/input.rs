//! Image input loading and normalization
//!
//! Accepts a file path, a decoded image, or a raw pixel buffer, and
//! normalizes all of them to an in-memory RGB image. The pipelines only ever
//! see the normalized form.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::OcrError;

/// Channel layout of a raw pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLayout {
    /// Single-channel luminance, row-major.
    Gray,
    /// Interleaved RGB, row-major.
    Rgb,
}

/// An image handed to a pipeline entry point
///
/// Construct via the `From` impls, or directly for raw buffers.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Path to an image file on disk.
    Path(PathBuf),
    /// An already-decoded image.
    Decoded(DynamicImage),
    /// A raw pixel buffer with explicit dimensions and layout.
    Raw {
        /// Pixel data, row-major.
        data: Vec<u8>,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Channel layout of `data`.
        layout: RawLayout,
    },
}

impl ImageInput {
    /// Normalize to an RGB image with a fixed channel order.
    ///
    /// Single-channel buffers are expanded to three channels. Fails with
    /// [`OcrError::UnsupportedInput`] when the path cannot be decoded or the
    /// raw buffer does not match its declared dimensions.
    pub fn into_rgb(self) -> Result<RgbImage, OcrError> {
        match self {
            ImageInput::Path(path) => {
                let img = image::open(&path).map_err(|e| {
                    OcrError::UnsupportedInput(format!("cannot decode {}: {e}", path.display()))
                })?;
                Ok(img.to_rgb8())
            }
            ImageInput::Decoded(img) => Ok(img.to_rgb8()),
            ImageInput::Raw {
                data,
                width,
                height,
                layout,
            } => raw_to_rgb(data, width, height, layout),
        }
    }
}

fn raw_to_rgb(
    data: Vec<u8>,
    width: u32,
    height: u32,
    layout: RawLayout,
) -> Result<RgbImage, OcrError> {
    let pixels = width as usize * height as usize;
    match layout {
        RawLayout::Gray => {
            if data.len() != pixels {
                return Err(OcrError::UnsupportedInput(format!(
                    "gray buffer of {} bytes does not match {width}x{height}",
                    data.len()
                )));
            }
            let gray = GrayImage::from_raw(width, height, data)
                .ok_or_else(|| OcrError::UnsupportedInput("invalid gray buffer".to_string()))?;
            Ok(DynamicImage::ImageLuma8(gray).to_rgb8())
        }
        RawLayout::Rgb => {
            if data.len() != pixels * 3 {
                return Err(OcrError::UnsupportedInput(format!(
                    "rgb buffer of {} bytes does not match {width}x{height}",
                    data.len()
                )));
            }
            RgbImage::from_raw(width, height, data)
                .ok_or_else(|| OcrError::UnsupportedInput("invalid rgb buffer".to_string()))
        }
    }
}

impl From<&Path> for ImageInput {
    fn from(path: &Path) -> Self {
        ImageInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(img: DynamicImage) -> Self {
        ImageInput::Decoded(img)
    }
}

impl From<RgbImage> for ImageInput {
    fn from(img: RgbImage) -> Self {
        ImageInput::Decoded(DynamicImage::ImageRgb8(img))
    }
}

impl From<GrayImage> for ImageInput {
    fn from(img: GrayImage) -> Self {
        ImageInput::Decoded(DynamicImage::ImageLuma8(img))
    }
}
