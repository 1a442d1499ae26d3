//! Recognition engine adapter
//!
//! The core does not ship its own recognition engine; it wraps an external
//! capability behind [`TextRecognizer`] and obtains instances through a
//! [`RecognizerProvider`]. Reader construction is expensive, so instances are
//! cached and reused through [`RecognizerPool`].

pub mod pool;
#[cfg(feature = "tesseract")]
pub mod tesseract;

use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::RecognitionError;

pub use pool::RecognizerPool;
#[cfg(feature = "tesseract")]
pub use tesseract::{TesseractProvider, TesseractRecognizer};

/// Axis-aligned bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shift the box by an offset (used to map region-local coordinates into
    /// the parent image's space).
    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// How much detail a recognition call should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionDetail {
    /// Text plus bounding boxes and confidences.
    Detailed,
    /// Text only; bounding boxes and confidences are absent. Used as the
    /// reduced-detail retry after a detailed call fails.
    TextOnly,
}

/// One unit of recognized text
///
/// `bbox` and `conf` may be absent when the span came from a text-only call;
/// that is a deliberate degraded mode, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedSpan {
    /// Recognized text content.
    pub text: String,
    /// Bounding box, absent in text-only mode.
    pub bbox: Option<BoundingBox>,
    /// Confidence in [0, 1], absent in text-only mode.
    pub conf: Option<f32>,
}

impl RecognizedSpan {
    /// Create a detailed span.
    pub fn new(text: impl Into<String>, bbox: BoundingBox, conf: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
            conf: Some(conf),
        }
    }

    /// Create a text-only span with no location or confidence.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
            conf: None,
        }
    }
}

/// An external text recognition capability
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in an image.
    ///
    /// In [`RecognitionDetail::TextOnly`] mode implementations may return
    /// spans without boxes or confidences.
    fn recognize(
        &self,
        image: &RgbImage,
        detail: RecognitionDetail,
    ) -> Result<Vec<RecognizedSpan>, RecognitionError>;
}

/// Factory for recognizers configured for a language set
///
/// Injected into the pipeline so tests can substitute a scripted recognizer
/// and callers can choose their engine.
pub trait RecognizerProvider: Send + Sync {
    /// Construct a recognizer loaded with the given languages.
    fn build(&self, languages: &[String]) -> Result<Arc<dyn TextRecognizer>, RecognitionError>;
}
