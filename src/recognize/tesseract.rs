//! Tesseract-backed recognizer (optional `tesseract` feature)
//!
//! Thin adapter over leptess. Tesseract returns one block of text per call,
//! so each recognition yields a single span; confidence is the engine's mean
//! text confidence. Handles are not shareable across threads, so one is
//! created per call from the stored language specification.

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbImage};
use leptess::LepTess;
use tracing::debug;

use crate::error::RecognitionError;
use crate::recognize::{
    RecognitionDetail, RecognizedSpan, RecognizerProvider, TextRecognizer,
};

/// Recognizer that shells text through a Tesseract instance
pub struct TesseractRecognizer {
    /// Tesseract language specification, e.g. `"eng+urd"`.
    lang_spec: String,
}

impl TesseractRecognizer {
    /// Create a recognizer for a Tesseract language spec.
    pub fn new(lang_spec: impl Into<String>) -> Self {
        Self {
            lang_spec: lang_spec.into(),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(
        &self,
        image: &RgbImage,
        detail: RecognitionDetail,
    ) -> Result<Vec<RecognizedSpan>, RecognitionError> {
        let mut tess = LepTess::new(None, &self.lang_spec)
            .map_err(|e| RecognitionError::Unavailable(e.to_string()))?;

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| RecognitionError::Backend(e.to_string()))?;
        tess.set_image_from_mem(&png)
            .map_err(|e| RecognitionError::Backend(e.to_string()))?;

        let text = tess
            .get_utf8_text()
            .map_err(|e| RecognitionError::Backend(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![]);
        }

        debug!(len = text.len(), "tesseract recognized text");
        let span = match detail {
            RecognitionDetail::Detailed => {
                let conf = (tess.mean_text_conf().clamp(0, 100) as f32) / 100.0;
                RecognizedSpan {
                    text: text.to_string(),
                    bbox: None,
                    conf: Some(conf),
                }
            }
            RecognitionDetail::TextOnly => RecognizedSpan::text_only(text),
        };
        Ok(vec![span])
    }
}

/// Provider constructing [`TesseractRecognizer`] instances
///
/// Maps the pipeline's short language codes onto Tesseract's ISO 639-3
/// traineddata names.
pub struct TesseractProvider;

impl RecognizerProvider for TesseractProvider {
    fn build(&self, languages: &[String]) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        let spec: Vec<&str> = languages
            .iter()
            .map(|l| match l.as_str() {
                "en" | "eng" => "eng",
                "ur" | "urd" => "urd",
                other => other,
            })
            .collect();
        if spec.is_empty() {
            return Err(RecognitionError::Unavailable(
                "empty language set".to_string(),
            ));
        }
        Ok(Arc::new(TesseractRecognizer::new(spec.join("+"))))
    }
}
