//! Pipeline orchestration
//!
//! Ties input normalization, preprocessing, region detection, recognition,
//! script handling, and field extraction into three entry points:
//!
//! - [`OcrPipeline::extract_text`]: whole-image recognition with text
//!   cleaning, tolerant of a missing recognizer (degrades to empty output).
//! - [`OcrPipeline::extract_text_whatsapp_aware`]: region-segmented
//!   recognition tuned for chat screenshots, with confidence filtering and
//!   per-region retry.
//! - [`OcrPipeline::extract_text_with_urdu_support`]: the region pipeline
//!   plus language identification and Urdu shaping/reordering.

use std::sync::Arc;

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::OcrError;
use crate::fields::{extract_fields, ExtractedFields};
use crate::input::ImageInput;
use crate::preprocess::{PreprocessBackend, Preprocessor};
use crate::recognize::{
    RecognitionDetail, RecognizedSpan, RecognizerPool, RecognizerProvider, TextRecognizer,
};
use crate::regions::{Region, RegionBackend, RegionDetector};
use crate::script;

/// Default per-span confidence floor for the region pipelines.
pub const MIN_CONFIDENCE: f32 = 0.3;

/// Custom preprocessing hook.
///
/// When supplied in [`RegionOptions`], it replaces the built-in preprocessor
/// for that call; on failure the pipeline logs and falls back to the built-in
/// path rather than aborting.
pub type PreprocessFn = dyn Fn(&RgbImage) -> anyhow::Result<DynamicImage> + Send + Sync;

/// Static configuration of a pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Language codes requested from the recognizer provider.
    pub languages: Vec<String>,
    /// Preprocessing implementation.
    pub preprocess: PreprocessBackend,
    /// Region detection implementation.
    pub regions: RegionBackend,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            preprocess: PreprocessBackend::default(),
            regions: RegionBackend::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the recognizer language codes.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Set the preprocessing backend.
    pub fn with_preprocess_backend(mut self, backend: PreprocessBackend) -> Self {
        self.preprocess = backend;
        self
    }

    /// Set the region detection backend.
    pub fn with_region_backend(mut self, backend: RegionBackend) -> Self {
        self.regions = backend;
        self
    }
}

/// How the plain pipeline cleans recognized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleaningMode {
    /// Strip everything outside printable ASCII after normalization.
    #[default]
    AsciiOnly,
    /// Keep non-ASCII content; drop only control characters.
    UnicodePreserving,
}

/// Per-call options for [`OcrPipeline::extract_text`]
#[derive(Clone, Default)]
pub struct PlainOptions {
    /// Text cleaning mode.
    pub cleaning: CleaningMode,
    /// Recognizer to use instead of the pipeline's pooled instance.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,
}

/// Per-call options for the region pipelines
#[derive(Default)]
pub struct RegionOptions<'a> {
    /// Confidence floor; spans below it are dropped. `None` means
    /// [`MIN_CONFIDENCE`].
    pub min_confidence: Option<f32>,
    /// Optional preprocessing hook replacing the built-in preprocessor.
    pub preprocess: Option<&'a PreprocessFn>,
}

impl<'a> RegionOptions<'a> {
    fn confidence_floor(&self) -> f32 {
        self.min_confidence.unwrap_or(MIN_CONFIDENCE)
    }
}

/// Output of every pipeline entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Detected language code, when the pipeline performs detection.
    pub detected_language: Option<String>,
    /// Recognized text as produced by the engine, spans joined by spaces.
    pub raw_text: String,
    /// Cleaned (and, where applicable, shaped) text.
    pub clean_text: String,
    /// Individual recognized spans in reading order.
    pub lines: Vec<RecognizedSpan>,
    /// Indicator fields extracted from the cleaned text.
    pub extracted_fields: ExtractedFields,
}

/// The OCR pipeline: holds the recognizer pool and the configured stages
pub struct OcrPipeline {
    pool: RecognizerPool,
    preprocessor: Preprocessor,
    detector: RegionDetector,
    languages: Vec<String>,
}

impl OcrPipeline {
    /// Create a pipeline with default configuration.
    pub fn new(provider: Box<dyn RecognizerProvider>) -> Self {
        Self::with_config(provider, PipelineConfig::default())
    }

    /// Create a pipeline with explicit configuration.
    pub fn with_config(provider: Box<dyn RecognizerProvider>, config: PipelineConfig) -> Self {
        Self {
            pool: RecognizerPool::new(provider),
            preprocessor: Preprocessor::new(config.preprocess),
            detector: RegionDetector::new(config.regions),
            languages: config.languages,
        }
    }

    /// Whole-image recognition with text cleaning.
    ///
    /// Never fails on recognizer trouble: when no recognizer can be built or
    /// the call errors, the result degrades to empty text. Input errors still
    /// surface.
    pub fn extract_text(
        &self,
        input: impl Into<ImageInput>,
        options: PlainOptions,
    ) -> Result<OcrResult, OcrError> {
        let rgb = input.into().into_rgb()?;
        let processed = self.binarized_rgb(&rgb);

        let recognizer = match options.recognizer.clone() {
            Some(r) => Some(r),
            None => match self.pool.get(&self.languages) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(error = %e, "no recognizer available; returning empty text");
                    None
                }
            },
        };
        let spans = match recognizer {
            Some(recognizer) => {
                match recognizer.recognize(&processed, RecognitionDetail::Detailed) {
                    Ok(spans) => spans,
                    Err(e) => {
                        warn!(error = %e, "recognition failed; returning empty text");
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        let raw_text = join_spans(&spans);
        let clean_text = clean_plain(&raw_text, options.cleaning);
        let extracted_fields = extract_fields(&clean_text);
        Ok(OcrResult {
            detected_language: None,
            raw_text,
            clean_text,
            lines: spans,
            extracted_fields,
        })
    }

    /// Region-segmented recognition for chat screenshots.
    ///
    /// Detects candidate text regions, recognizes each with confidence
    /// filtering, retries failed regions in text-only mode, and extracts
    /// indicator fields from the combined text.
    pub fn extract_text_whatsapp_aware(
        &self,
        input: impl Into<ImageInput>,
        options: RegionOptions<'_>,
    ) -> Result<OcrResult, OcrError> {
        let rgb = input.into().into_rgb()?;
        let processed = Self::preprocess_with_hook(&rgb, options.preprocess);
        let recognizer = self
            .pool
            .get(&self.languages)
            .map_err(OcrError::RecognitionUnavailable)?;
        Ok(self.region_pass(&recognizer, &processed, options.confidence_floor()))
    }

    /// Region pipeline plus language identification and Urdu handling.
    ///
    /// When the recognized text identifies as Urdu, the cleaned text and the
    /// individual span texts are contextually shaped and reordered into
    /// visual order. Arabic-Indic digits in the cleaned text are normalized
    /// to ASCII regardless of the detected language.
    pub fn extract_text_with_urdu_support(
        &self,
        input: impl Into<ImageInput>,
        options: RegionOptions<'_>,
    ) -> Result<OcrResult, OcrError> {
        let rgb = input.into().into_rgb()?;
        let processed = Self::preprocess_with_hook(&rgb, options.preprocess);
        let recognizer = self
            .pool
            .get(&self.languages)
            .map_err(OcrError::RecognitionUnavailable)?;

        // A quick text-only pass over the whole image gives language
        // identification more context than the filtered region spans. A
        // failed or empty pass resolves to the default language.
        let sample = match recognizer.recognize(&processed, RecognitionDetail::TextOnly) {
            Ok(spans) => join_spans(&spans),
            Err(e) => {
                warn!(error = %e, "text-only language pass failed; assuming default language");
                String::new()
            }
        };

        let mut result = self.region_pass(&recognizer, &processed, options.confidence_floor());

        let language = script::identify_language(&sample)
            .unwrap_or(script::DEFAULT_LANGUAGE)
            .to_string();
        debug!(language = %language, "language resolved");

        if script::is_urdu(&language) {
            result.clean_text = script::shape_and_reorder(&result.clean_text);
            for span in &mut result.lines {
                span.text = script::shape_and_reorder(&span.text);
            }
        }
        // Digits normalize regardless of language so numeric field
        // extraction works for any script
        result.clean_text = script::normalize_digits(&result.clean_text);
        result.extracted_fields = extract_fields(&result.clean_text);
        result.detected_language = Some(language);
        Ok(result)
    }

    /// Shared region-segmented recognition pass, without language handling.
    fn region_pass(
        &self,
        recognizer: &Arc<dyn TextRecognizer>,
        processed: &RgbImage,
        floor: f32,
    ) -> OcrResult {
        let mut regions = self.detector.detect(processed);
        if regions.is_empty() {
            debug!("no regions detected; recognizing whole image");
            regions.push(Region::whole(processed));
        }

        // Spans keyed by (top, left) for a uniform reading order, using the
        // owning region's corner when a span carries no box
        let mut keyed: Vec<(u32, u32, RecognizedSpan)> = Vec::new();

        for region in &regions {
            match recognizer.recognize(&region.image, RecognitionDetail::Detailed) {
                Ok(spans) => {
                    for mut span in spans {
                        let conf = span.conf.unwrap_or(0.0);
                        if conf < floor {
                            continue;
                        }
                        span.bbox = span.bbox.map(|b| b.offset(region.left, region.top));
                        let key = span
                            .bbox
                            .map(|b| (b.y, b.x))
                            .unwrap_or((region.top, region.left));
                        keyed.push((key.0, key.1, span));
                    }
                }
                Err(first_err) => {
                    // Reduced-detail retry; its spans bypass the filter since
                    // they carry no confidence to judge
                    match recognizer.recognize(&region.image, RecognitionDetail::TextOnly) {
                        Ok(spans) => {
                            debug!(error = %first_err, "detailed pass failed; text-only retry succeeded");
                            for span in spans {
                                keyed.push((region.top, region.left, span));
                            }
                        }
                        Err(retry_err) => {
                            warn!(error = %retry_err, "region skipped after failed retry");
                        }
                    }
                }
            }
        }

        keyed.sort_by_key(|(top, left, _)| (*top, *left));
        let spans: Vec<RecognizedSpan> = keyed.into_iter().map(|(_, _, s)| s).collect();

        let raw_text = join_spans(&spans);
        let clean_text = collapse_whitespace(&raw_text);
        let extracted_fields = extract_fields(&clean_text);
        OcrResult {
            detected_language: None,
            raw_text,
            clean_text,
            lines: spans,
            extracted_fields,
        }
    }

    /// Apply the caller's preprocessing hook when given. A failing hook
    /// falls back to the unmodified image; without a hook the region
    /// pipelines recognize the image as-is.
    fn preprocess_with_hook(rgb: &RgbImage, hook: Option<&PreprocessFn>) -> RgbImage {
        if let Some(f) = hook {
            match f(rgb) {
                Ok(img) => return img.to_rgb8(),
                Err(e) => {
                    warn!(error = %e, "custom preprocessing failed; using unmodified image");
                }
            }
        }
        rgb.clone()
    }

    fn binarized_rgb(&self, rgb: &RgbImage) -> RgbImage {
        DynamicImage::ImageLuma8(self.preprocessor.binarize(rgb)).to_rgb8()
    }
}

fn join_spans(spans: &[RecognizedSpan]) -> String {
    spans
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize to NFKC, replace characters outside the cleaning mode's set
/// with spaces (so stripped runs still separate words), and collapse
/// whitespace runs.
fn clean_plain(text: &str, mode: CleaningMode) -> String {
    let normalized: String = text.nfkc().collect();
    let filtered: String = normalized
        .chars()
        .map(|c| {
            let keep = match mode {
                CleaningMode::AsciiOnly => c.is_ascii() && !c.is_ascii_control(),
                CleaningMode::UnicodePreserving => !c.is_control(),
            };
            if keep {
                c
            } else {
                ' '
            }
        })
        .collect();
    collapse_whitespace(&filtered)
}
