//! ScamLens OCR core - text extraction from chat screenshots
//!
//! A screenshot-to-structured-text pipeline for screening suspicious chat
//! conversations: image normalization, binarization, heuristic text region
//! detection, pluggable recognition, Urdu script handling, and extraction of
//! phone numbers, emails, URLs, and money amounts.
//!
//! The recognition engine itself is injected through
//! [`recognize::RecognizerProvider`]; enable the `tesseract` feature for a
//! ready-made backend.

pub mod error;
pub mod fields;
pub mod input;
pub mod pipeline;
pub mod preprocess;
pub mod recognize;
pub mod regions;
pub mod script;

pub use error::{OcrError, RecognitionError};
pub use fields::{extract_fields, ExtractedFields};
pub use input::{ImageInput, RawLayout};
pub use pipeline::{
    CleaningMode, OcrPipeline, OcrResult, PipelineConfig, PlainOptions, RegionOptions,
    MIN_CONFIDENCE,
};
pub use preprocess::{PreprocessBackend, Preprocessor};
pub use recognize::{
    BoundingBox, RecognitionDetail, RecognizedSpan, RecognizerPool, RecognizerProvider,
    TextRecognizer,
};
pub use regions::{Region, RegionBackend, RegionDetector};
