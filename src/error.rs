//! Error types for the OCR pipelines
//!
//! Only two error kinds ever surface to callers: unsupported input and an
//! unobtainable recognizer. Everything else is recovered inside the pipeline
//! with partial-result semantics.

use thiserror::Error;

/// Errors surfaced by the pipeline entry points
#[derive(Debug, Error)]
pub enum OcrError {
    /// The input image argument is not a recognized representation, or could
    /// not be decoded into one.
    #[error("unsupported image input: {0}")]
    UnsupportedInput(String),

    /// No text recognizer could be constructed for the configured language
    /// set, and the requested pipeline has no meaningful fallback.
    #[error("text recognition unavailable")]
    RecognitionUnavailable(#[source] RecognitionError),
}

/// Errors produced by a recognizer backend or provider
///
/// Per-region recognition failures carry this type; the orchestrator decides
/// between retry, fallback, and propagation.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The recognition backend failed on a specific call.
    #[error("recognizer backend failed: {0}")]
    Backend(String),

    /// The recognition capability itself cannot be obtained (engine missing,
    /// model not installed, unsupported language set).
    #[error("recognizer unavailable: {0}")]
    Unavailable(String),
}
