//! End-to-end pipeline tests with a scripted recognizer
//!
//! The recognition engine is injected, so these tests drive the full
//! orchestration (preprocess, regions, filter, retry, script handling,
//! fields) against a deterministic in-process recognizer.

use std::sync::Arc;

use image::{Rgb, RgbImage};
use parking_lot::Mutex;

use scamlens::{
    BoundingBox, OcrError, OcrPipeline, PipelineConfig, PlainOptions, RecognitionDetail,
    RecognitionError, RecognizedSpan, RecognizerProvider, RegionBackend, RegionOptions,
    TextRecognizer,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// What the scripted recognizer does on each call.
#[derive(Clone)]
enum Script {
    /// Return these spans for any detail level.
    Spans(Vec<RecognizedSpan>),
    /// Fail detailed calls; succeed text-only calls with these spans.
    FailDetailed(Vec<RecognizedSpan>),
    /// Fail text-only calls; succeed detailed calls with these spans.
    FailTextOnly(Vec<RecognizedSpan>),
    /// Fail every call.
    FailAlways,
}

struct ScriptedRecognizer {
    script: Script,
    seen_dims: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(
        &self,
        image: &RgbImage,
        detail: RecognitionDetail,
    ) -> Result<Vec<RecognizedSpan>, RecognitionError> {
        self.seen_dims.lock().push(image.dimensions());
        match (&self.script, detail) {
            (Script::Spans(spans), _) => Ok(spans.clone()),
            (Script::FailDetailed(_), RecognitionDetail::Detailed) => {
                Err(RecognitionError::Backend("scripted failure".to_string()))
            }
            (Script::FailDetailed(spans), RecognitionDetail::TextOnly) => Ok(spans.clone()),
            (Script::FailTextOnly(spans), RecognitionDetail::Detailed) => Ok(spans.clone()),
            (Script::FailTextOnly(_), RecognitionDetail::TextOnly) => {
                Err(RecognitionError::Backend("scripted failure".to_string()))
            }
            (Script::FailAlways, _) => {
                Err(RecognitionError::Backend("scripted failure".to_string()))
            }
        }
    }
}

struct ScriptedProvider {
    script: Script,
    seen_dims: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl ScriptedProvider {
    fn new(script: Script) -> (Self, Arc<Mutex<Vec<(u32, u32)>>>) {
        let seen_dims = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                script,
                seen_dims: Arc::clone(&seen_dims),
            },
            seen_dims,
        )
    }
}

impl RecognizerProvider for ScriptedProvider {
    fn build(&self, _languages: &[String]) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        Ok(Arc::new(ScriptedRecognizer {
            script: self.script.clone(),
            seen_dims: Arc::clone(&self.seen_dims),
        }))
    }
}

struct FailingProvider;

impl RecognizerProvider for FailingProvider {
    fn build(&self, _languages: &[String]) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        Err(RecognitionError::Unavailable("no engine".to_string()))
    }
}

fn pipeline_with(script: Script) -> OcrPipeline {
    let (provider, _) = ScriptedProvider::new(script);
    OcrPipeline::with_config(
        Box::new(provider),
        PipelineConfig::default().with_region_backend(RegionBackend::Disabled),
    )
}

fn test_image() -> RgbImage {
    RgbImage::from_pixel(200, 100, Rgb([255, 255, 255]))
}

fn span(text: &str, x: u32, y: u32, conf: f32) -> RecognizedSpan {
    RecognizedSpan::new(text, BoundingBox::new(x, y, 40, 12), conf)
}

#[test]
fn test_confidence_filter_drops_low_spans() {
    init_tracing();
    let pipeline = pipeline_with(Script::Spans(vec![
        span("keep", 10, 10, 0.9),
        span("drop", 10, 30, 0.1),
    ]));

    let result = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();
    assert_eq!(result.clean_text, "keep");
    assert_eq!(result.lines.len(), 1);
    assert_eq!(result.lines[0].text, "keep");
}

#[test]
fn test_custom_confidence_floor() {
    let pipeline = pipeline_with(Script::Spans(vec![
        span("high", 10, 10, 0.9),
        span("mid", 10, 30, 0.5),
    ]));

    let result = pipeline
        .extract_text_whatsapp_aware(
            test_image(),
            RegionOptions {
                min_confidence: Some(0.7),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(result.clean_text, "high");
}

#[test]
fn test_disabled_regions_recognize_whole_image() {
    let (provider, seen) = ScriptedProvider::new(Script::Spans(vec![span("hi", 0, 0, 0.9)]));
    let pipeline = OcrPipeline::with_config(
        Box::new(provider),
        PipelineConfig::default().with_region_backend(RegionBackend::Disabled),
    );

    pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();

    // Empty region list falls back to one region covering the full image
    let dims = seen.lock();
    assert_eq!(dims.as_slice(), &[(200, 100)]);
}

#[test]
fn test_custom_preprocess_hook_output_is_recognized() {
    let (provider, seen) = ScriptedProvider::new(Script::Spans(vec![span("hi", 0, 0, 0.9)]));
    let pipeline = OcrPipeline::with_config(
        Box::new(provider),
        PipelineConfig::default().with_region_backend(RegionBackend::Disabled),
    );

    let hook = |_: &RgbImage| -> anyhow::Result<image::DynamicImage> {
        Ok(image::DynamicImage::ImageRgb8(RgbImage::from_pixel(
            50,
            50,
            Rgb([0, 0, 0]),
        )))
    };
    pipeline
        .extract_text_whatsapp_aware(
            test_image(),
            RegionOptions {
                preprocess: Some(&hook),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(seen.lock().as_slice(), &[(50, 50)]);
}

#[test]
fn test_failing_preprocess_hook_uses_unmodified_image() {
    let (provider, seen) = ScriptedProvider::new(Script::Spans(vec![span("hi", 0, 0, 0.9)]));
    let pipeline = OcrPipeline::with_config(
        Box::new(provider),
        PipelineConfig::default().with_region_backend(RegionBackend::Disabled),
    );

    let hook = |_: &RgbImage| -> anyhow::Result<image::DynamicImage> {
        anyhow::bail!("scripted hook failure")
    };
    let result = pipeline
        .extract_text_whatsapp_aware(
            test_image(),
            RegionOptions {
                preprocess: Some(&hook),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(result.clean_text, "hi");
    assert_eq!(seen.lock().as_slice(), &[(200, 100)]);
}

#[test]
fn test_region_pipeline_is_deterministic() {
    let spans = vec![span("second line", 10, 40, 0.8), span("first line", 10, 5, 0.8)];
    let pipeline = pipeline_with(Script::Spans(spans));

    let a = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();
    let b = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();
    assert_eq!(a, b);
    // Spans come back in (top, left) order regardless of engine order
    assert_eq!(a.clean_text, "first line second line");
}

#[test]
fn test_text_only_retry_keeps_unfiltered_spans() {
    init_tracing();
    let pipeline = pipeline_with(Script::FailDetailed(vec![RecognizedSpan::text_only(
        "retry text",
    )]));

    let result = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();
    assert_eq!(result.clean_text, "retry text");
    assert!(result.lines[0].conf.is_none());
    assert!(result.lines[0].bbox.is_none());
}

#[test]
fn test_all_calls_failing_yields_empty_result_not_error() {
    let pipeline = pipeline_with(Script::FailAlways);
    let result = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();
    assert_eq!(result.clean_text, "");
    assert!(result.lines.is_empty());
    assert!(result.extracted_fields.is_empty());
}

#[test]
fn test_missing_recognizer_errors_region_pipeline() {
    let pipeline = OcrPipeline::new(Box::new(FailingProvider));
    let err = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap_err();
    assert!(matches!(err, OcrError::RecognitionUnavailable(_)));
}

#[test]
fn test_missing_recognizer_degrades_plain_pipeline() {
    let pipeline = OcrPipeline::new(Box::new(FailingProvider));
    let result = pipeline
        .extract_text(test_image(), PlainOptions::default())
        .unwrap();
    assert_eq!(result.raw_text, "");
    assert_eq!(result.clean_text, "");
}

#[test]
fn test_fields_extracted_from_recognized_text() {
    let pipeline = pipeline_with(Script::Spans(vec![span(
        "Call +92 300 1234567 or email scam@fraud.com, send Rs. 5,000 via www.fakepay.com",
        5,
        5,
        0.95,
    )]));

    let result = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();
    let fields = &result.extracted_fields;
    assert_eq!(fields.phones, vec!["+92 300 1234567"]);
    assert_eq!(fields.emails, vec!["scam@fraud.com"]);
    assert_eq!(fields.urls, vec!["www.fakepay.com"]);
    assert_eq!(fields.amounts, vec!["Rs. 5,000"]);
}

#[test]
fn test_urdu_pipeline_normalizes_digits_and_reports_language() {
    init_tracing();
    // Genuine Urdu sentence with Urdu-specific letters and Urdu digits
    let urdu = "\u{06CC}\u{06C1} \u{0627}\u{06CC}\u{06A9} \u{0628}\u{06C1}\u{062A} \
                \u{0627}\u{06C1}\u{0645} \u{067E}\u{06CC}\u{063A}\u{0627}\u{0645} \
                \u{06C1}\u{06D2} \u{0628}\u{0631}\u{0627}\u{06C1} \u{06A9}\u{0631}\u{0645} \
                \u{0631}\u{0642}\u{0645} \u{06F5}\u{06F0}\u{06F0} \u{0628}\u{06BE}\u{06CC}\u{062C} \
                \u{062F}\u{06CC}\u{06BA}";
    let pipeline = pipeline_with(Script::Spans(vec![span(urdu, 5, 5, 0.9)]));

    let result = pipeline
        .extract_text_with_urdu_support(test_image(), RegionOptions::default())
        .unwrap();
    assert_eq!(result.detected_language.as_deref(), Some("urd"));
    assert!(result.clean_text.contains("500"));
    // Raw text keeps the engine's output untouched
    assert!(result.raw_text.contains("\u{06F5}\u{06F0}\u{06F0}"));
}

#[test]
fn test_urdu_pipeline_english_text_still_normalizes_digits() {
    let text = "Please send the payment amount of \u{0665}\u{0660}\u{0660} rupees to the account today";
    let pipeline = pipeline_with(Script::Spans(vec![span(text, 5, 5, 0.9)]));

    let result = pipeline
        .extract_text_with_urdu_support(test_image(), RegionOptions::default())
        .unwrap();
    assert_eq!(result.detected_language.as_deref(), Some("eng"));
    assert!(result.clean_text.contains("500"));
}

#[test]
fn test_failed_language_pass_assumes_default_language() {
    init_tracing();
    // Urdu spans come back from the detailed region pass, but the
    // text-only language pass fails, so identification must resolve to
    // the default language and skip shaping entirely
    let urdu = "\u{0633}\u{0644}\u{0627}\u{0645}";
    let pipeline = pipeline_with(Script::FailTextOnly(vec![span(urdu, 5, 5, 0.9)]));

    let result = pipeline
        .extract_text_with_urdu_support(test_image(), RegionOptions::default())
        .unwrap();
    assert_eq!(result.detected_language.as_deref(), Some("eng"));
    assert_eq!(result.lines[0].text, urdu);
    assert_eq!(result.clean_text, urdu);
}

#[test]
fn test_missing_recognizer_errors_urdu_pipeline() {
    let pipeline = OcrPipeline::new(Box::new(FailingProvider));
    let err = pipeline
        .extract_text_with_urdu_support(test_image(), RegionOptions::default())
        .unwrap_err();
    assert!(matches!(err, OcrError::RecognitionUnavailable(_)));
}

#[test]
fn test_plain_pipeline_cleans_recognized_text() {
    let pipeline = pipeline_with(Script::Spans(vec![
        RecognizedSpan::text_only("Hello\u{00A0}\u{00A0} world"),
        RecognizedSpan::text_only("  again "),
    ]));

    let result = pipeline
        .extract_text(test_image(), PlainOptions::default())
        .unwrap();
    assert_eq!(result.clean_text, "Hello world again");
    assert!(result.detected_language.is_none());
}

#[test]
fn test_plain_pipeline_recognizer_override() {
    // The pool can never build a recognizer, but a caller-supplied one wins
    let pipeline = OcrPipeline::new(Box::new(FailingProvider));
    let (provider, _) = ScriptedProvider::new(Script::Spans(vec![RecognizedSpan::text_only(
        "override works",
    )]));
    let recognizer = provider.build(&["en".to_string()]).unwrap();

    let result = pipeline
        .extract_text(
            test_image(),
            PlainOptions {
                recognizer: Some(recognizer),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(result.clean_text, "override works");
}

#[test]
fn test_result_serializes_with_stable_field_names() {
    let pipeline = pipeline_with(Script::Spans(vec![span("hello", 5, 5, 0.9)]));
    let result = pipeline
        .extract_text_whatsapp_aware(test_image(), RegionOptions::default())
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("detected_language").is_some());
    assert!(json.get("raw_text").is_some());
    assert!(json.get("clean_text").is_some());
    assert!(json["lines"].is_array());
    assert!(json["extracted_fields"]["phones"].is_array());
}
