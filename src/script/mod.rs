//! Language identification and script post-processing
//!
//! Best-effort language detection plus the Urdu/Arabic handling the rest of
//! the pipeline needs: contextual glyph shaping, bidirectional reordering to
//! visual order, and Arabic-Indic digit normalization.

mod shaping;

use tracing::debug;
use unicode_bidi::BidiInfo;

pub use shaping::reshape;

/// Language code assumed when detection fails or returns nothing.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Identify the natural language of a piece of text.
///
/// Returns an ISO 639-3 code (e.g. `"eng"`, `"urd"`), or `None` for empty or
/// undetectable text. Detection is statistical and deterministic; callers
/// treat a `None` as [`DEFAULT_LANGUAGE`].
pub fn identify_language(text: &str) -> Option<&'static str> {
    if text.trim().is_empty() {
        return None;
    }
    let info = whatlang::detect(text)?;
    debug!(lang = info.lang().code(), confidence = info.confidence(), "language identified");
    Some(info.lang().code())
}

/// Whether a detected language code refers to Urdu.
pub fn is_urdu(code: &str) -> bool {
    code == "urd" || code == "ur"
}

/// Map Arabic-Indic (U+0660..U+0669) and Extended Arabic-Indic / Urdu
/// (U+06F0..U+06F9) digit glyphs to ASCII digits. Idempotent; all other
/// characters pass through unchanged.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => {
                char::from(b'0' + (c as u32 - 0x0660) as u8)
            }
            '\u{06F0}'..='\u{06F9}' => {
                char::from(b'0' + (c as u32 - 0x06F0) as u8)
            }
            _ => c,
        })
        .collect()
}

/// Shape Urdu/Arabic text and reorder it into left-to-right visual order.
///
/// Contextual glyph joining first, then the bidirectional algorithm, then
/// digit normalization. A presentation-order transform only: character
/// identity is preserved apart from the digit mapping.
pub fn shape_and_reorder(text: &str) -> String {
    let shaped = reshape(text);
    let visual = reorder_visual(&shaped);
    normalize_digits(&visual)
}

/// Apply the Unicode bidirectional algorithm and return the text in visual
/// character order.
fn reorder_visual(text: &str) -> String {
    let bidi = BidiInfo::new(text, None);
    let mut out = String::with_capacity(text.len());
    for para in &bidi.paragraphs {
        out.push_str(&bidi.reorder_line(para, para.range.clone()));
    }
    out
}
