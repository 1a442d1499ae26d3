//! Structured field extraction from recognized text
//!
//! Pulls the indicators that matter for screening chat screenshots out of
//! free text: phone numbers, email addresses, URLs, and money amounts. Pure
//! pattern matching; no validation beyond what the patterns encode.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s\-]{5,}").expect("phone pattern"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern")
});
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("url pattern"));
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Rs\.?|INR|\$)\s?\d[\d,]*").expect("amount pattern"));

/// Indicator fields extracted from a block of text
///
/// Matches keep their order of appearance; duplicates are preserved so a
/// number repeated across a conversation stays visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Phone-number-like digit runs.
    pub phones: Vec<String>,
    /// Email addresses.
    pub emails: Vec<String>,
    /// `http(s)://` and `www.` URLs.
    pub urls: Vec<String>,
    /// Currency amounts (Rs/INR/$ prefixed).
    pub amounts: Vec<String>,
}

impl ExtractedFields {
    /// Whether no field of any kind was found.
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
            && self.emails.is_empty()
            && self.urls.is_empty()
            && self.amounts.is_empty()
    }
}

/// Scan text for phone numbers, emails, URLs, and amounts.
pub fn extract_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        // The digit-run pattern is greedy over spaces, so trailing whitespace
        // is trimmed off each match
        phones: PHONE_RE
            .find_iter(text)
            .map(|m| m.as_str().trim_end().to_string())
            .collect(),
        emails: EMAIL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        urls: URL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        amounts: AMOUNT_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_all_field_kinds() {
        let text =
            "Call +92 300 1234567 or email scam@fraud.com, send Rs. 5,000 via www.fakepay.com";
        let fields = extract_fields(text);
        assert_eq!(fields.phones, vec!["+92 300 1234567"]);
        assert_eq!(fields.emails, vec!["scam@fraud.com"]);
        assert_eq!(fields.urls, vec!["www.fakepay.com"]);
        assert_eq!(fields.amounts, vec!["Rs. 5,000"]);
    }

    #[test]
    fn test_empty_text_yields_empty_fields() {
        let fields = extract_fields("");
        assert!(fields.is_empty());
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_short_digit_runs_are_not_phones() {
        // Fewer than six trailing characters after the first digit
        let fields = extract_fields("room 12345 on floor 3");
        assert!(fields.phones.is_empty());
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let text = "pay $100 then $100 again at https://a.example and https://b.example";
        let fields = extract_fields(text);
        assert_eq!(fields.amounts, vec!["$100", "$100"]);
        assert_eq!(fields.urls, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_amount_variants() {
        let fields = extract_fields("INR 2,500 or Rs 300 or Rs.99");
        assert_eq!(fields.amounts, vec!["INR 2,500", "Rs 300", "Rs.99"]);
    }

    #[test]
    fn test_hyphenated_phone() {
        let fields = extract_fields("dial 0300-1234567 now");
        assert_eq!(fields.phones, vec!["0300-1234567"]);
    }
}
