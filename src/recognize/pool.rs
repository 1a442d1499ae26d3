//! Recognizer instance cache
//!
//! Recognizer construction is expensive (model loading), so one instance is
//! kept per pool and reused across calls. The invalidation rule: a cached
//! instance is reused only while every requested language is already loaded;
//! any new language forces a rebuild with the requested set.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::RecognitionError;
use crate::recognize::{RecognizerProvider, TextRecognizer};

struct CachedRecognizer {
    languages: Vec<String>,
    recognizer: Arc<dyn TextRecognizer>,
}

/// Mutex-guarded lazy cache of a recognizer instance
///
/// The mutex serializes construction and rebuild, which makes the pool safe
/// to share across threads.
pub struct RecognizerPool {
    provider: Box<dyn RecognizerProvider>,
    cached: Mutex<Option<CachedRecognizer>>,
}

impl RecognizerPool {
    /// Create an empty pool; the first `get` constructs the recognizer.
    pub fn new(provider: Box<dyn RecognizerProvider>) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }

    /// Get a recognizer for the requested language set, reusing the cached
    /// instance when the request is a subset of its configured languages.
    pub fn get(&self, languages: &[String]) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        let mut slot = self.cached.lock();

        if let Some(cached) = slot.as_ref() {
            if languages.iter().all(|l| cached.languages.contains(l)) {
                debug!(langs = ?languages, "reusing cached recognizer");
                return Ok(Arc::clone(&cached.recognizer));
            }
        }

        info!(langs = ?languages, "building recognizer");
        let recognizer = self.provider.build(languages)?;
        *slot = Some(CachedRecognizer {
            languages: languages.to_vec(),
            recognizer: Arc::clone(&recognizer),
        });
        Ok(recognizer)
    }
}
