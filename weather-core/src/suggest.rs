use std::sync::Arc;

use crate::provider::Geocoder;

pub const DEFAULT_MIN_CHARS: usize = 3;

/// Best-effort city suggestions for partially typed input.
///
/// One request per call, no retry, no caching. Failures yield an empty list.
#[derive(Debug, Clone)]
pub struct SuggestionService {
    geocoder: Arc<dyn Geocoder>,
    min_chars: usize,
}

impl SuggestionService {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_min_chars(geocoder, DEFAULT_MIN_CHARS)
    }

    pub fn with_min_chars(geocoder: Arc<dyn Geocoder>, min_chars: usize) -> Self {
        Self {
            geocoder,
            min_chars,
        }
    }

    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        if partial.chars().count() < self.min_chars {
            return Vec::new();
        }

        match self.geocoder.candidates(partial).await {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!(partial, "suggestion lookup failed: {e:#}");
                Vec::new()
            }
        }
    }
}
