//! Conversion of raw completion text into strict structured data.
//!
//! Models often wrap JSON in markdown code fences (```` ```json ... ``` ````).
//! Fence delimiters, together with any language tag right after an opening
//! fence, are removed wherever they appear; the remainder is trimmed and
//! parsed strictly. No other repair is attempted: anything that still fails
//! to parse, or parses into the wrong shape, is a [`SanitizeError`].

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

use crate::models::{SearchKind, SearchResult};

/// Longest excerpt of the offending text kept in an error
const EXCERPT_CHARS: usize = 200;

/// Errors raised while sanitizing a completion
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    /// Nothing left after fence stripping
    #[error("Completion is empty after removing code fences")]
    Empty,

    /// Text is not valid JSON or does not match the expected structure
    #[error("Malformed response: {reason} (text: {excerpt})")]
    Malformed { reason: String, excerpt: String },
}

impl SanitizeError {
    fn malformed(err: serde_json::Error, text: &str) -> Self {
        SanitizeError::Malformed {
            reason: err.to_string(),
            excerpt: excerpt(text),
        }
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```[A-Za-z0-9_+\-]*").expect("fence pattern is valid"))
}

fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    if text.chars().count() > EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}

/// Remove code-fence delimiters (and language tags) and trim whitespace
pub fn strip_code_fences(raw: &str) -> String {
    fence_regex().replace_all(raw, "").trim().to_string()
}

/// Strip fences and parse the remainder as JSON
pub fn sanitize(raw: &str) -> Result<serde_json::Value, SanitizeError> {
    sanitize_as(raw)
}

/// Strip fences and parse the remainder into `T`
pub fn sanitize_as<T: DeserializeOwned>(raw: &str) -> Result<T, SanitizeError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(SanitizeError::Empty);
    }
    serde_json::from_str(&cleaned).map_err(|e| SanitizeError::malformed(e, &cleaned))
}

/// Strip fences and parse the remainder as the payload for `kind`
pub fn sanitize_result(raw: &str, kind: SearchKind) -> Result<SearchResult, SanitizeError> {
    match kind {
        SearchKind::AuthorList => sanitize_as(raw).map(SearchResult::Authors),
        SearchKind::SubgenreEssay => sanitize_as(raw).map(SearchResult::Essay),
    }
}
