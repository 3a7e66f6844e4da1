//! Post-LLM output cleanup before JSON parsing.
//!
//! Some models wrap the payload in markdown fences or prepend a sentence even
//! in JSON mode. This strips that wrapping and leaves the JSON text.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("valid regex")
});

/// Strip markdown fences and surrounding prose from a JSON payload.
pub fn sanitize_json_payload(raw: &str) -> String {
    let text = raw.trim();

    if let Some(caps) = FENCED_BLOCK_RE.captures(text) {
        if let Some(inner) = caps.get(1) {
            return inner.as_str().trim().to_string();
        }
    }

    // Leading prose: start at the first bracket if the text does not already.
    if !text.starts_with(['{', '[']) {
        if let Some(idx) = text.find(['{', '[']) {
            return text[idx..].trim().to_string();
        }
    }

    text.to_string()
}
