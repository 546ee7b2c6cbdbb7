//! Decoding of structured-JSON responses.
//!
//! Nothing here recovers from a malformed response. The raw text is logged
//! for debugging and the error propagates to the orchestrator.

use scriptforge_core::{unescape, ForgeError, Result};
use serde_json::Value;

/// Parse a response as a JSON document
pub fn decode_json(stage: &'static str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|source| {
        tracing::error!(stage, "Failed to decode JSON response: {}", source);
        tracing::error!(stage, "Response content: {}", raw);
        ForgeError::Decode { stage, source }
    })
}

/// Parse `{ key: "<escaped source>" }` and return the unescaped source
pub fn decode_escaped_source(stage: &'static str, key: &'static str, raw: &str) -> Result<String> {
    let envelope = decode_json(stage, raw)?;
    let field = envelope.get(key).ok_or_else(|| {
        tracing::error!(stage, "Missing expected key in JSON response: {}", key);
        tracing::error!(stage, "Response content: {}", raw);
        ForgeError::MissingKey { stage, key }
    })?;
    let escaped = field.as_str().ok_or_else(|| {
        tracing::error!(stage, "Key {} does not hold a string", key);
        ForgeError::NotAString { stage, key }
    })?;
    Ok(unescape(escaped))
}
