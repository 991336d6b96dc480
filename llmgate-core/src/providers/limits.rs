//! Quota-exhaustion classification for upstream responses
//!
//! Distinguishes "this provider is out of quota for the day" from every
//! other kind of error, including transient rate limiting. Only the
//! former triggers failover; everything else is passed through.

use http::StatusCode;
use serde_json::Value;

/// Substrings that mark a 429 body as a quota/billing exhaustion signal
const EXHAUSTION_TOKENS: [&str; 4] = ["daily", "quota", "limit reached", "billing"];

/// Parse an upstream response body as JSON.
///
/// Returns `None` when the body is empty or not valid JSON, so callers
/// can tell "no structured body" apart from "body says nothing about
/// quota".
pub fn parse_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Decide whether a response represents quota/billing exhaustion.
///
/// Only a 429 with a parseable body qualifies. The check is a
/// case-insensitive substring match over the whole rendered body, not a
/// specific field: provider error shapes vary too much for anything
/// stricter. A 429 without a matching token is a transient rate limit
/// and must not mark the provider exhausted.
pub fn is_quota_exhausted(status: StatusCode, body: Option<&Value>) -> bool {
    if status != StatusCode::TOO_MANY_REQUESTS {
        return false;
    }

    let Some(body) = body else {
        return false;
    };

    let rendered = body.to_string().to_lowercase();
    EXHAUSTION_TOKENS
        .iter()
        .any(|token| rendered.contains(token))
}
