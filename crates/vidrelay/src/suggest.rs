//! Search-box suggestions from the public autocomplete endpoint.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::{RelayError, Result};
use crate::http::Transport;

pub const SUGGEST_ENDPOINT: &str = "https://www.google.com/complete/search";

const BACKEND: &str = "suggest";

pub fn suggest_url(keyword: &str, language: &str) -> Result<Url> {
    Url::parse_with_params(
        SUGGEST_ENDPOINT,
        [("client", "youtube"), ("hl", language), ("ds", "yt"), ("q", keyword)],
    )
    .map_err(|e| RelayError::backend(BACKEND, e.to_string()))
}

/// Extracts the suggestion strings from a JSONP body such as
/// `window.google.ac.h(["kw",[["kw one",0,[512]],["kw two",0]],{}])`.
pub fn parse_suggestions(body: &str) -> Result<Vec<String>> {
    let start = body.find('(').map(|i| i + 1).unwrap_or(0);
    let end = body.rfind(')').filter(|&i| i >= start).unwrap_or(body.len());
    let payload: Value = serde_json::from_str(body[start..end].trim())
        .map_err(|e| RelayError::backend(BACKEND, format!("unparseable response: {e}")))?;

    let entries = payload
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| RelayError::backend(BACKEND, "response has no suggestion list"))?;

    Ok(entries
        .iter()
        .filter_map(|entry| entry.get(0).and_then(Value::as_str))
        .map(ToOwned::to_owned)
        .collect())
}

pub async fn fetch_suggestions(
    transport: &dyn Transport,
    keyword: &str,
    language: &str,
    timeout: Duration,
) -> Result<Vec<String>> {
    let url = suggest_url(keyword, language)?;
    let reply = transport
        .get(&url, timeout)
        .await
        .map_err(|e| RelayError::backend(BACKEND, e.to_string()))?;
    if !reply.is_success() {
        return Err(RelayError::backend(
            BACKEND,
            format!("HTTP {}", reply.status),
        ));
    }
    parse_suggestions(&reply.body)
}
