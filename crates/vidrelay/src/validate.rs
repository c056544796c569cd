//! Per-category acceptance checks for raw instance responses.
//!
//! A response passes in three stages: [`decode`] (status and JSON), the
//! provider error check, then the category's shape and emptiness policy in
//! [`check`]. Only `channel` rejects an empty result set; empty search,
//! comment and playlist results are legitimate.

use serde_json::Value;

use crate::error::{Rejection, ValidationOutcome};
use crate::http::HttpReply;
use crate::pool::{Category, Provider};

/// Turns a raw reply into a JSON document, rejecting error statuses and
/// bodies that do not parse.
pub fn decode(reply: &HttpReply) -> Result<Value, Rejection> {
    if !reply.is_success() {
        return Err(Rejection::transport(format!("HTTP {}", reply.status)));
    }
    serde_json::from_str(&reply.body).map_err(|e| Rejection::malformed(e.to_string()))
}

/// Error message of a well-formed provider error object, if any.
///
/// Both dialects answer failures with `{"error": "..."}`; Piped may add a
/// `message` with the details.
pub fn provider_error(payload: &Value) -> Option<String> {
    let error = payload.as_object()?.get("error")?;
    if error.is_null() {
        return None;
    }
    let message = error
        .as_str()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| error.to_string());
    match payload.get("message").and_then(Value::as_str) {
        Some(detail) if !detail.is_empty() => Some(format!("{message}: {detail}")),
        _ => Some(message),
    }
}

fn expect_object(payload: &Value) -> Result<(), Rejection> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(Rejection::malformed("expected a JSON object"))
    }
}

fn expect_array_field(payload: &Value, key: &str) -> Result<(), Rejection> {
    expect_object(payload)?;
    match payload.get(key) {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(Rejection::malformed(format!("`{key}` is not an array"))),
        None => Err(Rejection::malformed(format!("missing `{key}`"))),
    }
}

/// Field holding a channel's recent uploads in each dialect.
fn channel_videos_key(provider: Provider) -> &'static str {
    match provider {
        Provider::Primary => "latestVideos",
        Provider::Secondary => "relatedStreams",
    }
}

/// Structural and semantic checks for a decoded payload.
pub fn check(category: Category, provider: Provider, payload: &Value) -> Result<(), Rejection> {
    if let Some(message) = provider_error(payload) {
        return Err(Rejection::provider(message));
    }

    match (category, provider) {
        (Category::Search, Provider::Primary) => {
            if payload.is_array() {
                Ok(())
            } else {
                Err(Rejection::malformed("expected a JSON array of results"))
            }
        }
        (Category::Search, Provider::Secondary) => expect_array_field(payload, "items"),
        (Category::Comments, _) => expect_array_field(payload, "comments"),
        (Category::Channel, _) => {
            expect_object(payload)?;
            let key = channel_videos_key(provider);
            match payload.get(key).and_then(Value::as_array) {
                Some(videos) if videos.is_empty() => {
                    Err(Rejection::empty(format!("channel `{key}` is empty")))
                }
                _ => Ok(()),
            }
        }
        (Category::Video | Category::Playlist, _) => expect_object(payload),
    }
}

/// Runs every stage against a raw reply and reports the verdict.
pub fn outcome(category: Category, provider: Provider, reply: &HttpReply) -> ValidationOutcome {
    let result = decode(reply).and_then(|payload| check(category, provider, &payload));
    ValidationOutcome::from(&result)
}
