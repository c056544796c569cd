//! Pure transforms from provider JSON to the normalized records.
//!
//! Field access goes through the helpers below so that every absent field
//! resolves to the same fallback: [`LOAD_FAILED`] for text, `0` for counts and
//! durations, empty for lists.

pub mod duration;
pub mod invidious;
pub mod piped;
pub mod streams;

use serde_json::Value;

use crate::records::{LOAD_FAILED, thumbnail_url};

pub use duration::format_duration;

pub(crate) fn text(value: &Value, key: &str) -> String {
    opt_text(value, key).unwrap_or_else(|| LOAD_FAILED.to_string())
}

pub(crate) fn opt_text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Non-negative count; providers use `-1` or strings for unknown values.
pub(crate) fn count(value: &Value, key: &str) -> u64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn seconds(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Resolves protocol-relative URLs (`//host/path`) to https.
pub(crate) fn absolute_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        url.to_string()
    }
}

/// Picks the widest entry of an `[{url, width}]` thumbnail list.
pub(crate) fn widest_thumbnail(thumbnails: &[Value]) -> Option<String> {
    thumbnails
        .iter()
        .filter_map(|t| Some((t.get("url")?.as_str()?, count(t, "width"))))
        .max_by_key(|(_, width)| *width)
        .map(|(url, _)| absolute_url(url))
}

/// Extracts an id from a relative provider link such as `/watch?v=ID`,
/// `/channel/ID` or `/playlist?list=ID`.
pub(crate) fn id_from_link(link: &str) -> Option<String> {
    let id = if let Some((_, query)) = link.split_once('?') {
        query
            .split('&')
            .find_map(|pair| match pair.split_once('=') {
                Some(("v" | "list", v)) => Some(v),
                _ => None,
            })?
    } else {
        link.trim_end_matches('/').rsplit('/').next()?
    };
    (!id.is_empty()).then(|| id.to_string())
}

pub(crate) fn id_or_placeholder(link: Option<&str>) -> String {
    link.and_then(id_from_link)
        .unwrap_or_else(|| LOAD_FAILED.to_string())
}

/// Falls back to the public thumbnail when the payload lists none.
pub(crate) fn video_thumbnail(provided: Option<String>, video_id: &str) -> String {
    match provided {
        Some(url) => absolute_url(&url),
        None if video_id != LOAD_FAILED => thumbnail_url(video_id),
        None => LOAD_FAILED.to_string(),
    }
}
