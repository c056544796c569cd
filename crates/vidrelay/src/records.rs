//! Normalized record shapes produced by the mappers.
//!
//! Every text field that the provider payload does not carry is set to
//! [`LOAD_FAILED`]; counts fall back to `0`, lists to empty. Only the
//! selected media stream fields are optional.

use serde::{Deserialize, Serialize};

use crate::pool::{Instance, Provider};

/// Placeholder for any text field absent from the provider payload.
pub const LOAD_FAILED: &str = "Load Failed";

/// Public thumbnail for a video id, independent of any mirror.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/0.jpg")
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub author_id: String,
    pub author_thumbnail: String,
    /// Duration rendered as `H:MM:SS`.
    pub length_text: String,
    pub view_count: u64,
    pub like_count: u64,
    pub published_text: String,
    pub thumbnail: String,
    /// Progressive (audio+video) stream URLs, best first.
    pub stream_urls: Vec<String>,
    pub high_quality_url: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VideoDetail {
    pub video: VideoRecord,
    pub related: Vec<SearchHit>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Video,
    Channel,
    Playlist,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub kind: HitKind,
    pub id: String,
    pub title: String,
    pub author: String,
    pub author_id: String,
    pub length_text: String,
    pub view_count: u64,
    pub published_text: String,
    pub thumbnail: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChannelPage {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub banner: String,
    pub subscriber_count: u64,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChannelDetail {
    pub channel: ChannelPage,
    pub videos: Vec<SearchHit>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub author_id: String,
    pub author_thumbnail: String,
    pub content: String,
    pub like_count: u64,
    pub published_text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub index: u64,
    pub id: String,
    pub title: String,
    pub author: String,
    pub author_id: String,
    pub length_text: String,
    pub thumbnail: String,
}

/// A record together with the instance that produced it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub source: Instance,
    pub provider: Provider,
    pub record: T,
}
