//! One strategy per resource category, pairing the endpoint, the validator
//! and the mapper for both API dialects.

use serde_json::Value;

use crate::error::Rejection;
use crate::mapping::{invidious, piped};
use crate::pool::{Category, Provider};
use crate::records::{ChannelDetail, Comment, PlaylistItem, SearchHit, VideoDetail};
use crate::validate;

/// Relative path and query of one request against an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    fn path(path: String) -> Self {
        Self {
            path,
            query: Vec::new(),
        }
    }

    fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

pub trait Resource: Send + Sync {
    type Output: Send;

    /// Whether the stream probe applies when the pool's gate is enabled.
    const PROBED: bool = false;

    fn category(&self) -> Category;

    fn endpoint(&self, provider: Provider) -> Endpoint;

    fn validate(&self, provider: Provider, payload: &Value) -> Result<(), Rejection> {
        validate::check(self.category(), provider, payload)
    }

    fn map(&self, provider: Provider, payload: &Value) -> Self::Output;

    /// Media URL handed to the stream probe.
    fn media_url(_output: &Self::Output) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct VideoResource {
    pub id: String,
}

impl Resource for VideoResource {
    type Output = VideoDetail;

    const PROBED: bool = true;

    fn category(&self) -> Category {
        Category::Video
    }

    fn endpoint(&self, provider: Provider) -> Endpoint {
        match provider {
            Provider::Primary => Endpoint::path(format!("api/v1/videos/{}", self.id)),
            Provider::Secondary => Endpoint::path(format!("streams/{}", self.id)),
        }
    }

    fn map(&self, provider: Provider, payload: &Value) -> VideoDetail {
        match provider {
            Provider::Primary => invidious::video(&self.id, payload),
            Provider::Secondary => piped::video(&self.id, payload),
        }
    }

    fn media_url(output: &VideoDetail) -> Option<&str> {
        output
            .video
            .stream_urls
            .first()
            .or(output.video.high_quality_url.as_ref())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct SearchResource {
    pub query: String,
    pub page: u32,
}

impl Resource for SearchResource {
    type Output = Vec<SearchHit>;

    fn category(&self) -> Category {
        Category::Search
    }

    fn endpoint(&self, provider: Provider) -> Endpoint {
        match provider {
            Provider::Primary => Endpoint::path("api/v1/search".into())
                .with_query("q", self.query.as_str())
                .with_query("page", self.page.max(1).to_string()),
            // Piped paginates with opaque tokens; only the first page is served.
            Provider::Secondary => Endpoint::path("search".into())
                .with_query("q", self.query.as_str())
                .with_query("filter", "all"),
        }
    }

    fn map(&self, provider: Provider, payload: &Value) -> Vec<SearchHit> {
        match provider {
            Provider::Primary => invidious::search(payload),
            Provider::Secondary => piped::search(payload),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelResource {
    pub id: String,
}

impl Resource for ChannelResource {
    type Output = ChannelDetail;

    fn category(&self) -> Category {
        Category::Channel
    }

    fn endpoint(&self, provider: Provider) -> Endpoint {
        match provider {
            Provider::Primary => Endpoint::path(format!("api/v1/channels/{}", self.id)),
            Provider::Secondary => Endpoint::path(format!("channel/{}", self.id)),
        }
    }

    fn map(&self, provider: Provider, payload: &Value) -> ChannelDetail {
        match provider {
            Provider::Primary => invidious::channel(&self.id, payload),
            Provider::Secondary => piped::channel(&self.id, payload),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentsResource {
    pub video_id: String,
}

impl Resource for CommentsResource {
    type Output = Vec<Comment>;

    fn category(&self) -> Category {
        Category::Comments
    }

    fn endpoint(&self, provider: Provider) -> Endpoint {
        match provider {
            Provider::Primary => Endpoint::path(format!("api/v1/comments/{}", self.video_id)),
            Provider::Secondary => Endpoint::path(format!("comments/{}", self.video_id)),
        }
    }

    fn map(&self, provider: Provider, payload: &Value) -> Vec<Comment> {
        match provider {
            Provider::Primary => invidious::comments(payload),
            Provider::Secondary => piped::comments(payload),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaylistResource {
    pub id: String,
    pub page: u32,
}

impl Resource for PlaylistResource {
    type Output = Vec<PlaylistItem>;

    fn category(&self) -> Category {
        Category::Playlist
    }

    fn endpoint(&self, provider: Provider) -> Endpoint {
        match provider {
            Provider::Primary => Endpoint::path(format!("api/v1/playlists/{}", self.id))
                .with_query("page", self.page.max(1).to_string()),
            Provider::Secondary => Endpoint::path(format!("playlists/{}", self.id)),
        }
    }

    fn map(&self, provider: Provider, payload: &Value) -> Vec<PlaylistItem> {
        match provider {
            Provider::Primary => invidious::playlist(payload),
            Provider::Secondary => piped::playlist(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Instance;
    use serde_json::json;

    fn url_for(resource: &impl Resource, provider: Provider, base: &str) -> String {
        let endpoint = resource.endpoint(provider);
        Instance::parse(base)
            .unwrap()
            .endpoint(&endpoint.path, &endpoint.query)
            .unwrap()
            .to_string()
    }

    #[test]
    fn endpoints_follow_each_dialect() {
        let video = VideoResource { id: "abc".into() };
        assert_eq!(
            url_for(&video, Provider::Primary, "https://inv.example"),
            "https://inv.example/api/v1/videos/abc"
        );
        assert_eq!(
            url_for(&video, Provider::Secondary, "https://piped.example/api/"),
            "https://piped.example/api/streams/abc"
        );

        let search = SearchResource {
            query: "rust lang".into(),
            page: 0,
        };
        assert_eq!(
            url_for(&search, Provider::Primary, "https://inv.example"),
            "https://inv.example/api/v1/search?q=rust+lang&page=1"
        );
        assert_eq!(
            url_for(&search, Provider::Secondary, "https://piped.example"),
            "https://piped.example/search?q=rust+lang&filter=all"
        );
    }

    #[test]
    fn video_media_url_prefers_progressive_stream() {
        let video = VideoResource { id: "abc".into() };
        let detail = video.map(
            Provider::Primary,
            &json!({"formatStreams": [{"url": "https://m/360", "container": "mp4", "qualityLabel": "360p"}]}),
        );
        assert_eq!(VideoResource::media_url(&detail), Some("https://m/360"));

        let bare = video.map(Provider::Primary, &json!({}));
        assert_eq!(VideoResource::media_url(&bare), None);
    }

    #[test]
    fn channel_strategy_applies_empty_policy() {
        let channel = ChannelResource { id: "UC1".into() };
        assert!(channel
            .validate(Provider::Secondary, &json!({"relatedStreams": []}))
            .is_err());
        assert!(channel
            .validate(Provider::Secondary, &json!({"relatedStreams": [{}]}))
            .is_ok());
    }
}
