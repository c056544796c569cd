//! Mappers for the secondary (Piped-compatible) API dialect.
//!
//! Piped reports ids through relative links (`/watch?v=`, `/channel/`), so
//! most ids are recovered with [`id_from_link`](super::id_from_link).

use serde_json::Value;

use super::streams::{self, Container, StreamCandidate};
use super::{
    absolute_url, array, count, format_duration, id_or_placeholder, opt_text, seconds, text,
    video_thumbnail,
};
use crate::records::{
    ChannelDetail, ChannelPage, Comment, HitKind, LOAD_FAILED, PlaylistItem, SearchHit,
    VideoDetail, VideoRecord,
};

fn image(value: &Value, key: &str) -> String {
    opt_text(value, key)
        .map(|url| absolute_url(&url))
        .unwrap_or_else(|| LOAD_FAILED.to_string())
}

fn stream_candidate(stream: &Value, audio_only: bool) -> Option<StreamCandidate> {
    let url = stream.get("url")?.as_str()?.to_string();
    let container = opt_text(stream, "format")
        .or_else(|| opt_text(stream, "mimeType"))
        .map(|tag| Container::from_tag(&tag))
        .unwrap_or(Container::Other);
    let height = match stream.get("height").and_then(Value::as_u64) {
        Some(h) if h > 0 => u32::try_from(h).ok(),
        _ => opt_text(stream, "quality").and_then(|q| streams::parse_height(&q)),
    };
    Some(StreamCandidate {
        url,
        container,
        height: if audio_only { None } else { height },
        bitrate: count(stream, "bitrate"),
        audio_only,
    })
}

fn stream_hit(item: &Value) -> SearchHit {
    let id = id_or_placeholder(opt_text(item, "url").as_deref());
    SearchHit {
        kind: HitKind::Video,
        thumbnail: video_thumbnail(opt_text(item, "thumbnail"), &id),
        id,
        title: text(item, "title"),
        author: text(item, "uploaderName"),
        author_id: id_or_placeholder(opt_text(item, "uploaderUrl").as_deref()),
        length_text: format_duration(seconds(item, "duration")),
        view_count: count(item, "views"),
        published_text: text(item, "uploadedDate"),
    }
}

pub fn video(id: &str, data: &Value) -> VideoDetail {
    let video_streams = array(data, "videoStreams");

    let stream_urls = video_streams
        .iter()
        .filter(|s| !s.get("videoOnly").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|s| s.get("url").and_then(Value::as_str))
        .map(ToOwned::to_owned)
        .collect();

    let candidates: Vec<StreamCandidate> = video_streams
        .iter()
        .filter_map(|s| stream_candidate(s, false))
        .chain(
            array(data, "audioStreams")
                .iter()
                .filter_map(|s| stream_candidate(s, true)),
        )
        .collect();

    let video = VideoRecord {
        id: id.to_string(),
        title: text(data, "title"),
        description: text(data, "description"),
        author: text(data, "uploader"),
        author_id: id_or_placeholder(opt_text(data, "uploaderUrl").as_deref()),
        author_thumbnail: image(data, "uploaderAvatar"),
        length_text: format_duration(seconds(data, "duration")),
        view_count: count(data, "views"),
        like_count: count(data, "likes"),
        published_text: text(data, "uploadDate"),
        thumbnail: video_thumbnail(opt_text(data, "thumbnailUrl"), id),
        stream_urls,
        high_quality_url: streams::select_high_quality(&candidates),
        audio_url: streams::select_audio(&candidates),
    };

    VideoDetail {
        video,
        related: array(data, "relatedStreams")
            .iter()
            .filter(|s| matches!(s.get("type").and_then(Value::as_str), None | Some("stream")))
            .map(stream_hit)
            .collect(),
    }
}

pub fn search(data: &Value) -> Vec<SearchHit> {
    array(data, "items")
        .iter()
        .filter_map(|item| match item.get("type").and_then(Value::as_str) {
            Some("stream") => Some(stream_hit(item)),
            Some("channel") => {
                let id = id_or_placeholder(opt_text(item, "url").as_deref());
                Some(SearchHit {
                    kind: HitKind::Channel,
                    author_id: id.clone(),
                    id,
                    title: text(item, "name"),
                    author: text(item, "name"),
                    length_text: format_duration(0),
                    view_count: count(item, "subscribers"),
                    published_text: LOAD_FAILED.to_string(),
                    thumbnail: image(item, "thumbnail"),
                })
            }
            Some("playlist") => Some(SearchHit {
                kind: HitKind::Playlist,
                id: id_or_placeholder(opt_text(item, "url").as_deref()),
                title: text(item, "name"),
                author: text(item, "uploaderName"),
                author_id: id_or_placeholder(opt_text(item, "uploaderUrl").as_deref()),
                length_text: format_duration(0),
                view_count: count(item, "videos"),
                published_text: LOAD_FAILED.to_string(),
                thumbnail: image(item, "thumbnail"),
            }),
            _ => None,
        })
        .collect()
}

pub fn channel(id: &str, data: &Value) -> ChannelDetail {
    let channel = ChannelPage {
        id: opt_text(data, "id").unwrap_or_else(|| id.to_string()),
        name: text(data, "name"),
        avatar: image(data, "avatarUrl"),
        banner: image(data, "bannerUrl"),
        subscriber_count: count(data, "subscriberCount"),
        description: text(data, "description"),
    };
    ChannelDetail {
        channel,
        videos: array(data, "relatedStreams").iter().map(stream_hit).collect(),
    }
}

pub fn comments(data: &Value) -> Vec<Comment> {
    array(data, "comments")
        .iter()
        .map(|c| Comment {
            author: text(c, "author"),
            author_id: id_or_placeholder(opt_text(c, "commentorUrl").as_deref()),
            author_thumbnail: image(c, "thumbnail"),
            content: text(c, "commentText"),
            like_count: count(c, "likeCount"),
            published_text: text(c, "commentedTime"),
        })
        .collect()
}

pub fn playlist(data: &Value) -> Vec<PlaylistItem> {
    array(data, "relatedStreams")
        .iter()
        .enumerate()
        .map(|(position, s)| {
            let hit = stream_hit(s);
            PlaylistItem {
                index: position as u64 + 1,
                id: hit.id,
                title: hit.title,
                author: hit.author,
                author_id: hit.author_id,
                length_text: hit.length_text,
                thumbnail: hit.thumbnail,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_selects_progressive_and_adaptive_streams() {
        let data = json!({
            "title": "Clip",
            "uploader": "Uploader",
            "uploaderUrl": "/channel/UC9",
            "duration": 3725,
            "views": 10,
            "videoStreams": [
                {"url": "https://p.example/360", "format": "MPEG_4", "quality": "360p", "videoOnly": false},
                {"url": "https://p.example/1080", "format": "MPEG_4", "quality": "1080p", "videoOnly": true, "height": 1080},
                {"url": "https://p.example/1440w", "format": "WEBM", "quality": "1440p", "videoOnly": true}
            ],
            "audioStreams": [
                {"url": "https://p.example/opus", "format": "WEBMA_OPUS", "bitrate": 160000},
                {"url": "https://p.example/m4a", "format": "M4A", "bitrate": 130000}
            ],
            "relatedStreams": [
                {"type": "stream", "url": "/watch?v=next1", "title": "Next"},
                {"type": "channel", "url": "/channel/UC2"}
            ]
        });
        let detail = video("abc", &data);
        assert_eq!(detail.video.author_id, "UC9");
        assert_eq!(detail.video.length_text, "1:02:05");
        assert_eq!(detail.video.stream_urls, vec!["https://p.example/360"]);
        assert_eq!(detail.video.high_quality_url.as_deref(), Some("https://p.example/1080"));
        assert_eq!(detail.video.audio_url.as_deref(), Some("https://p.example/m4a"));
        assert_eq!(detail.related.len(), 1);
        assert_eq!(detail.related[0].id, "next1");
        assert_eq!(detail.video.thumbnail, "https://img.youtube.com/vi/abc/0.jpg");
    }

    #[test]
    fn search_recovers_ids_from_links() {
        let data = json!({"items": [
            {"type": "stream", "url": "/watch?v=v1", "title": "T", "uploaderUrl": "/channel/UC1"},
            {"type": "channel", "url": "/channel/UC2", "name": "C", "subscribers": -1},
            {"type": "playlist", "url": "/playlist?list=PL3", "name": "P"}
        ]});
        let hits = search(&data);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "v1");
        assert_eq!(hits[0].author_id, "UC1");
        assert_eq!(hits[1].id, "UC2");
        assert_eq!(hits[1].view_count, 0);
        assert_eq!(hits[2].id, "PL3");
        assert_eq!(hits[2].author, LOAD_FAILED);
    }

    #[test]
    fn playlist_indices_start_at_one() {
        let data = json!({"relatedStreams": [{"url": "/watch?v=a"}, {"url": "/watch?v=b"}]});
        let items = playlist(&data);
        assert_eq!(items.iter().map(|i| i.index).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(items[1].id, "b");
    }

    #[test]
    fn comments_fall_back_per_field() {
        let cs = comments(&json!({"comments": [{"commentText": "nice"}]}));
        assert_eq!(cs[0].content, "nice");
        assert_eq!(cs[0].author, LOAD_FAILED);
        assert_eq!(cs[0].author_id, LOAD_FAILED);
    }
}
