//! Mappers for the primary (Invidious-compatible) API dialect.

use serde_json::Value;

use super::streams::{self, Container, StreamCandidate};
use super::{
    array, count, format_duration, opt_text, seconds, text, video_thumbnail, widest_thumbnail,
};
use crate::records::{
    ChannelDetail, ChannelPage, Comment, HitKind, LOAD_FAILED, PlaylistItem, SearchHit,
    VideoDetail, VideoRecord,
};

fn stream_candidate(format: &Value) -> Option<StreamCandidate> {
    let url = format.get("url")?.as_str()?.to_string();
    let mime = opt_text(format, "type").unwrap_or_default();
    let container = opt_text(format, "container")
        .map(|c| Container::from_tag(&c))
        .unwrap_or_else(|| Container::from_tag(&mime));
    Some(StreamCandidate {
        url,
        container,
        height: opt_text(format, "qualityLabel")
            .or_else(|| opt_text(format, "resolution"))
            .and_then(|label| streams::parse_height(&label)),
        bitrate: count(format, "bitrate"),
        audio_only: mime.starts_with("audio/"),
    })
}

fn video_hit(item: &Value) -> SearchHit {
    let id = text(item, "videoId");
    SearchHit {
        kind: HitKind::Video,
        thumbnail: video_thumbnail(widest_thumbnail(array(item, "videoThumbnails")), &id),
        id,
        title: text(item, "title"),
        author: text(item, "author"),
        author_id: text(item, "authorId"),
        length_text: format_duration(seconds(item, "lengthSeconds")),
        view_count: count(item, "viewCount"),
        published_text: text(item, "publishedText"),
    }
}

pub fn video(id: &str, data: &Value) -> VideoDetail {
    let format_streams = array(data, "formatStreams");

    // Progressive streams are listed lowest quality first.
    let stream_urls = format_streams
        .iter()
        .rev()
        .filter_map(|f| f.get("url").and_then(Value::as_str))
        .map(ToOwned::to_owned)
        .collect();

    let candidates: Vec<StreamCandidate> = format_streams
        .iter()
        .chain(array(data, "adaptiveFormats"))
        .filter_map(stream_candidate)
        .collect();

    let id = opt_text(data, "videoId").unwrap_or_else(|| id.to_string());
    let video = VideoRecord {
        title: text(data, "title"),
        description: opt_text(data, "description")
            .or_else(|| opt_text(data, "descriptionHtml"))
            .unwrap_or_else(|| LOAD_FAILED.to_string()),
        author: text(data, "author"),
        author_id: text(data, "authorId"),
        author_thumbnail: widest_thumbnail(array(data, "authorThumbnails"))
            .unwrap_or_else(|| LOAD_FAILED.to_string()),
        length_text: format_duration(seconds(data, "lengthSeconds")),
        view_count: count(data, "viewCount"),
        like_count: count(data, "likeCount"),
        published_text: text(data, "publishedText"),
        thumbnail: video_thumbnail(widest_thumbnail(array(data, "videoThumbnails")), &id),
        stream_urls,
        high_quality_url: streams::select_high_quality(&candidates),
        audio_url: streams::select_audio(&candidates),
        id,
    };

    VideoDetail {
        video,
        related: array(data, "recommendedVideos").iter().map(video_hit).collect(),
    }
}

pub fn search(data: &Value) -> Vec<SearchHit> {
    let Some(items) = data.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item.get("type").and_then(Value::as_str) {
            Some("video") => Some(video_hit(item)),
            Some("channel") => Some(SearchHit {
                kind: HitKind::Channel,
                id: text(item, "authorId"),
                title: text(item, "author"),
                author: text(item, "author"),
                author_id: text(item, "authorId"),
                length_text: format_duration(0),
                view_count: count(item, "subCount"),
                published_text: LOAD_FAILED.to_string(),
                thumbnail: widest_thumbnail(array(item, "authorThumbnails"))
                    .unwrap_or_else(|| LOAD_FAILED.to_string()),
            }),
            Some("playlist") => Some(SearchHit {
                kind: HitKind::Playlist,
                id: text(item, "playlistId"),
                title: text(item, "title"),
                author: text(item, "author"),
                author_id: text(item, "authorId"),
                length_text: format_duration(0),
                view_count: count(item, "videoCount"),
                published_text: LOAD_FAILED.to_string(),
                thumbnail: text(item, "playlistThumbnail"),
            }),
            _ => None,
        })
        .collect()
}

pub fn channel(id: &str, data: &Value) -> ChannelDetail {
    let channel = ChannelPage {
        id: opt_text(data, "authorId").unwrap_or_else(|| id.to_string()),
        name: text(data, "author"),
        avatar: widest_thumbnail(array(data, "authorThumbnails"))
            .unwrap_or_else(|| LOAD_FAILED.to_string()),
        banner: widest_thumbnail(array(data, "authorBanners"))
            .unwrap_or_else(|| LOAD_FAILED.to_string()),
        subscriber_count: count(data, "subCount"),
        description: text(data, "description"),
    };
    ChannelDetail {
        channel,
        videos: array(data, "latestVideos").iter().map(video_hit).collect(),
    }
}

pub fn comments(data: &Value) -> Vec<Comment> {
    array(data, "comments")
        .iter()
        .map(|c| Comment {
            author: text(c, "author"),
            author_id: text(c, "authorId"),
            author_thumbnail: widest_thumbnail(array(c, "authorThumbnails"))
                .unwrap_or_else(|| LOAD_FAILED.to_string()),
            content: text(c, "content"),
            like_count: count(c, "likeCount"),
            published_text: text(c, "publishedText"),
        })
        .collect()
}

pub fn playlist(data: &Value) -> Vec<PlaylistItem> {
    array(data, "videos")
        .iter()
        .enumerate()
        .map(|(position, v)| {
            let id = text(v, "videoId");
            PlaylistItem {
                index: v
                    .get("index")
                    .and_then(Value::as_u64)
                    .unwrap_or(position as u64),
                thumbnail: video_thumbnail(widest_thumbnail(array(v, "videoThumbnails")), &id),
                id,
                title: text(v, "title"),
                author: text(v, "author"),
                author_id: text(v, "authorId"),
                length_text: format_duration(seconds(v, "lengthSeconds")),
            }
        })
        .collect()
}
