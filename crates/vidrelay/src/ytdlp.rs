//! [`VideoSource`] backed by a local `yt-dlp` binary.
//!
//! Only video detail and search are available; yt-dlp has no notion of
//! mirrors, so the selection mode is ignored.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{RelayError, Result, describe_timeout};
use crate::mapping::streams::{self, Container, StreamCandidate};
use crate::mapping::{array, count, format_duration, opt_text, seconds, text, video_thumbnail};
use crate::pool::SelectionMode;
use crate::records::{
    ChannelDetail, Comment, HitKind, LOAD_FAILED, PlaylistItem, SearchHit, Sourced, VideoDetail,
    VideoRecord,
};
use crate::source::VideoSource;

const BACKEND: &str = "yt-dlp";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const RESULTS_PER_PAGE: u32 = 10;

#[derive(Debug, Clone)]
pub struct YtDlpSource {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new("yt-dlp", Duration::from_secs(30))
    }
}

impl YtDlpSource {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Runs yt-dlp with `args` and parses its single JSON document.
    async fn dump_json(&self, args: &[&str]) -> Result<Value> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--dump-single-json", "--skip-download", "--no-warnings"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        debug!(binary = %self.binary.display(), ?args, "Running yt-dlp");

        let child = cmd
            .spawn()
            .map_err(|e| RelayError::backend(BACKEND, format!("failed to spawn: {e}")))?;
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RelayError::backend(BACKEND, describe_timeout(self.timeout)))?
            .map_err(|e| RelayError::backend(BACKEND, format!("failed to wait: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = ?output.status.code(), "yt-dlp failed");
            return Err(RelayError::backend(
                BACKEND,
                format!(
                    "exit code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.lines().last().unwrap_or_default()
                ),
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| RelayError::backend(BACKEND, format!("unparseable output: {e}")))
    }
}

fn has_codec(format: &Value, key: &str) -> bool {
    matches!(format.get(key).and_then(Value::as_str), Some(codec) if codec != "none")
}

fn format_candidate(format: &Value) -> Option<StreamCandidate> {
    let url = format.get("url")?.as_str()?.to_string();
    let audio_only = has_codec(format, "acodec") && !has_codec(format, "vcodec");
    let bitrate = format
        .get("abr")
        .or_else(|| format.get("tbr"))
        .and_then(Value::as_f64)
        .map(|kbps| (kbps * 1000.0) as u64)
        .unwrap_or(0);
    Some(StreamCandidate {
        url,
        container: Container::from_tag(&opt_text(format, "ext").unwrap_or_default()),
        height: if audio_only {
            None
        } else {
            format
                .get("height")
                .and_then(Value::as_u64)
                .and_then(|h| u32::try_from(h).ok())
        },
        bitrate,
        audio_only,
    })
}

/// Maps a `yt-dlp -J` info document.
pub fn map_video(id: &str, info: &Value) -> VideoDetail {
    let formats = array(info, "formats");

    // yt-dlp lists formats worst first.
    let stream_urls = formats
        .iter()
        .rev()
        .filter(|f| has_codec(f, "vcodec") && has_codec(f, "acodec"))
        .filter(|f| f.get("ext").and_then(Value::as_str) == Some("mp4"))
        .filter_map(|f| f.get("url").and_then(Value::as_str))
        .map(ToOwned::to_owned)
        .collect();
    let candidates: Vec<_> = formats.iter().filter_map(format_candidate).collect();

    let id = opt_text(info, "id").unwrap_or_else(|| id.to_string());
    VideoDetail {
        video: VideoRecord {
            title: text(info, "title"),
            description: text(info, "description"),
            author: text(info, "uploader"),
            author_id: opt_text(info, "channel_id")
                .or_else(|| opt_text(info, "uploader_id"))
                .unwrap_or_else(|| LOAD_FAILED.to_string()),
            author_thumbnail: LOAD_FAILED.to_string(),
            length_text: format_duration(duration(info)),
            view_count: count(info, "view_count"),
            like_count: count(info, "like_count"),
            published_text: text(info, "upload_date"),
            thumbnail: video_thumbnail(opt_text(info, "thumbnail"), &id),
            stream_urls,
            high_quality_url: streams::select_high_quality(&candidates),
            audio_url: streams::select_audio(&candidates),
            id,
        },
        related: Vec::new(),
    }
}

/// yt-dlp reports durations as floats.
fn duration(info: &Value) -> i64 {
    info.get("duration")
        .and_then(Value::as_f64)
        .map(|d| d as i64)
        .unwrap_or_else(|| seconds(info, "duration"))
}

/// Maps a flat `ytsearchN:` playlist document, skipping the first `skip`
/// entries.
pub fn map_search(result: &Value, skip: usize) -> Vec<SearchHit> {
    array(result, "entries")
        .iter()
        .skip(skip)
        .map(|entry| {
            let id = text(entry, "id");
            SearchHit {
                kind: HitKind::Video,
                thumbnail: video_thumbnail(None, &id),
                id,
                title: text(entry, "title"),
                author: opt_text(entry, "uploader")
                    .or_else(|| opt_text(entry, "channel"))
                    .unwrap_or_else(|| LOAD_FAILED.to_string()),
                author_id: text(entry, "channel_id"),
                length_text: format_duration(duration(entry)),
                view_count: count(entry, "view_count"),
                published_text: LOAD_FAILED.to_string(),
            }
        })
        .collect()
}

#[async_trait]
impl VideoSource for YtDlpSource {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn video(&self, id: &str, _mode: SelectionMode) -> Result<VideoDetail> {
        let url = format!("{WATCH_URL}{id}");
        let info = self.dump_json(&[url.as_str()]).await?;
        Ok(map_video(id, &info))
    }

    async fn search(&self, query: &str, page: u32, _mode: SelectionMode) -> Result<Vec<SearchHit>> {
        let page = page.max(1);
        let wanted = RESULTS_PER_PAGE
            .checked_mul(page)
            .ok_or_else(|| {
                RelayError::backend(BACKEND, format!("search page {page} is out of range"))
            })?;
        let target = format!("ytsearch{wanted}:{query}");
        let result = self.dump_json(&["--flat-playlist", target.as_str()]).await?;
        Ok(map_search(&result, (wanted - RESULTS_PER_PAGE) as usize))
    }

    async fn channel(&self, _id: &str, _mode: SelectionMode) -> Result<ChannelDetail> {
        Err(RelayError::Unsupported {
            backend: BACKEND,
            operation: "channel",
        })
    }

    async fn playlist(
        &self,
        _id: &str,
        _page: u32,
        _mode: SelectionMode,
    ) -> Result<Vec<PlaylistItem>> {
        Err(RelayError::Unsupported {
            backend: BACKEND,
            operation: "playlist",
        })
    }

    async fn comments(&self, _video_id: &str, _mode: SelectionMode) -> Result<Vec<Comment>> {
        Err(RelayError::Unsupported {
            backend: BACKEND,
            operation: "comments",
        })
    }

    async fn comments_from_all(
        &self,
        _video_id: &str,
        _mode: SelectionMode,
    ) -> Result<Vec<Sourced<Vec<Comment>>>> {
        Err(RelayError::Unsupported {
            backend: BACKEND,
            operation: "comments",
        })
    }
}
