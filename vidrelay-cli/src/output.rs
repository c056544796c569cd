use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;
use vidrelay::{
    ChannelDetail, Comment, HitKind, PlaylistItem, PoolSnapshot, SearchHit, Sourced, VideoDetail,
};

pub struct OutputManager {
    json: bool,
}

impl OutputManager {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Prints `value` as pretty JSON, or its text rendering.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    pub fn video(&self, detail: &VideoDetail, source: Option<&str>) -> Result<()> {
        self.emit(detail, || format_video(detail, source))
    }

    pub fn videos(&self, all: &[Sourced<VideoDetail>]) -> Result<()> {
        self.emit(&all, || {
            all.iter()
                .map(|s| format_video(&s.record, Some(s.source.as_str())))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn hits(&self, hits: &[SearchHit]) -> Result<()> {
        self.emit(&hits, || format_hits(hits))
    }

    pub fn channel(&self, detail: &ChannelDetail) -> Result<()> {
        self.emit(detail, || {
            let c = &detail.channel;
            let mut out = String::new();
            let _ = writeln!(out, "{} ({})", c.name, c.id);
            let _ = writeln!(out, "Subscribers: {}", c.subscriber_count);
            let _ = writeln!(out, "{}\n", c.description);
            out.push_str(&format_hits(&detail.videos));
            out
        })
    }

    pub fn playlist(&self, items: &[PlaylistItem]) -> Result<()> {
        self.emit(&items, || {
            items
                .iter()
                .map(|i| format!("{:>4}. {} [{}] {} ({})\n", i.index, i.title, i.length_text, i.author, i.id))
                .collect()
        })
    }

    pub fn comments(&self, comments: &[Comment]) -> Result<()> {
        self.emit(&comments, || format_comments(comments))
    }

    pub fn comments_from_all(&self, all: &[Sourced<Vec<Comment>>]) -> Result<()> {
        self.emit(&all, || {
            all.iter()
                .map(|s| format!("== {} ({} comments)\n{}", s.source, s.record.len(), format_comments(&s.record)))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn lines(&self, lines: &[String]) -> Result<()> {
        self.emit(&lines, || lines.iter().map(|l| format!("{l}\n")).collect())
    }

    pub fn pool(&self, snapshot: &PoolSnapshot) -> Result<()> {
        self.emit(snapshot, || {
            let mut out = String::new();
            if let Some(version) = snapshot.version {
                let _ = writeln!(out, "Definition version: {version}");
            }
            let _ = writeln!(out, "Stream validation: {}", if snapshot.stream_validation { "on" } else { "off" });
            for category in &snapshot.categories {
                let _ = writeln!(out, "\n[{}]", category.category);
                for (index, instance) in category.primary.iter().enumerate() {
                    let _ = writeln!(out, "  {index:>2} primary    {instance}");
                }
                for (index, instance) in category.secondary.iter().enumerate() {
                    let _ = writeln!(out, "  {index:>2} secondary  {instance}");
                }
            }
            out
        })
    }
}

fn format_video(detail: &VideoDetail, source: Option<&str>) -> String {
    let v = &detail.video;
    let mut out = String::new();
    let _ = writeln!(out, "{}", v.title);
    let _ = writeln!(out, "by {} ({})", v.author, v.author_id);
    let _ = writeln!(out, "Length: {}  Views: {}  Likes: {}", v.length_text, v.view_count, v.like_count);
    let _ = writeln!(out, "Published: {}", v.published_text);
    if let Some(source) = source {
        let _ = writeln!(out, "Source: {source}");
    }
    if let Some(url) = v.stream_urls.first() {
        let _ = writeln!(out, "Stream: {url}");
    }
    if let Some(url) = &v.high_quality_url {
        let _ = writeln!(out, "High quality: {url}");
    }
    if let Some(url) = &v.audio_url {
        let _ = writeln!(out, "Audio: {url}");
    }
    if !detail.related.is_empty() {
        let _ = writeln!(out, "\nRelated:");
        out.push_str(&format_hits(&detail.related));
    }
    out
}

fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| match hit.kind {
            HitKind::Video => format!(
                "[video]    {} [{}] {} ({})\n",
                hit.title, hit.length_text, hit.author, hit.id
            ),
            HitKind::Channel => format!("[channel]  {} ({})\n", hit.title, hit.id),
            HitKind::Playlist => format!("[playlist] {} by {} ({})\n", hit.title, hit.author, hit.id),
        })
        .collect()
}

fn format_comments(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(|c| format!("{} ({}, {} likes)\n  {}\n", c.author, c.published_text, c.like_count, c.content))
        .collect()
}
