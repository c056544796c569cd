//! Media stream selection shared by both provider dialects.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    M4a,
    Webm,
    Other,
}

impl Container {
    /// Accepts container names (`mp4`), Piped format tags (`MPEG_4`,
    /// `WEBMA_OPUS`) and mime types (`audio/mp4; codecs=...`).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        let tag = tag.split(';').next().unwrap_or_default().trim();
        match tag {
            "mp4" | "mpeg_4" | "video/mp4" => Container::Mp4,
            "m4a" | "audio/mp4" => Container::M4a,
            "webm" | "webma" | "webma_opus" | "video/webm" | "audio/webm" => Container::Webm,
            _ => Container::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::M4a => "m4a",
            Container::Webm => "webm",
            Container::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCandidate {
    pub url: String,
    pub container: Container,
    /// Vertical resolution parsed from the quality label, `None` for audio.
    pub height: Option<u32>,
    pub bitrate: u64,
    pub audio_only: bool,
}

/// Parses labels like `1080p`, `720p60` or `480p HDR`.
pub fn parse_height(label: &str) -> Option<u32> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let rest = &label.trim()[digits.len()..];
    if rest.starts_with('p') {
        digits.parse().ok()
    } else {
        None
    }
}

/// Highest-resolution mp4 video stream.
pub fn select_high_quality(candidates: &[StreamCandidate]) -> Option<String> {
    candidates
        .iter()
        .filter(|c| !c.audio_only && c.container == Container::Mp4)
        .filter_map(|c| c.height.map(|h| (h, c)))
        // max_by_key keeps the last maximum; reverse so the earliest wins ties
        .rev()
        .max_by_key(|(h, _)| *h)
        .map(|(_, c)| c.url.clone())
}

/// Best-bitrate audio-only stream in the mp4 family.
pub fn select_audio(candidates: &[StreamCandidate]) -> Option<String> {
    candidates
        .iter()
        .filter(|c| c.audio_only && matches!(c.container, Container::M4a | Container::Mp4))
        .rev()
        .max_by_key(|c| c.bitrate)
        .map(|c| c.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(url: &str, container: Container, label: &str) -> StreamCandidate {
        StreamCandidate {
            url: url.into(),
            container,
            height: parse_height(label),
            bitrate: 0,
            audio_only: false,
        }
    }

    fn audio(url: &str, container: Container, bitrate: u64) -> StreamCandidate {
        StreamCandidate {
            url: url.into(),
            container,
            height: None,
            bitrate,
            audio_only: true,
        }
    }

    #[test]
    fn parses_quality_labels() {
        assert_eq!(parse_height("1080p"), Some(1080));
        assert_eq!(parse_height("720p60"), Some(720));
        assert_eq!(parse_height("128 kbps"), None);
        assert_eq!(parse_height(""), None);
    }

    #[test]
    fn container_tags_normalize() {
        assert_eq!(Container::from_tag("MPEG_4"), Container::Mp4);
        assert_eq!(Container::from_tag("audio/mp4; codecs=\"mp4a.40.2\""), Container::M4a);
        assert_eq!(Container::from_tag("WEBMA_OPUS"), Container::Webm);
        assert_eq!(Container::from_tag("3gp"), Container::Other);
    }

    #[test]
    fn high_quality_prefers_tallest_mp4() {
        let candidates = vec![
            video("w1080", Container::Webm, "1080p"),
            video("m720", Container::Mp4, "720p"),
            video("m1080", Container::Mp4, "1080p60"),
            video("m1080b", Container::Mp4, "1080p"),
            audio("a", Container::M4a, 128_000),
        ];
        assert_eq!(select_high_quality(&candidates).as_deref(), Some("m1080"));
    }

    #[test]
    fn high_quality_absent_without_mp4() {
        let candidates = vec![video("w", Container::Webm, "1080p")];
        assert_eq!(select_high_quality(&candidates), None);
    }

    #[test]
    fn audio_prefers_highest_bitrate_m4a() {
        let candidates = vec![
            audio("opus", Container::Webm, 160_000),
            audio("low", Container::M4a, 48_000),
            audio("med", Container::M4a, 128_000),
        ];
        assert_eq!(select_audio(&candidates).as_deref(), Some("med"));
        assert_eq!(select_audio(&[audio("opus", Container::Webm, 1)]), None);
    }
}
