use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// Resource category; each category owns its own ordered instance lists.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Video,
    Search,
    Channel,
    Comments,
    Playlist,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Video,
        Category::Search,
        Category::Channel,
        Category::Comments,
        Category::Playlist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Video => "video",
            Category::Search => "search",
            Category::Channel => "channel",
            Category::Comments => "comments",
            Category::Playlist => "playlist",
        }
    }

    /// Parses a category name, accepting singular and plural forms.
    pub fn parse(category: &str) -> Option<Self> {
        match category.trim().to_lowercase().as_str() {
            "video" | "videos" => Some(Category::Video),
            "search" => Some(Category::Search),
            "channel" | "channels" => Some(Category::Channel),
            "comments" | "comment" => Some(Category::Comments),
            "playlist" | "playlists" => Some(Category::Playlist),
            _ => None,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Video => 0,
            Category::Search => 1,
            Category::Channel => 2,
            Category::Comments => 3,
            Category::Playlist => 4,
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown category `{s}`"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API dialect spoken by an instance list.
///
/// The primary lists hold Invidious-compatible mirrors, the secondary lists
/// Piped-compatible ones.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Primary,
    Secondary,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Primary => "primary",
            Provider::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sub-lists of a category a fetch draws its candidates from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    #[default]
    Combined,
    PrimaryOnly,
    SecondaryOnly,
}

impl SelectionMode {
    /// Parses a caller supplied mode. Unknown values select `Combined`.
    pub fn parse(mode: &str) -> Self {
        match mode.trim().to_lowercase().as_str() {
            "primary" | "primary-only" | "invidious" | "inv" => SelectionMode::PrimaryOnly,
            "secondary" | "secondary-only" | "piped" => SelectionMode::SecondaryOnly,
            _ => SelectionMode::Combined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Combined => "combined",
            SelectionMode::PrimaryOnly => "primary-only",
            SelectionMode::SecondaryOnly => "secondary-only",
        }
    }

    pub(crate) fn providers(&self) -> &'static [Provider] {
        match self {
            SelectionMode::Combined => &[Provider::Primary, Provider::Secondary],
            SelectionMode::PrimaryOnly => &[Provider::Primary],
            SelectionMode::SecondaryOnly => &[Provider::Secondary],
        }
    }
}

impl FromStr for SelectionMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URL of one mirror. Equality is plain string equality.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Instance(String);

impl Instance {
    pub fn parse(base_url: &str) -> Result<Self, String> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| format!("invalid instance url `{trimmed}`: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "invalid instance url `{trimmed}`: unsupported scheme `{}`",
                url.scheme()
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins `path` onto the base (keeping any path prefix the base carries)
    /// and appends `query` pairs.
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, url::ParseError> {
        let raw = format!("{}/{}", self.0, path.trim_start_matches('/'));
        if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query.iter().map(|(k, v)| (*k, v.as_str())))
        }
    }
}

impl TryFrom<String> for Instance {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Instance> for String {
    fn from(instance: Instance) -> Self {
        instance.0
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a dispatch snapshot: the instance plus the list it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub provider: Provider,
    pub instance: Instance,
}

impl Candidate {
    pub fn new(provider: Provider, instance: Instance) -> Self {
        Self { provider, instance }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.instance, self.provider)
    }
}
