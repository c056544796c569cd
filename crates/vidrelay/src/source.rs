use async_trait::async_trait;

use crate::error::Result;
use crate::pool::SelectionMode;
use crate::records::{ChannelDetail, Comment, PlaylistItem, SearchHit, Sourced, VideoDetail};

/// Backend-agnostic data-fetch contract consumed by a presentation layer.
///
/// The mirror relay and the yt-dlp backend both implement it, so callers can
/// switch backends without changing how records are consumed. Backends that
/// do not have the notion of instances ignore `mode`.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn video(&self, id: &str, mode: SelectionMode) -> Result<VideoDetail>;

    async fn search(&self, query: &str, page: u32, mode: SelectionMode) -> Result<Vec<SearchHit>>;

    async fn channel(&self, id: &str, mode: SelectionMode) -> Result<ChannelDetail>;

    async fn playlist(&self, id: &str, page: u32, mode: SelectionMode)
    -> Result<Vec<PlaylistItem>>;

    async fn comments(&self, video_id: &str, mode: SelectionMode) -> Result<Vec<Comment>>;

    /// Comments from every instance that answered, in priority order.
    async fn comments_from_all(
        &self,
        video_id: &str,
        mode: SelectionMode,
    ) -> Result<Vec<Sourced<Vec<Comment>>>>;
}
