//! The mirror-backed [`VideoSource`]: pool, dispatcher and aggregator behind
//! one handle.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::aggregate::MultiSourceAggregator;
use crate::config::RelayConfig;
use crate::dispatch::{Dispatcher, Timeouts};
use crate::error::{RelayError, Result};
use crate::http::{ReqwestTransport, Transport, default_client};
use crate::pool::{Candidate, Category, InstancePool, PoolSnapshot, SelectionMode};
use crate::records::{ChannelDetail, Comment, PlaylistItem, SearchHit, Sourced, VideoDetail};
use crate::resource::{
    ChannelResource, CommentsResource, PlaylistResource, SearchResource, VideoResource,
};
use crate::source::VideoSource;
use crate::suggest;

pub struct Relay {
    dispatcher: Dispatcher,
    config: RelayConfig,
    /// Parent of the tokens handed to fetches started since the last cancel.
    cancel: Mutex<CancellationToken>,
}

impl Relay {
    /// Builds a relay over the default reqwest transport.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(default_client(), config.user_agents.clone());
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: RelayConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let pool = InstancePool::new(config.pool.clone().unwrap_or_default())
            .with_stream_validation(config.stream_validation);
        let dispatcher = Dispatcher::new(Arc::new(pool), transport, Timeouts::from(&config));
        Ok(Self {
            dispatcher,
            config,
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<InstancePool> {
        self.dispatcher.pool()
    }

    /// Cancels every fetch currently in flight: no further instance is
    /// contacted on their behalf. Fetches started afterwards are unaffected.
    pub fn cancel_in_flight(&self) {
        let previous = std::mem::replace(&mut *self.cancel.lock(), CancellationToken::new());
        previous.cancel();
    }

    fn call_token(&self) -> CancellationToken {
        self.cancel.lock().child_token()
    }

    pub async fn fetch_video(&self, id: &str, mode: SelectionMode) -> Result<Sourced<VideoDetail>> {
        let resource = VideoResource { id: id.to_string() };
        self.dispatcher
            .first_success(&resource, mode, &self.call_token())
            .await
    }

    pub async fn fetch_search(
        &self,
        query: &str,
        page: u32,
        mode: SelectionMode,
    ) -> Result<Sourced<Vec<SearchHit>>> {
        let resource = SearchResource {
            query: query.to_string(),
            page,
        };
        self.dispatcher
            .first_success(&resource, mode, &self.call_token())
            .await
    }

    pub async fn fetch_channel(&self, id: &str, mode: SelectionMode) -> Result<Sourced<ChannelDetail>> {
        let resource = ChannelResource { id: id.to_string() };
        self.dispatcher
            .first_success(&resource, mode, &self.call_token())
            .await
    }

    pub async fn fetch_playlist(
        &self,
        id: &str,
        page: u32,
        mode: SelectionMode,
    ) -> Result<Sourced<Vec<PlaylistItem>>> {
        let resource = PlaylistResource {
            id: id.to_string(),
            page,
        };
        self.dispatcher
            .first_success(&resource, mode, &self.call_token())
            .await
    }

    pub async fn fetch_comments(
        &self,
        video_id: &str,
        mode: SelectionMode,
    ) -> Result<Sourced<Vec<Comment>>> {
        let resource = CommentsResource {
            video_id: video_id.to_string(),
        };
        self.dispatcher
            .first_success(&resource, mode, &self.call_token())
            .await
    }

    pub async fn fetch_comments_from_all(
        &self,
        video_id: &str,
        mode: SelectionMode,
    ) -> Result<Vec<Sourced<Vec<Comment>>>> {
        let resource = CommentsResource {
            video_id: video_id.to_string(),
        };
        MultiSourceAggregator::new(&self.dispatcher, self.config.fanout_concurrency)
            .collect(&resource, mode, &self.call_token())
            .await
    }

    /// Video detail from every instance that answered, for side-by-side
    /// comparison.
    pub async fn fetch_video_from_all(
        &self,
        id: &str,
        mode: SelectionMode,
    ) -> Result<Vec<Sourced<VideoDetail>>> {
        let resource = VideoResource { id: id.to_string() };
        MultiSourceAggregator::new(&self.dispatcher, self.config.fanout_concurrency)
            .collect(&resource, mode, &self.call_token())
            .await
    }

    /// Replaces the pool with the document at `source`. The current pool is
    /// kept on any failure.
    pub async fn reload_pool(&self, source: &str) -> Result<PoolSnapshot> {
        self.pool()
            .reload(self.dispatcher.transport(), source, self.config.reload_timeout())
            .await
    }

    /// Reloads from the configured `definition_url`.
    pub async fn reload_configured_pool(&self) -> Result<PoolSnapshot> {
        let source = self
            .config
            .definition_url
            .as_deref()
            .ok_or_else(|| RelayError::configuration("no definition_url configured"))?;
        self.reload_pool(source).await
    }

    /// Forces the current head of `category` to the back of its list.
    pub fn rotate(&self, category: Category) -> Option<Candidate> {
        let rotated = self.pool().rotate(category);
        if rotated.is_none() {
            info!(%category, "Nothing to rotate, category is empty");
        }
        rotated
    }

    pub fn toggle_stream_validation(&self) -> bool {
        self.pool().toggle_stream_validation()
    }

    pub fn describe_pool(&self) -> PoolSnapshot {
        self.pool().describe()
    }

    pub async fn suggest(&self, keyword: &str) -> Result<Vec<String>> {
        suggest::fetch_suggestions(
            self.dispatcher.transport(),
            keyword,
            &self.config.suggest_language,
            self.config.attempt_timeout(),
        )
        .await
    }
}

#[async_trait]
impl VideoSource for Relay {
    fn name(&self) -> &'static str {
        "mirrors"
    }

    async fn video(&self, id: &str, mode: SelectionMode) -> Result<VideoDetail> {
        Ok(self.fetch_video(id, mode).await?.record)
    }

    async fn search(&self, query: &str, page: u32, mode: SelectionMode) -> Result<Vec<SearchHit>> {
        Ok(self.fetch_search(query, page, mode).await?.record)
    }

    async fn channel(&self, id: &str, mode: SelectionMode) -> Result<ChannelDetail> {
        Ok(self.fetch_channel(id, mode).await?.record)
    }

    async fn playlist(
        &self,
        id: &str,
        page: u32,
        mode: SelectionMode,
    ) -> Result<Vec<PlaylistItem>> {
        Ok(self.fetch_playlist(id, page, mode).await?.record)
    }

    async fn comments(&self, video_id: &str, mode: SelectionMode) -> Result<Vec<Comment>> {
        Ok(self.fetch_comments(video_id, mode).await?.record)
    }

    async fn comments_from_all(
        &self,
        video_id: &str,
        mode: SelectionMode,
    ) -> Result<Vec<Sourced<Vec<Comment>>>> {
        self.fetch_comments_from_all(video_id, mode).await
    }
}
