//! # vidrelay
//!
//! A resilient request layer over a pool of interchangeable, independently
//! operated video-metadata API mirrors.
//!
//! ## Features
//!
//! - Per-category instance pool with demote-to-end rotation and atomic reload
//! - First-success dispatch under a per-attempt timeout and a global deadline
//! - Fan-out dispatch collecting every accepted response
//! - Per-category response validation and an optional media stream probe
//! - Normalized records for both the Invidious and the Piped API dialects
//! - A yt-dlp backend behind the same [`VideoSource`] contract
//!
//! ```no_run
//! use vidrelay::{Relay, RelayConfig, SelectionMode};
//!
//! # async fn run() -> vidrelay::Result<()> {
//! let relay = Relay::new(RelayConfig::default())?;
//! relay.reload_pool("https://example.com/instances.json").await?;
//! let video = relay.fetch_video("dQw4w9WgXcQ", SelectionMode::Combined).await?;
//! println!("{} via {}", video.record.video.title, video.source);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod mapping;
pub mod pool;
pub mod probe;
pub mod records;
pub mod relay;
pub mod resource;
pub mod source;
pub mod suggest;
pub mod validate;
pub mod ytdlp;

pub use aggregate::MultiSourceAggregator;
pub use config::RelayConfig;
pub use dispatch::{Dispatcher, Timeouts};
pub use error::{RejectReason, Rejection, RelayError, Result, ValidationOutcome};
pub use http::{HttpReply, ProbeReply, ReqwestTransport, Transport};
pub use pool::{
    Candidate, Category, Instance, InstancePool, PoolDefinition, PoolSnapshot, Provider,
    SelectionMode,
};
pub use probe::StreamProbe;
pub use records::{
    ChannelDetail, ChannelPage, Comment, HitKind, LOAD_FAILED, PlaylistItem, SearchHit, Sourced,
    VideoDetail, VideoRecord,
};
pub use relay::Relay;
pub use source::VideoSource;
pub use ytdlp::YtDlpSource;
