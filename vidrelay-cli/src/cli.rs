use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "vidrelay")]
#[command(about = "Query video metadata through a pool of unreliable API mirrors")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Instance selection: combined, primary-only or secondary-only
    #[arg(long, global = true, default_value = "combined")]
    pub source: String,

    /// Data backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::Mirrors)]
    pub backend: Backend,

    /// Configuration file (defaults to <config dir>/vidrelay/config.toml)
    #[arg(short, long, global = true, env = "VIDRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the instance-definition document URL
    #[arg(long, global = true)]
    pub definition_url: Option<String>,

    /// Probe media URLs before accepting a video response
    #[arg(long, global = true)]
    pub stream_validation: bool,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show video details and related videos
    Video {
        /// Video id
        id: String,

        /// Fetch from every instance for comparison
        #[arg(long)]
        all: bool,
    },

    /// Search videos, channels and playlists
    Search {
        query: String,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Show a channel and its recent uploads
    Channel { id: String },

    /// List playlist entries
    Playlist {
        id: String,

        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// List comments of a video
    Comments {
        /// Video id
        id: String,

        /// Collect comments from every instance
        #[arg(long)]
        all: bool,
    },

    /// Search-box suggestions for a keyword
    Suggest { keyword: String },

    /// Show the instance pool
    Pool {
        /// Reload from the definition document first
        #[arg(long)]
        reload: bool,

        /// Flip the stream validation gate before printing
        #[arg(long)]
        toggle_stream_validation: bool,
    },

    /// Move the head instance of a category to the end of its list
    Rotate {
        /// video, search, channel, comments or playlist
        category: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// API mirror pool
    Mirrors,
    /// Local yt-dlp binary
    Ytdlp,
}
