//! Track providers
//!
//! The external music service behind each round. The engine only needs two
//! capabilities: jump to the next track, and report what is playing now.

use anyhow::Result;
use async_trait::async_trait;

use crate::round::Track;

#[async_trait]
pub trait TrackProvider: Send + Sync {
    /// Ask the provider to jump to the next track
    async fn skip_to_next(&self) -> Result<()>;

    /// Return the currently playing track, if any
    async fn current_track(&self) -> Result<Option<Track>>;
}

pub mod spotify;

pub use spotify::SpotifyProvider;
