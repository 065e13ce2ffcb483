//! Blindbeat Error Types
//!
//! Centralized error handling for the game engine.

use thiserror::Error;

/// Central error type for blindbeat
#[derive(Error, Debug)]
pub enum GameError {
    /// The provider reported no currently playing track.
    #[error("no track is currently playing")]
    NoCurrentTrack,

    /// A skip or fetch call against the provider failed.
    #[error("track provider error: {0}")]
    Provider(String),

    /// An operation that requires an active round was called without one.
    #[error("no active round")]
    NoActiveRound,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for blindbeat operations
pub type GameResult<T> = Result<T, GameError>;
