//! Round state machine
//!
//! Owns the current track and the cumulative title/artist found flags,
//! folds validated guesses into them, generates hints and drives track
//! advancement through the provider. The session coordinator guarantees
//! exclusive access for the duration of each operation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{GameError, GameResult};
use crate::matching::{validate_with, MatchOptions, ValidationResult};
use crate::provider::TrackProvider;

/// The answer target for one round
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub title: String,
    /// Display names, catalog order
    pub artists: Vec<String>,
}

/// Character substituted for every letter and digit in a hint
pub const MASK_CHAR: char = '*';

/// Masked (or revealed) title and artists for the hint broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct HintReveal {
    pub title: String,
    pub artists: Vec<String>,
}

/// Result of folding one guess into the round
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    /// Per-guess verdict, not the cumulative round state
    pub result: ValidationResult,
    /// Both facts have now been found; the round should advance
    pub round_complete: bool,
    /// Revealed once the title has been cumulatively found
    pub title: Option<String>,
    /// Revealed once an artist has been cumulatively found
    pub artists: Option<Vec<String>>,
}

pub struct Round {
    provider: Arc<dyn TrackProvider>,
    options: MatchOptions,
    settle_delay: Duration,
    track: Option<Track>,
    title_found: bool,
    artist_found: bool,
}

impl Round {
    pub fn new(provider: Arc<dyn TrackProvider>, settle_delay: Duration) -> Self {
        Self::with_options(provider, settle_delay, MatchOptions::default())
    }

    pub fn with_options(
        provider: Arc<dyn TrackProvider>,
        settle_delay: Duration,
        options: MatchOptions,
    ) -> Self {
        Self {
            provider,
            options,
            settle_delay,
            track: None,
            title_found: false,
            artist_found: false,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn title_found(&self) -> bool {
        self.title_found
    }

    pub fn artist_found(&self) -> bool {
        self.artist_found
    }

    /// Validate a guess and fold it into the round's cumulative flags.
    ///
    /// The flags are monotonic within a round: once a fact is found it
    /// stays found until the next track resets them.
    pub fn on_answer(&mut self, guess: &str) -> GameResult<AnswerOutcome> {
        let track = self.track.as_ref().ok_or(GameError::NoActiveRound)?;

        let result = validate_with(guess, track, &self.options);
        self.title_found |= result.title_match;
        self.artist_found |= result.artist_match;

        Ok(AnswerOutcome {
            round_complete: self.title_found && self.artist_found,
            title: self.title_found.then(|| track.title.clone()),
            artists: self.artist_found.then(|| track.artists.clone()),
            result,
        })
    }

    /// Human-readable "Artist(s) - Title" for the current track.
    pub fn reveal(&self) -> Option<String> {
        self.track
            .as_ref()
            .map(|t| format!("{} - {}", t.artists.join(", "), t.title))
    }

    /// Obfuscated reveal: length and word boundaries leak, characters do
    /// not. Facts already found are shown in clear.
    pub fn hint(&self) -> GameResult<HintReveal> {
        let track = self.track.as_ref().ok_or(GameError::NoActiveRound)?;
        Ok(HintReveal {
            title: if self.title_found {
                track.title.clone()
            } else {
                mask(&track.title)
            },
            artists: track
                .artists
                .iter()
                .map(|a| {
                    if self.artist_found {
                        a.clone()
                    } else {
                        mask(a)
                    }
                })
                .collect(),
        })
    }

    /// Move to the next track.
    ///
    /// With `skip`, asks the provider to jump ahead, then waits the settle
    /// delay before trusting its "now playing" answer. A failed provider
    /// call leaves the previous track current; a provider that reports no
    /// track at all clears the round instead of keeping a stale target.
    pub async fn advance(&mut self, skip: bool) -> GameResult<()> {
        if skip {
            self.provider
                .skip_to_next()
                .await
                .map_err(|e| GameError::Provider(e.to_string()))?;
            tokio::time::sleep(self.settle_delay).await;
        }

        match self.provider.current_track().await {
            Ok(Some(track)) => {
                info!("🎵 Current track: {} by {}", track.title, track.artists.join(", "));
                self.track = Some(track);
                self.title_found = false;
                self.artist_found = false;
                Ok(())
            }
            Ok(None) => {
                warn!("Provider reported no current track");
                self.track = None;
                self.title_found = false;
                self.artist_found = false;
                Err(GameError::NoCurrentTrack)
            }
            Err(e) => Err(GameError::Provider(e.to_string())),
        }
    }
}

fn mask(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { MASK_CHAR } else { c })
        .collect()
}
