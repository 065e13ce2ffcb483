//! Validation service
//!
//! Applies the match engine to a track's title and artists for one guess.
//! Pure function of its inputs, so the verdict logic stays unit-testable
//! away from session concurrency.

use serde::{Deserialize, Serialize};

use crate::matching::engine::{match_strings_with, word_match_ratio, MatchOptions};
use crate::matching::normalize::normalize;
use crate::round::Track;

/// Match strength per answer half
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub title: f64,
    pub artist: f64,
}

/// Normalized strings and per-criterion ratios, kept for observability
#[derive(Debug, Clone)]
pub struct ValidationTrace {
    pub normalized_input: String,
    pub normalized_title: String,
    pub normalized_artists: Vec<String>,
    pub title_word_ratio: f64,
    pub artist_word_ratios: Vec<f64>,
}

/// Verdict for one (guess, track) pair; never mutated after creation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub title_match: bool,
    pub artist_match: bool,
    pub confidence: Confidence,
    pub trace: ValidationTrace,
}

/// Validate a guess against a track with default thresholds.
pub fn validate(guess: &str, track: &Track) -> ValidationResult {
    validate_with(guess, track, &MatchOptions::default())
}

/// Validate a guess against a track.
///
/// The title is checked once; artists are checked in catalog order and the
/// loop stops at the first match (any one artist is sufficient). Artist
/// confidence is the maximum seen up to the stopping point.
pub fn validate_with(guess: &str, track: &Track, options: &MatchOptions) -> ValidationResult {
    let normalized_input = normalize(guess);
    let normalized_title = normalize(&track.title);
    let normalized_artists: Vec<String> = track.artists.iter().map(|a| normalize(a)).collect();

    let title = match_strings_with(&normalized_input, &normalized_title, options);

    let mut artist_match = false;
    let mut artist_confidence: f64 = 0.0;
    for artist in &normalized_artists {
        let outcome = match_strings_with(&normalized_input, artist, options);
        artist_confidence = artist_confidence.max(outcome.confidence);
        if outcome.matched {
            artist_match = true;
            break;
        }
    }

    let trace = ValidationTrace {
        title_word_ratio: word_match_ratio(&normalized_input, &normalized_title),
        artist_word_ratios: normalized_artists
            .iter()
            .map(|a| word_match_ratio(&normalized_input, a))
            .collect(),
        normalized_input,
        normalized_title,
        normalized_artists,
    };

    ValidationResult {
        title_match: title.matched,
        artist_match,
        confidence: Confidence {
            title: title.confidence,
            artist: artist_confidence,
        },
        trace,
    }
}
