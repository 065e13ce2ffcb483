//! Answer matching
//!
//! Turns free-text guesses into title/artist verdicts: locale-aware
//! normalization, layered fuzzy matching and per-track validation.

pub mod engine;
pub mod normalize;
pub mod validate;

pub use engine::{match_strings, MatchOptions, MatchOutcome};
pub use normalize::normalize;
pub use validate::{validate, validate_with, Confidence, ValidationResult};
