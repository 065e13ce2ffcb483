//! Text normalization
//!
//! Canonicalizes catalog titles and user guesses into a comparable token
//! form before any matching happens.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Articles in the game's supported languages, removed as whole tokens
    static ref STOP_WORDS: Regex =
        Regex::new(r"\b(le|la|les|un|une|des|the|a|an)\b").expect("stop-word regex");
}

/// Normalize text for answer comparison.
///
/// Folds, in order: lowercase; NFD decomposition with combining marks
/// stripped; apostrophe/hyphen/slash variants to spaces; article stop
/// words; remaining punctuation; whitespace runs. Idempotent.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\'' | '\u{2019}' | '\u{2018}' | '`' | '-' | '/' => ' ',
            _ => c,
        })
        .collect();

    let without_articles = STOP_WORDS.replace_all(&folded, " ");

    without_articles
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
