//! Match engine
//!
//! Decides whether a normalized guess matches a normalized target and how
//! strong the evidence is. Strategies are evaluated in order and the first
//! one that accepts wins: exact equality, approximate search gated by word
//! overlap, then substring containment as a last resort.
//!
//! Edit distance alone over-penalizes guesses that carry extra correct
//! words; substring containment alone accepts unrelated long strings. The
//! word-overlap gate is what keeps the approximate path honest.

use strsim::{levenshtein, normalized_levenshtein};

/// Word-overlap requirements for targets of one or two words
const SHORT_TARGET_WORD_RATIO: f64 = 0.8;
const SHORT_TARGET_LENGTH_RATIO: f64 = 0.5;

/// Minimum length ratio for the substring containment fallback
const MIN_CONTAINMENT_RATIO: f64 = 0.6;

/// Unrelated short/long word pairs must not partially match
const WORD_LENGTH_CAP: f64 = 1.5;

/// Tunable thresholds for the match engine
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Maximum normalized edit distance accepted by the approximate search
    pub max_distance: f64,
    /// Minimum matched-word ratio for partially overlapping long targets
    pub min_word_ratio: f64,
    /// Minimum length ratio for partially overlapping long targets
    pub min_length_ratio: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_distance: 0.5,
            min_word_ratio: 0.6,
            min_length_ratio: 0.4,
        }
    }
}

/// Verdict and confidence for one guess/target pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    pub matched: bool,
    /// 0.0 to 1.0; 0.0 whenever `matched` is false
    pub confidence: f64,
}

impl MatchOutcome {
    fn hit(confidence: f64) -> Self {
        Self {
            matched: true,
            confidence,
        }
    }

    fn miss() -> Self {
        Self {
            matched: false,
            confidence: 0.0,
        }
    }
}

/// Match a normalized guess against a normalized target with default options.
pub fn match_strings(input: &str, target: &str) -> MatchOutcome {
    match_strings_with(input, target, &MatchOptions::default())
}

/// Match a normalized guess against a normalized target.
pub fn match_strings_with(input: &str, target: &str, options: &MatchOptions) -> MatchOutcome {
    if input.is_empty() || target.is_empty() {
        return MatchOutcome::miss();
    }

    let strategies: [fn(&str, &str, &MatchOptions) -> Option<MatchOutcome>; 3] =
        [exact, approximate, containment];
    for strategy in strategies {
        if let Some(outcome) = strategy(input, target, options) {
            return outcome;
        }
    }
    MatchOutcome::miss()
}

fn exact(input: &str, target: &str, _options: &MatchOptions) -> Option<MatchOutcome> {
    (input == target).then(|| MatchOutcome::hit(1.0))
}

/// Approximate search: location-insensitive edit similarity, accepted only
/// when the word-overlap gate agrees.
fn approximate(input: &str, target: &str, options: &MatchOptions) -> Option<MatchOutcome> {
    let distance = 1.0 - alignment_similarity(input, target);
    if distance <= options.max_distance && passes_word_gate(input, target, options) {
        return Some(MatchOutcome::hit(1.0 - distance));
    }
    None
}

/// One string literally contains the other and their lengths are close.
fn containment(input: &str, target: &str, _options: &MatchOptions) -> Option<MatchOutcome> {
    if input.contains(target) || target.contains(input) {
        let ratio = length_ratio(input, target);
        if ratio >= MIN_CONTAINMENT_RATIO {
            return Some(MatchOutcome::hit(ratio));
        }
    }
    None
}

/// Location-insensitive normalized edit similarity: every target word is
/// aligned to its closest input word, and the per-word similarities are
/// averaged weighted by target word length. Extra input words cost nothing
/// here; the word gate's length ratio is what penalizes padding.
fn alignment_similarity(input: &str, target: &str) -> f64 {
    let input_words: Vec<&str> = input.split_whitespace().collect();
    let mut weighted = 0.0;
    let mut total = 0.0;

    for target_word in target.split_whitespace() {
        let best = input_words
            .iter()
            .map(|input_word| normalized_levenshtein(input_word, target_word))
            .fold(0.0, f64::max);
        let weight = target_word.chars().count() as f64;
        weighted += best * weight;
        total += weight;
    }

    if total == 0.0 {
        return 0.0;
    }
    weighted / total
}

/// Fraction of target words that appear in the input, with tolerance for
/// simple affixes and typos.
pub fn word_match_ratio(input: &str, target: &str) -> f64 {
    let input_words: Vec<&str> = input.split_whitespace().collect();
    let target_words: Vec<&str> = target.split_whitespace().collect();
    if target_words.is_empty() {
        return 0.0;
    }

    let matched = target_words
        .iter()
        .filter(|target_word| {
            input_words
                .iter()
                .any(|input_word| words_match(input_word, target_word))
        })
        .count();

    matched as f64 / target_words.len() as f64
}

fn words_match(input_word: &str, target_word: &str) -> bool {
    if input_word == target_word {
        return true;
    }

    let input_len = input_word.chars().count();
    let target_len = target_word.chars().count();
    let max_len = input_len.max(target_len);
    let min_len = input_len.min(target_len);
    if max_len as f64 > min_len as f64 * WORD_LENGTH_CAP {
        return false;
    }

    // Plurals and simple affixes
    if input_word.contains(target_word) || target_word.contains(input_word) {
        return true;
    }

    // Typos: one edit for short words, two for longer ones
    let max_distance = if target_len <= 6 { 1 } else { 2 };
    levenshtein(input_word, target_word) <= max_distance
}

fn length_ratio(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count() as f64;
    let b_len = b.chars().count() as f64;
    if a_len == 0.0 || b_len == 0.0 {
        return 0.0;
    }
    a_len.min(b_len) / a_len.max(b_len)
}

fn passes_word_gate(input: &str, target: &str, options: &MatchOptions) -> bool {
    let word_ratio = word_match_ratio(input, target);

    // Every target word is present: sufficient regardless of length, so a
    // guess naming both the artist and a short title still scores the title.
    if word_ratio >= 1.0 {
        return true;
    }

    let length_ratio = length_ratio(input, target);
    let target_word_count = target.split_whitespace().count();

    if target_word_count <= 2 {
        word_ratio >= SHORT_TARGET_WORD_RATIO && length_ratio >= SHORT_TARGET_LENGTH_RATIO
    } else {
        word_ratio >= options.min_word_ratio && length_ratio >= options.min_length_ratio
    }
}
