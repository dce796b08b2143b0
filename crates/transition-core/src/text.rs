//! Name normalization and text similarity primitives.
//!
//! Two measures live here:
//! - [`token_set_similarity`]: order-independent token-set ratio used by the
//!   vendor name strategies.
//! - [`tf_cosine`]: term-frequency cosine used by the patent topic and text
//!   similarity signals.
//!
//! Both are pure and deterministic. Term maps are `BTreeMap`s so float sums
//! always accumulate in the same order.

use std::collections::{BTreeMap, BTreeSet};

use strsim::normalized_levenshtein;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "into", "is",
    "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will", "with",
];

/// Normalize a company name: uppercase, keep only `[A-Z0-9&-/ ]`, collapse
/// runs of whitespace, trim.
pub fn normalize_name(raw: &str) -> String {
    let filtered: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '&' | '-' | '/' | ' '))
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn join_tokens(head: &str, tail: &[&str]) -> String {
    let tail = tail.join(" ");
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail,
        (false, true) => head.to_string(),
        (false, false) => format!("{head} {tail}"),
    }
}

/// Token-set similarity of two already-normalized names, in `[0, 1]`.
///
/// Tokens are split on whitespace and deduplicated. When the names share at
/// least one token and one token set contains the other, the result is 1.0.
/// Otherwise the result is the best normalized Levenshtein similarity among
/// the sorted intersection and the intersection extended with each side's
/// remainder.
/// Empty input on either side yields 0.0.
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let shared: Vec<&str> = ta.intersection(&tb).copied().collect();
    let only_a: Vec<&str> = ta.difference(&tb).copied().collect();
    let only_b: Vec<&str> = tb.difference(&ta).copied().collect();

    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 1.0;
    }

    let sect = shared.join(" ");
    let with_a = join_tokens(&sect, &only_a);
    let with_b = join_tokens(&sect, &only_b);

    let mut best = normalized_levenshtein(&with_a, &with_b);
    if !sect.is_empty() {
        best = best
            .max(normalized_levenshtein(&sect, &with_a))
            .max(normalized_levenshtein(&sect, &with_b));
    }
    best
}

/// Lowercase alphanumeric terms, stopwords and single characters removed.
pub fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

fn term_frequencies(text: &str) -> BTreeMap<String, f64> {
    let mut tf = BTreeMap::new();
    for term in terms(text) {
        *tf.entry(term).or_insert(0.0) += 1.0;
    }
    tf
}

/// Term-frequency cosine similarity in `[0, 1]`. Empty text on either side
/// yields 0.0.
pub fn tf_cosine(a: &str, b: &str) -> f64 {
    let ta = term_frequencies(a);
    let tb = term_frequencies(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let dot: f64 = ta
        .iter()
        .filter_map(|(term, wa)| tb.get(term).map(|wb| wa * wb))
        .sum();
    let norm_a = ta.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = tb.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}
