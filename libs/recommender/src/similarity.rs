//! Pairwise text similarity between an interest string and an event title
//!
//! Each call builds a two-document tf-idf space from its inputs alone:
//! the vocabulary is the union of both token sets and the idf of a term only
//! depends on whether it occurs in one or both strings. There are no corpus
//! wide statistics, so the weight of a word changes from pair to pair.
//!
//! Tokens are lowercased runs of at least two word characters; single
//! letters and punctuation never count.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::debug;

/// Number of documents in every comparison
const DOCUMENTS: f64 = 2.0;

fn token_pattern() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TOKEN_REGEX.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("Failed to compile token regex"))
}

/// Term counts of a text
pub fn term_counts(text: &str) -> BTreeMap<String, usize> {
    let lowered = text.to_lowercase();
    let mut counts = BTreeMap::new();
    for token in token_pattern().find_iter(&lowered) {
        *counts.entry(token.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Smoothed inverse document frequency for a term seen in `df` of the two documents
fn idf(df: usize) -> f64 {
    ((1.0 + DOCUMENTS) / (1.0 + df as f64)).ln() + 1.0
}

/// Cosine similarity of the tf-idf vectors of `a` and `b`, in `[0, 1]`
///
/// Returns 0 when either text has no tokens or the two share none, and
/// exactly 1 when both have the same token counts. The result is symmetric.
pub fn score(a: &str, b: &str) -> f64 {
    let counts_a = term_counts(a);
    let counts_b = term_counts(b);

    let similarity = cosine(&counts_a, &counts_b);
    debug!(left = a, right = b, similarity, "Scored text pair");
    similarity
}

fn cosine(counts_a: &BTreeMap<String, usize>, counts_b: &BTreeMap<String, usize>) -> f64 {
    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }
    if counts_a == counts_b {
        return 1.0;
    }
    if !counts_a.keys().any(|term| counts_b.contains_key(term)) {
        return 0.0;
    }

    let vocabulary: BTreeSet<&String> = counts_a.keys().chain(counts_b.keys()).collect();

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for term in vocabulary {
        let tf_a = counts_a.get(term).copied().unwrap_or(0) as f64;
        let tf_b = counts_b.get(term).copied().unwrap_or(0) as f64;
        let df = usize::from(tf_a > 0.0) + usize::from(tf_b > 0.0);
        let weight = idf(df);

        let w_a = tf_a * weight;
        let w_b = tf_b * weight;
        dot += w_a * w_b;
        norm_a += w_a * w_a;
        norm_b += w_b * w_b;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}
