//! Near-duplicate detection via TF-IDF cosine similarity.
//!
//! The vocabulary and document frequencies are rebuilt from the candidate
//! plus its comparison set on every call; nothing is persisted between calls.
//! Weighting: raw term counts, smoothed idf `ln((1 + n) / (1 + df)) + 1`,
//! L2-normalized rows. Tokens are runs of two or more word characters.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::clean_text;

/// Similarity above which two descriptions count as the same story.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

type SparseVector = HashMap<usize, f64>;

/// Highest cosine similarity between `candidate` and any text in `existing`.
///
/// All texts are normalized with [`clean_text`] first. Returns `None` when
/// `existing` is empty. A document with no tokens has similarity `0.0` to
/// everything.
pub fn max_similarity<'a, I>(candidate: &str, existing: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut corpus = vec![clean_text(candidate)];
    corpus.extend(existing.into_iter().map(clean_text));
    if corpus.len() < 2 {
        return None;
    }

    let vectors = tfidf_vectors(&corpus);
    let (first, rest) = vectors.split_first()?;
    Some(
        rest.iter()
            .map(|other| dot(first, other))
            .fold(0.0_f64, f64::max),
    )
}

/// Whether `candidate` duplicates any of `existing` at `threshold`.
///
/// An empty comparison set never produces a duplicate.
pub fn is_duplicate<'a, I>(candidate: &str, existing: I, threshold: f64) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    max_similarity(candidate, existing).is_some_and(|score| score > threshold)
}

fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// L2-normalized TF-IDF rows for `docs`, one per document.
fn tfidf_vectors(docs: &[String]) -> Vec<SparseVector> {
    let tokenized: Vec<Vec<&str>> = docs.iter().map(|d| tokenize(d)).collect();

    let mut vocabulary: HashMap<&str, usize> = HashMap::new();
    let mut doc_freq: Vec<usize> = Vec::new();
    let mut counts: Vec<SparseVector> = Vec::with_capacity(tokenized.len());

    for tokens in &tokenized {
        let mut row: SparseVector = HashMap::new();
        for &token in tokens {
            let next = vocabulary.len();
            let idx = *vocabulary.entry(token).or_insert(next);
            if idx == doc_freq.len() {
                doc_freq.push(0);
            }
            *row.entry(idx).or_insert(0.0) += 1.0;
        }
        for idx in row.keys() {
            doc_freq[*idx] += 1;
        }
        counts.push(row);
    }

    #[allow(clippy::cast_precision_loss)]
    let n_docs = docs.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let idf: Vec<f64> = doc_freq
        .iter()
        .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    counts
        .into_iter()
        .map(|mut row| {
            for (idx, weight) in &mut row {
                *weight *= idf[*idx];
            }
            let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for weight in row.values_mut() {
                    *weight /= norm;
                }
            }
            row
        })
        .collect()
}

fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(idx, w)| large.get(idx).map(|other| w * other))
        .sum()
}
