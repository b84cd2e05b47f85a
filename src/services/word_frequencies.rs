//! Word-frequency counts for the survey word-cloud chart.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::record::RawRecord;

// Portuguese function words that would otherwise dominate every cloud.
// Tokens shorter than three characters are dropped before this check.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "que", "com", "por", "para", "pela", "pelo", "das", "dos", "uma", "nas", "nos", "aos",
        "sua", "seu", "mais", "como", "mas", "não", "nao", "ser", "ter", "são", "sao", "foi",
        "tem", "pois", "porque", "quando", "meu", "minha", "este", "esta", "esse", "essa",
    ]
    .into_iter()
    .collect()
});

/// One word of the cloud and how often it appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Count word occurrences in a free-text column across all records.
///
/// Text is lowercased and split on non-alphanumeric boundaries; tokens
/// shorter than three characters and Portuguese stopwords are dropped.
/// The result is sorted by descending count (ties alphabetically) and
/// capped at `limit` entries.
pub fn word_frequencies(records: &[RawRecord], column: &str, limit: usize) -> Vec<WordCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(text) = record.get(column) else {
            continue;
        };
        for token in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if token.chars().count() < 3 || STOPWORDS.contains(token) {
                continue;
            }
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }

    let mut frequencies: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    frequencies.truncate(limit);
    frequencies
}
