//! Phrase-frequency extraction: idiom patterns plus word n-grams.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::text::{emojis, words};

/// How often a phrase appears across a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseFrequency {
    /// Lowercased phrase text.
    pub phrase: String,
    pub count: usize,
    /// Emoji seen in messages containing this phrase.
    pub emoji_hints: BTreeSet<String>,
}

/// Accumulates phrase counts, remembering first-seen order for tie-breaks.
#[derive(Debug, Default)]
pub struct PhraseCounter {
    index: HashMap<String, usize>,
    entries: Vec<PhraseFrequency>,
}

impl PhraseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments `phrase` and merges `hints` into its emoji set.
    pub fn record(&mut self, phrase: &str, hints: &BTreeSet<String>) {
        let slot = match self.index.get(phrase) {
            Some(&i) => i,
            None => {
                self.entries.push(PhraseFrequency {
                    phrase: phrase.to_string(),
                    count: 0,
                    emoji_hints: BTreeSet::new(),
                });
                self.index.insert(phrase.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[slot];
        entry.count += 1;
        entry.emoji_hints.extend(hints.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorts by count descending (stable, so ties keep first-seen order)
    /// and keeps at most `max` entries.
    pub fn into_ranked(self, max: usize) -> Vec<PhraseFrequency> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(max);
        entries
    }
}

/// Feeds one message body into `counter`.
///
/// Idioms are matched on the lowercased text; n-grams are built from the
/// word tokens left after stop-word removal.
pub fn collect_phrases(
    counter: &mut PhraseCounter,
    text: &str,
    idioms: &[Regex],
    stop_words: &BTreeSet<String>,
    ngram_sizes: &[usize],
) {
    let hints: BTreeSet<String> = emojis(text).map(String::from).collect();
    let lowered = text.to_lowercase();

    // Idiom hits in this message; an equal n-gram window is the same span.
    let mut idiom_hits: HashMap<String, usize> = HashMap::new();
    for idiom in idioms {
        for found in idiom.find_iter(&lowered) {
            let phrase = found.as_str().trim();
            counter.record(phrase, &hints);
            *idiom_hits.entry(phrase.to_string()).or_insert(0) += 1;
        }
    }

    let tokens: Vec<String> = words(text)
        .into_iter()
        .filter(|w| !stop_words.contains(w))
        .collect();

    for &n in ngram_sizes {
        if n == 0 || tokens.len() < n {
            continue;
        }
        for window in tokens.windows(n) {
            let phrase = window.join(" ");
            if let Some(left) = idiom_hits.get_mut(&phrase).filter(|left| **left > 0) {
                *left -= 1;
                continue;
            }
            counter.record(&phrase, &hints);
        }
    }
}
