//! Keyword-count sentiment classification.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::{emojis, words};

/// Sentiment assigned to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn all() -> &'static [SentimentLabel] {
        &[
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
        ]
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        })
    }
}

/// Keyword hits per label for one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl KeywordHits {
    /// Label with the strictly highest count; ties and zero hits are neutral.
    pub fn label(self) -> SentimentLabel {
        if self.positive > self.negative && self.positive > self.neutral {
            SentimentLabel::Positive
        } else if self.negative > self.positive && self.negative > self.neutral {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Counts word and emoji hits of `text` against the three keyword sets.
pub fn count_hits(
    text: &str,
    positive: &BTreeSet<String>,
    negative: &BTreeSet<String>,
    neutral: &BTreeSet<String>,
) -> KeywordHits {
    let mut hits = KeywordHits::default();
    let mut tally = |token: &str| {
        if positive.contains(token) {
            hits.positive += 1;
        }
        if negative.contains(token) {
            hits.negative += 1;
        }
        if neutral.contains(token) {
            hits.neutral += 1;
        }
    };

    for word in words(text) {
        tally(&word);
    }
    let mut buf = [0u8; 4];
    for emoji in emojis(text) {
        tally(emoji.encode_utf8(&mut buf));
    }
    hits
}

/// Aggregate sentiment over a set of messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub total_messages: usize,
    pub counts: BTreeMap<SentimentLabel, usize>,
    /// `(positive - negative) / total`, 0 when there are no messages.
    pub average_score: f64,
}

impl Default for SentimentDistribution {
    fn default() -> Self {
        Self::from_labels(std::iter::empty())
    }
}

impl SentimentDistribution {
    /// Builds the distribution from per-message labels.
    pub fn from_labels(labels: impl IntoIterator<Item = SentimentLabel>) -> Self {
        let mut counts: BTreeMap<SentimentLabel, usize> =
            SentimentLabel::all().iter().map(|&l| (l, 0)).collect();
        let mut total = 0usize;
        for label in labels {
            *counts.entry(label).or_insert(0) += 1;
            total += 1;
        }

        let average_score = if total == 0 {
            0.0
        } else {
            let positive = counts[&SentimentLabel::Positive] as f64;
            let negative = counts[&SentimentLabel::Negative] as f64;
            (positive - negative) / total as f64
        };

        Self {
            total_messages: total,
            counts,
            average_score,
        }
    }

    /// Count for one label.
    pub fn count(&self, label: SentimentLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_label_rules() {
        let hits = |positive, negative, neutral| KeywordHits {
            positive,
            negative,
            neutral,
        };
        assert_eq!(hits(2, 1, 0).label(), SentimentLabel::Positive);
        assert_eq!(hits(0, 3, 1).label(), SentimentLabel::Negative);
        assert_eq!(hits(1, 1, 0).label(), SentimentLabel::Neutral);
        assert_eq!(hits(0, 0, 0).label(), SentimentLabel::Neutral);
        assert_eq!(hits(2, 0, 2).label(), SentimentLabel::Neutral);
    }

    #[test]
    fn test_count_hits_words_and_emoji() {
        let hits = count_hits(
            "Love it!! 😂 but so tired 😢",
            &set(&["love", "😂"]),
            &set(&["tired", "😢"]),
            &set(&["ok"]),
        );
        assert_eq!(
            hits,
            KeywordHits {
                positive: 2,
                negative: 2,
                neutral: 0
            }
        );
        assert_eq!(hits.label(), SentimentLabel::Neutral);
    }

    #[test]
    fn test_distribution_average() {
        let dist = SentimentDistribution::from_labels([
            SentimentLabel::Positive,
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
        ]);
        assert_eq!(dist.total_messages, 4);
        assert_eq!(dist.count(SentimentLabel::Positive), 2);
        assert!((dist.average_score - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_distribution() {
        let dist = SentimentDistribution::default();
        assert_eq!(dist.total_messages, 0);
        assert_eq!(dist.average_score, 0.0);
        assert_eq!(dist.count(SentimentLabel::Neutral), 0);
    }

    #[test]
    fn test_label_serialization() {
        let json = serde_json::to_string(&SentimentLabel::Positive).unwrap();
        assert_eq!(json, r#""positive""#);
    }
}
