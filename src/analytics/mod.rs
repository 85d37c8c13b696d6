//! Conversational analytics over parsed messages.
//!
//! Three independent passes:
//! - phrase frequencies (idiom patterns and n-grams) over text messages
//! - keyword sentiment over text messages
//! - communication patterns over every message
//!
//! All passes are pure functions of their input, so analyzing the same
//! messages twice yields identical reports.
//!
//! # Example
//!
//! ```rust
//! use chatsift::analytics::AnalyticsProcessor;
//! use chatsift::Message;
//! use chrono::Utc;
//!
//! let messages = vec![
//!     Message::new("A", Utc::now(), "how are you doing?"),
//!     Message::new("B", Utc::now(), "how are you feeling?"),
//! ];
//! let report = AnalyticsProcessor::new().analyze(&messages);
//! assert!(report.phrases.iter().any(|p| p.phrase.contains("how are you") && p.count >= 2));
//! ```

mod patterns;
mod phrases;
mod sentiment;
mod text;

pub use patterns::{CommunicationPatterns, SenderStats};
pub use phrases::{PhraseCounter, PhraseFrequency, collect_phrases};
pub use sentiment::{KeywordHits, SentimentDistribution, SentimentLabel, count_hits};
pub use text::{emojis, is_emoji, words};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::message::Message;

/// Output of [`AnalyticsProcessor::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub phrases: Vec<PhraseFrequency>,
    pub sentiment: SentimentDistribution,
    pub patterns: CommunicationPatterns,
}

/// Runs the analytics passes with a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct AnalyticsProcessor {
    config: AnalyticsConfig,
    idioms: Vec<Regex>,
}

impl Default for AnalyticsProcessor {
    fn default() -> Self {
        Self::with_config(AnalyticsConfig::default())
    }
}

impl AnalyticsProcessor {
    /// Creates a processor with the default vocabularies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a processor with custom configuration.
    ///
    /// Idiom patterns that fail to compile are logged and skipped.
    pub fn with_config(config: AnalyticsConfig) -> Self {
        let idioms = config
            .idiom_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Skipping invalid idiom pattern");
                    None
                }
            })
            .collect();
        Self { config, idioms }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Runs all three passes.
    pub fn analyze(&self, messages: &[Message]) -> AnalyticsReport {
        let report = AnalyticsReport {
            phrases: self.extract_phrases(messages),
            sentiment: self.sentiment_distribution(messages),
            patterns: CommunicationPatterns::from_messages(messages),
        };
        tracing::debug!(
            phrases = report.phrases.len(),
            rated = report.sentiment.total_messages,
            senders = report.patterns.senders.len(),
            "Analytics complete"
        );
        report
    }

    /// Top phrases across text messages, by count descending.
    pub fn extract_phrases(&self, messages: &[Message]) -> Vec<PhraseFrequency> {
        let mut counter = PhraseCounter::new();
        for message in messages.iter().filter(|m| m.is_text()) {
            collect_phrases(
                &mut counter,
                &message.text,
                &self.idioms,
                &self.config.stop_words,
                &self.config.ngram_sizes,
            );
        }
        counter.into_ranked(self.config.max_phrases)
    }

    /// Labels a single message body.
    pub fn classify_sentiment(&self, text: &str) -> SentimentLabel {
        count_hits(
            text,
            &self.config.positive_keywords,
            &self.config.negative_keywords,
            &self.config.neutral_keywords,
        )
        .label()
    }

    /// Sentiment distribution across text messages.
    pub fn sentiment_distribution(&self, messages: &[Message]) -> SentimentDistribution {
        SentimentDistribution::from_labels(
            messages
                .iter()
                .filter(|m| m.is_text())
                .map(|m| self.classify_sentiment(&m.text)),
        )
    }
}
