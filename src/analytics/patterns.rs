//! Communication pattern statistics: who talks, when, and with what.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageType};

/// Per-sender message and word counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderStats {
    pub sender: String,
    pub message_count: usize,
    pub word_count: usize,
}

impl SenderStats {
    /// `word_count / message_count`, 0 when there are no messages.
    pub fn average_words_per_message(&self) -> f64 {
        if self.message_count == 0 {
            0.0
        } else {
            self.word_count as f64 / self.message_count as f64
        }
    }
}

/// Temporal and per-sender activity over every message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationPatterns {
    /// Senders in order of first appearance. System notices are excluded.
    pub senders: Vec<SenderStats>,
    /// Messages per hour of day, 0..=23.
    pub hourly: [usize; 24],
    /// Messages per weekday, Monday = 0.
    pub weekday: [usize; 7],
    pub type_counts: BTreeMap<MessageType, usize>,
}

impl Default for CommunicationPatterns {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
            hourly: [0; 24],
            weekday: [0; 7],
            type_counts: BTreeMap::new(),
        }
    }
}

impl CommunicationPatterns {
    /// Accumulates statistics over `messages`.
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut patterns = Self::default();
        let mut sender_index: HashMap<&str, usize> = HashMap::new();

        for message in messages {
            patterns.hourly[message.timestamp.hour() as usize] += 1;
            patterns.weekday[message.timestamp.weekday().num_days_from_monday() as usize] += 1;
            *patterns.type_counts.entry(message.message_type).or_insert(0) += 1;

            if message.message_type == MessageType::System {
                continue;
            }
            let slot = *sender_index.entry(message.sender.as_str()).or_insert_with(|| {
                patterns.senders.push(SenderStats {
                    sender: message.sender.clone(),
                    message_count: 0,
                    word_count: 0,
                });
                patterns.senders.len() - 1
            });
            let stats = &mut patterns.senders[slot];
            stats.message_count += 1;
            stats.word_count += message.word_count();
        }

        patterns
    }

    /// Hour of day with the most messages, or `None` for no messages.
    pub fn busiest_hour(&self) -> Option<usize> {
        busiest(&self.hourly)
    }

    /// Weekday (Monday = 0) with the most messages.
    pub fn busiest_weekday(&self) -> Option<usize> {
        busiest(&self.weekday)
    }
}

fn busiest(buckets: &[usize]) -> Option<usize> {
    buckets
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        // Earliest bucket wins ties.
        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(sender: &str, day: u32, hour: u32, text: &str) -> Message {
        Message::new(sender, Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap(), text)
    }

    #[test]
    fn test_sender_stats_first_seen_order() {
        let messages = vec![
            msg("Bob", 1, 9, "one two three"),
            msg("Alice", 1, 10, "hi"),
            msg("Bob", 2, 9, "four"),
        ];
        let patterns = CommunicationPatterns::from_messages(&messages);

        assert_eq!(patterns.senders[0].sender, "Bob");
        assert_eq!(patterns.senders[0].message_count, 2);
        assert_eq!(patterns.senders[0].word_count, 4);
        assert!((patterns.senders[0].average_words_per_message() - 2.0).abs() < f64::EPSILON);
        assert_eq!(patterns.senders[1].sender, "Alice");
    }

    #[test]
    fn test_histograms_and_types() {
        let messages = vec![
            msg("A", 1, 9, "x"), // 2024-01-01 is a Monday
            msg("A", 1, 9, "y").with_type(MessageType::Image),
            msg("System", 2, 23, "A left").with_type(MessageType::System),
        ];
        let patterns = CommunicationPatterns::from_messages(&messages);

        assert_eq!(patterns.hourly[9], 2);
        assert_eq!(patterns.hourly[23], 1);
        assert_eq!(patterns.weekday[0], 2);
        assert_eq!(patterns.weekday[1], 1);
        assert_eq!(patterns.type_counts[&MessageType::Image], 1);
        assert_eq!(patterns.type_counts[&MessageType::System], 1);
        assert_eq!(patterns.senders.len(), 1);
        assert_eq!(patterns.busiest_hour(), Some(9));
        assert_eq!(patterns.busiest_weekday(), Some(0));
    }

    #[test]
    fn test_empty() {
        let patterns = CommunicationPatterns::from_messages(&[]);
        assert!(patterns.senders.is_empty());
        assert_eq!(patterns.busiest_hour(), None);
    }

    #[test]
    fn test_zero_message_average() {
        let stats = SenderStats {
            sender: "x".into(),
            message_count: 0,
            word_count: 0,
        };
        assert_eq!(stats.average_words_per_message(), 0.0);
    }
}
