//! Conversation history types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;

/// One user/assistant exchange. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Unique within a session
    pub id: String,
    /// Sanitized user input
    pub user: String,
    pub assistant: AnalysisResult,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    /// Create an entry with an id derived from the creation time and a
    /// per-session sequence number
    pub fn new(seq: u64, user: impl Into<String>, assistant: AnalysisResult) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("conv_{}_{:04}", timestamp.format("%Y%m%d_%H%M%S"), seq),
            user: user.into(),
            assistant,
            timestamp,
        }
    }
}

/// Order of a history snapshot
///
/// History is stored oldest-first (append order); display usually wants
/// newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

impl HistoryOrder {
    /// Parse `oldest` / `newest` (and the snake_case names)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "oldest" | "oldest_first" | "asc" => Some(Self::OldestFirst),
            "newest" | "newest_first" | "desc" => Some(Self::NewestFirst),
            _ => None,
        }
    }
}

/// Aggregate statistics over a history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_conversations: usize,
    pub total_user_characters: usize,
    /// Rounded to two decimals
    pub average_message_length: f64,
    pub last_conversation: Option<DateTime<Utc>>,
}

impl ConversationStats {
    pub fn from_entries(entries: &[ConversationEntry]) -> Self {
        if entries.is_empty() {
            return Self {
                total_conversations: 0,
                total_user_characters: 0,
                average_message_length: 0.0,
                last_conversation: None,
            };
        }

        let total_conversations = entries.len();
        let total_user_characters: usize = entries.iter().map(|e| e.user.chars().count()).sum();
        let average = total_user_characters as f64 / total_conversations as f64;

        Self {
            total_conversations,
            total_user_characters,
            average_message_length: (average * 100.0).round() / 100.0,
            last_conversation: entries.last().map(|e| e.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(seq: u64, user: &str) -> ConversationEntry {
        ConversationEntry::new(seq, user, AnalysisResult::error(user, "x"))
    }

    #[test]
    fn test_entry_id_format() {
        let e = entry(7, "hello");
        assert!(e.id.starts_with("conv_"));
        assert!(e.id.ends_with("_0007"));
        assert_ne!(e.id, entry(8, "hello").id);
    }

    #[test]
    fn test_history_order_parse() {
        assert_eq!(HistoryOrder::parse("newest"), Some(HistoryOrder::NewestFirst));
        assert_eq!(HistoryOrder::parse("OLDEST"), Some(HistoryOrder::OldestFirst));
        assert_eq!(HistoryOrder::parse("sideways"), None);
        assert_eq!(HistoryOrder::default(), HistoryOrder::OldestFirst);
    }

    #[test]
    fn test_stats_empty() {
        let stats = ConversationStats::from_entries(&[]);
        assert_eq!(stats.total_conversations, 0);
        assert_eq!(stats.average_message_length, 0.0);
        assert!(stats.last_conversation.is_none());
    }

    #[test]
    fn test_stats_average_rounded() {
        let entries = vec![entry(1, "abc"), entry(2, "abcd"), entry(3, "abcd")];
        let stats = ConversationStats::from_entries(&entries);
        assert_eq!(stats.total_conversations, 3);
        assert_eq!(stats.total_user_characters, 11);
        assert_eq!(stats.average_message_length, 3.67);
        assert_eq!(stats.last_conversation, Some(entries[2].timestamp));
    }
}
