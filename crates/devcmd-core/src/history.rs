//! Bounded, newest-first history of command/response pairs.

use std::collections::VecDeque;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::HistoryRecord;

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 50;

/// Technology label used when it is not known.
pub const UNKNOWN_TECHNOLOGY: &str = "Unknown";

/// Message shown by an empty history panel.
pub const EMPTY_HISTORY_MESSAGE: &str = "No command history yet";

/// One past interaction. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub response: String,
    pub technology: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            command: record.user_input,
            response: record.ai_response,
            technology: UNKNOWN_TECHNOLOGY.to_string(),
            timestamp: record.timestamp,
        }
    }
}

/// A rendered history panel item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItemView {
    pub technology: String,
    /// `HH:MM` in local time, or the raw timestamp when it does not parse.
    pub time: String,
    pub command: String,
    pub response: String,
}

/// What the history panel shows after a redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryPanel {
    Empty(&'static str),
    Items(Vec<HistoryItemView>),
}

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Prepends an entry, evicting the oldest beyond capacity.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back();
        }
    }

    /// Replaces the whole sequence, keeping at most the first
    /// [`HISTORY_CAPACITY`] entries.
    pub fn replace_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = HistoryEntry>,
    {
        self.entries = entries.into_iter().take(HISTORY_CAPACITY).collect();
    }

    /// Redraws the panel from the current sequence.
    pub fn render(&self) -> HistoryPanel {
        if self.entries.is_empty() {
            return HistoryPanel::Empty(EMPTY_HISTORY_MESSAGE);
        }
        HistoryPanel::Items(
            self.entries
                .iter()
                .map(|entry| HistoryItemView {
                    technology: entry.technology.clone(),
                    time: format_time(&entry.timestamp),
                    command: entry.command.clone(),
                    response: entry.response.clone(),
                })
                .collect(),
        )
    }
}

/// Formats an ISO-8601 timestamp as local `HH:MM`.
///
/// Accepts offset-carrying timestamps, naive ones, and the backend's compact
/// `YYYYMMDD_HHMMSS` form; naive timestamps are taken as local time.
fn format_time(timestamp: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return parsed.with_timezone(&Local).format("%H:%M").to_string();
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        .map(|parsed| parsed.format("%H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y%m%d_%H%M%S"];
