//! Terminal-like transcript of the session.
//!
//! Entries accumulate for the lifetime of the session. Every entry gets an
//! [`EntryId`] so a provisional entry can later be removed by handle no
//! matter what was appended after it.

use serde::{Deserialize, Serialize};

/// Visual category of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Command,
    Output,
    Error,
    Success,
    Info,
}

/// Handle to a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub message: String,
}

/// Receives transcript changes for display.
pub trait TranscriptSink: Send {
    fn appended(&mut self, entry: &TranscriptEntry);

    fn removed(&mut self, id: EntryId);
}

/// Sink that displays nothing.
#[derive(Debug, Default)]
pub struct NullSink;

impl TranscriptSink for NullSink {
    fn appended(&mut self, _entry: &TranscriptEntry) {}

    fn removed(&mut self, _id: EntryId) {}
}

pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
    sink: Box<dyn TranscriptSink>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("entries", &self.entries)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl Transcript {
    pub fn new(sink: Box<dyn TranscriptSink>) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            sink,
        }
    }

    /// Appends an entry and hands it to the sink.
    pub fn append(&mut self, message: impl Into<String>, kind: EntryKind) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        let entry = TranscriptEntry {
            id,
            kind,
            message: message.into(),
        };
        self.sink.appended(&entry);
        self.entries.push(entry);
        id
    }

    /// Removes the entry with the given handle. Returns false if it is gone.
    pub fn remove(&mut self, id: EntryId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                self.sink.removed(id);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}
