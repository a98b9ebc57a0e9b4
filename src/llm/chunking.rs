//! Splitting of timestamped digest documents into bounded-size chunks.
//!
//! A digest document is a title block (everything up to and including the
//! first blank line) followed by entries. Each entry starts at a marker line
//! of the form `### YYYY-MM-DD HH:MM:SS±HH:MM` and runs until the next marker
//! or the end of the document.

use regex::Regex;
use std::sync::OnceLock;

/// Marker that opens every entry in a digest document.
pub const ENTRY_MARKER_PATTERN: &str = r"### \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}[+-]\d{2}:\d{2}";

pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;

fn entry_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(ENTRY_MARKER_PATTERN).expect("Invalid entry marker pattern"))
}

/// One timestamped unit of a digest document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The full marker line text, e.g. `### 2024-09-01 08:30:00+00:00`
    pub timestamp: String,
    /// Everything after the marker up to the next marker
    pub text: String,
}

impl Entry {
    pub fn new(timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }

    pub fn serialized(&self) -> String {
        format!("{}{}", self.timestamp, self.text)
    }

    pub fn char_count(&self) -> usize {
        self.timestamp.chars().count() + self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub title: String,
    pub entries: Vec<Entry>,
}

impl SourceDocument {
    /// Parse a digest document.
    ///
    /// A document with no entry markers is returned whole as the title with
    /// no entries. Text between the title block and the first marker is not
    /// part of any entry and is dropped.
    pub fn parse(content: &str) -> Self {
        let (title, body) = match content.find("\n\n") {
            Some(idx) => content.split_at(idx + 2),
            None => (content, ""),
        };

        let markers: Vec<_> = entry_marker().find_iter(body).collect();
        if markers.is_empty() {
            return Self {
                title: content.to_string(),
                entries: Vec::new(),
            };
        }

        let entries = markers
            .iter()
            .enumerate()
            .map(|(i, marker)| {
                let end = markers
                    .get(i + 1)
                    .map(|next| next.start())
                    .unwrap_or(body.len());
                Entry::new(marker.as_str(), &body[marker.end()..end])
            })
            .collect();

        Self {
            title: title.to_string(),
            entries,
        }
    }
}

/// An ordered group of entries sharing the document title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub title: String,
    pub entries: Vec<Entry>,
}

impl Chunk {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut output = self.title.clone();
        for entry in &self.entries {
            output.push_str(&entry.timestamp);
            output.push_str(&entry.text);
        }
        output
    }

    pub fn char_count(&self) -> usize {
        self.title.chars().count() + self.entries.iter().map(Entry::char_count).sum::<usize>()
    }
}

/// Group entries into chunks of at most `max_chars` characters, title included.
///
/// The first entry of a chunk is always admitted, so an entry that is larger
/// than `max_chars` on its own ends up alone in a chunk that exceeds the
/// budget. Entries are never split. An empty entry list yields a single chunk
/// holding only the title.
pub fn split_entries(entries: &[Entry], title: &str, max_chars: usize) -> Vec<Chunk> {
    let title_chars = title.chars().count();

    let mut chunks = Vec::new();
    let mut current = Chunk::new(title);
    let mut current_chars = title_chars;

    for entry in entries {
        let entry_chars = entry.char_count();

        if current_chars + entry_chars > max_chars && !current.entries.is_empty() {
            chunks.push(std::mem::replace(&mut current, Chunk::new(title)));
            current_chars = title_chars;
        }

        current.entries.push(entry.clone());
        current_chars += entry_chars;
    }

    chunks.push(current);
    chunks
}
