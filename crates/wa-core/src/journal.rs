//! Append-only chat journal backed by a JSONL file.
//!
//! Each chat writes one JSON object per line: user messages, sealed
//! assistant messages (storage-safe content only, never the rendered
//! card), and transfer records. Reading the file back rebuilds a
//! transcript for resuming a chat offline.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use wa_protocol::{ChatMessage, TransferCall};

/// Seconds since Unix epoch.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Generate a short chat ID from PID and timestamp.
pub fn generate_chat_id() -> String {
    let pid = std::process::id();
    let ts = epoch_secs();
    format!("c{:x}", pid ^ (ts as u32))
}

/// A single entry in the chat journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JournalEntry {
    /// The user's message.
    #[serde(rename = "user")]
    User { ts: u64, content: String },
    /// A sealed assistant message (storage-safe content).
    #[serde(rename = "assistant")]
    Assistant { ts: u64, content: String },
    /// A transfer call surfaced to the confirmation panel.
    #[serde(rename = "transfer")]
    Transfer {
        ts: u64,
        amount: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tx_hash: Option<String>,
        summary: String,
    },
}

impl JournalEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            ts: epoch_secs(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            ts: epoch_secs(),
            content: content.into(),
        }
    }

    pub fn transfer(call: &TransferCall) -> Self {
        Self::Transfer {
            ts: epoch_secs(),
            amount: call.params.amount.clone(),
            to: call.params.to.clone(),
            tx_hash: call.params.settled_hash().map(str::to_string),
            summary: call.summary.clone(),
        }
    }
}

/// Append-only chat journal backed by a JSONL file.
pub struct ChatJournal {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl ChatJournal {
    /// Create/open a JSONL journal file. Creates parent directories.
    pub fn new(path: PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append one entry, flush immediately.
    pub fn append(&mut self, entry: &JournalEntry) {
        if let Ok(line) = serde_json::to_string(entry) {
            let _ = writeln!(self.writer, "{line}");
            let _ = self.writer.flush();
        }
    }

    /// Read all entries from the journal file.
    pub fn read_all(&self) -> Vec<JournalEntry> {
        read_entries(&self.path)
    }

    /// Get the journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read journal entries from a file, skipping blank or corrupt lines.
pub fn read_entries(path: &Path) -> Vec<JournalEntry> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Vec::new(),
    };
    let reader = BufReader::new(file);
    reader
        .lines()
        .filter_map(|line| {
            let line = line.ok()?;
            if line.trim().is_empty() {
                return None;
            }
            serde_json::from_str(&line).ok()
        })
        .collect()
}

/// Rebuild a transcript from journal entries. Transfer records are side
/// records of the confirmation surface, not messages.
pub fn transcript_from_journal(entries: &[JournalEntry]) -> Vec<ChatMessage> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            JournalEntry::User { content, .. } => Some(ChatMessage::user(content.clone())),
            JournalEntry::Assistant { content, .. } => {
                Some(ChatMessage::assistant(content.clone()))
            }
            JournalEntry::Transfer { .. } => None,
        })
        .collect()
}
