//! Append-only message log
//!
//! The log is the authoritative history of a conversation. Messages are only
//! ever appended; positions never change once assigned.

use super::entities::Message;
use super::payload::{Payload, PayloadKind};
use crate::core::error::DomainError;
use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered, append-only record of a conversation
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning its sequence position (0-based).
    ///
    /// Timestamps within a log never decrease: a message stamped earlier
    /// than the current tail is recorded with the tail's timestamp.
    pub fn append(&mut self, message: Message) -> Result<usize, DomainError> {
        message.payload().validate()?;

        let message = match self.messages.last() {
            Some(last) if message.timestamp() < last.timestamp() => {
                message.with_timestamp(last.timestamp())
            }
            _ => message,
        };

        self.messages.push(message);
        Ok(self.messages.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Message> {
        self.messages.get(position)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// View of the messages in `[from, to)`.
    ///
    /// Bounds beyond the log clamp to its length; `from > to` is empty.
    pub fn slice(&self, from: usize, to: usize) -> LogSlice<'_> {
        let end = to.min(self.messages.len());
        let start = from.min(end);
        LogSlice {
            messages: &self.messages[start..end],
            offset: start,
        }
    }

    /// Messages appended at or after `position`
    pub fn since(&self, position: usize) -> LogSlice<'_> {
        self.slice(position, self.messages.len())
    }

    /// Ordered, format-agnostic records for external persistence
    pub fn to_serializable(&self) -> Vec<LogRecord> {
        self.messages
            .iter()
            .enumerate()
            .map(|(seq, message)| LogRecord::from_message(seq, message))
            .collect()
    }

    /// Rebuild a log from persisted records, in record order
    pub fn from_records(records: Vec<LogRecord>) -> Result<Self, DomainError> {
        let mut log = Self::new();
        for record in records {
            log.append(Message::try_from(record)?)?;
        }
        Ok(log)
    }

    /// Plain-text rendering, one `sender: text` line per message
    pub fn to_transcript(&self, include_timestamps: bool) -> String {
        self.messages
            .iter()
            .map(|m| {
                if include_timestamps {
                    format!(
                        "{} at {}: {}",
                        m.sender(),
                        m.timestamp().format("%b %d, %Y %I:%M:%S %p"),
                        m.payload().summary()
                    )
                } else {
                    m.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// A borrowed, restartable window over a [`MessageLog`]
///
/// Every call to [`iter`](LogSlice::iter) starts again from the first
/// message of the window.
#[derive(Debug, Clone, Copy)]
pub struct LogSlice<'a> {
    messages: &'a [Message],
    offset: usize,
}

impl<'a> LogSlice<'a> {
    pub fn iter(&self) -> std::slice::Iter<'a, Message> {
        self.messages.iter()
    }

    /// Messages paired with their sequence position in the log
    pub fn positioned(self) -> impl Iterator<Item = (usize, &'a Message)> + 'a {
        let offset = self.offset;
        self.messages
            .iter()
            .enumerate()
            .map(move |(i, m)| (offset + i, m))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.to_vec()
    }
}

impl<'a> IntoIterator for LogSlice<'a> {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Serializable shape of one log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub seq: usize,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub payload: serde_json::Value,
}

impl LogRecord {
    pub fn from_message(seq: usize, message: &Message) -> Self {
        Self {
            seq,
            sender: message.sender().to_string(),
            timestamp: message.timestamp(),
            kind: message.kind().as_str().to_string(),
            payload: message.payload().to_value(),
        }
    }

    /// The parsed kind, failing with `InvalidPayloadKind` for unknown names
    pub fn payload_kind(&self) -> Result<PayloadKind, DomainError> {
        self.kind.parse()
    }
}

impl TryFrom<LogRecord> for Message {
    type Error = DomainError;

    fn try_from(record: LogRecord) -> Result<Self, Self::Error> {
        let payload = Payload::from_parts(&record.kind, record.payload)?;
        Ok(Message::new(ParticipantId::new(record.sender), payload).with_timestamp(record.timestamp))
    }
}
