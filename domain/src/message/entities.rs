//! Message entity

use super::payload::{MediaAsset, Payload, PayloadKind};
use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};

/// A single utterance in a conversation (Entity)
///
/// Fields are private: a message is immutable once built. The log may only
/// supersede it with later appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: ParticipantId,
    payload: Payload,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(sender: impl Into<ParticipantId>, payload: Payload) -> Self {
        Self {
            sender: sender.into(),
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn text(sender: impl Into<ParticipantId>, text: impl Into<String>) -> Self {
        Self::new(sender, Payload::Text(text.into()))
    }

    pub fn image(sender: impl Into<ParticipantId>, asset: MediaAsset) -> Self {
        Self::new(sender, Payload::Image(asset))
    }

    pub fn audio(sender: impl Into<ParticipantId>, asset: MediaAsset) -> Self {
        Self::new(sender, Payload::Audio(asset))
    }

    pub fn video(sender: impl Into<ParticipantId>, asset: MediaAsset) -> Self {
        Self::new(sender, Payload::Video(asset))
    }

    /// A text message sent by the session itself
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(ParticipantId::system(), text)
    }

    /// Replace the timestamp (used when rebuilding a persisted log)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn sender(&self) -> &ParticipantId {
        &self.sender
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_system(&self) -> bool {
        self.sender.is_system()
    }

    /// The same message attributed to another sender, keeping payload and time
    pub fn reattributed(&self, sender: impl Into<ParticipantId>) -> Self {
        Self {
            sender: sender.into(),
            payload: self.payload.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.sender, self.payload.summary())
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::system(s)
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::system(s)
    }
}
