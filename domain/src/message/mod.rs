//! Conversation messages and the append-only message log.
//!
//! - [`payload::Payload`]: text / image / audio / video sum type
//! - [`entities::Message`]: immutable utterance with sender and timestamp
//! - [`log::MessageLog`]: ordered, append-only history of a session
//! - [`log::LogRecord`]: format-agnostic record handed to durable sinks

pub mod entities;
pub mod log;
pub mod payload;
