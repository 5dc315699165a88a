//! Application layer for conclave
//!
//! This crate contains the conversation session, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod participants;
pub mod ports;
pub mod session;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionParams;
pub use participants::ParticipantGroup;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    durable_sink::{DurableSink, NoSink, SinkError},
    participant::{Participant, ParticipantError},
    progress::{NoProgress, SessionProgress},
};
pub use session::{
    ConversationSession, SessionBuilder, SessionError, SessionStatus, TerminationQuery,
};
pub use use_cases::activities;
