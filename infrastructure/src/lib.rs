//! Infrastructure layer for conclave
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: durable transcript sinks, the JSONL event
//! logger, scripted participants, and configuration file loading.

pub mod config;
pub mod logging;
pub mod participants;
pub mod sinks;

// Re-export commonly used types
pub use config::{
    Cast, CastError, ConfigLoader, FileConfig, FileOutputConfig, FileOutputFormat,
    FileParticipantConfig, FileQueryConfig, FileRole, FileSessionConfig,
};
pub use logging::{EVENT_LOG_FILE, JsonlConversationLogger};
pub use participants::{DecisionPolicy, ScriptedParticipant};
pub use sinks::{
    CompositeSink, JsonFileSink, MarkdownFileSink, TextFileSink, TranscriptError, load_transcript,
    parse_transcript, render_markdown, render_text,
};
