//! Logging infrastructure: structured session event logging.
//!
//! Provides [`JsonlConversationLogger`], a JSONL file writer that implements
//! the [`ConversationLogger`](conclave_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::{EVENT_LOG_FILE, FLUSH_EVERY, JsonlConversationLogger};
