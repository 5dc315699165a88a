//! Durable sink port
//!
//! Where a session's log goes when it is checkpointed or closed.

use async_trait::async_trait;
use conclave_domain::{LogRecord, SessionIdentity};
use thiserror::Error;

/// Errors that can occur while persisting a log
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Sink rejected the log: {0}")]
    Rejected(String),
}

/// Persistence capability for a session's message log
///
/// Every call receives the complete log so far. Implementations overwrite
/// what they stored for the same identity before.
#[async_trait]
pub trait DurableSink: Send + Sync {
    async fn persist(
        &self,
        records: &[LogRecord],
        identity: &SessionIdentity,
    ) -> Result<(), SinkError>;
}

/// Sink that discards everything, for tests and throwaway sessions
pub struct NoSink;

#[async_trait]
impl DurableSink for NoSink {
    async fn persist(
        &self,
        _records: &[LogRecord],
        _identity: &SessionIdentity,
    ) -> Result<(), SinkError> {
        Ok(())
    }
}
