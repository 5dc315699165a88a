//! Reading JSON transcripts back into a [`MessageLog`].

use conclave_domain::{DomainError, LogRecord, MessageLog};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Failed to read transcript: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed transcript: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Load a transcript written by [`JsonFileSink`](super::JsonFileSink).
///
/// Records with an unknown payload kind fail with
/// [`DomainError::InvalidPayloadKind`].
pub fn load_transcript(path: impl AsRef<Path>) -> Result<MessageLog, TranscriptError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_transcript(&content)
}

pub fn parse_transcript(content: &str) -> Result<MessageLog, TranscriptError> {
    let records: Vec<LogRecord> = serde_json::from_str(content)?;
    Ok(MessageLog::from_records(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::JsonFileSink;
    use conclave_application::ports::durable_sink::DurableSink;
    use conclave_domain::{MediaAsset, Message, SessionIdentity};

    #[tokio::test]
    async fn test_reads_back_what_the_json_sink_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let identity = SessionIdentity::new("replay");

        let mut log = MessageLog::new();
        log.append(Message::system("Welcome")).unwrap();
        log.append(Message::video(
            "Ada",
            MediaAsset::new("video/mp4", "demo.mp4").with_caption("Demo"),
        ))
        .unwrap();
        sink.persist(&log.to_serializable(), &identity).await.unwrap();

        let loaded = load_transcript(sink.path_for(&identity)).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(1).unwrap(), log.get(1).unwrap());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let content = r#"[
            {"seq": 0, "sender": "Ada", "timestamp": "2024-05-01T10:00:00Z",
             "kind": "hologram", "payload": "hi"}
        ]"#;

        let err = parse_transcript(content).unwrap_err();
        assert!(matches!(
            err,
            TranscriptError::Domain(DomainError::InvalidPayloadKind(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_transcript("not json"),
            Err(TranscriptError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_transcript("/definitely/not/here.json"),
            Err(TranscriptError::Io(_))
        ));
    }
}
