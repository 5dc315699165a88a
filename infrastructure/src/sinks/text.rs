//! Plain-text transcript sink.
//!
//! Writes `<base_dir>/<session-slug>/conversation.txt`, one
//! `sender at <time>: text` line per message.

use super::json::write_replacing;
use async_trait::async_trait;
use conclave_application::ports::durable_sink::{DurableSink, SinkError};
use conclave_domain::{LogRecord, MessageLog, SessionIdentity};
use std::path::PathBuf;
use tracing::{debug, warn};

/// File name of the plain-text transcript inside a session directory
pub const TEXT_TRANSCRIPT_FILE: &str = "conversation.txt";

pub struct TextFileSink {
    base_dir: PathBuf,
}

impl TextFileSink {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn path_for(&self, identity: &SessionIdentity) -> PathBuf {
        self.base_dir.join(identity.slug()).join(TEXT_TRANSCRIPT_FILE)
    }
}

#[async_trait]
impl DurableSink for TextFileSink {
    async fn persist(
        &self,
        records: &[LogRecord],
        identity: &SessionIdentity,
    ) -> Result<(), SinkError> {
        let mut text = render_text(records);
        text.push('\n');

        let path = self.path_for(identity);
        write_replacing(&path, text.as_bytes()).await?;

        debug!("Wrote text transcript to {}", path.display());
        Ok(())
    }
}

/// Render records as timestamped `sender at <time>: text` lines.
///
/// Records that do not form a valid log are written as raw JSON lines.
pub fn render_text(records: &[LogRecord]) -> String {
    match MessageLog::from_records(records.to_vec()) {
        Ok(log) => log.to_transcript(true),
        Err(e) => {
            warn!("Writing text transcript from raw records: {}", e);
            records
                .iter()
                .map(|r| format!("{} at {}: {}", r.sender, r.timestamp, r.payload))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::Message;

    #[test]
    fn test_render_text_is_timestamped() {
        let mut log = MessageLog::new();
        log.append(Message::system("Welcome")).unwrap();
        log.append(Message::text("Ada", "Hello")).unwrap();

        let text = render_text(&log.to_serializable());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("System at "));
        assert!(lines[0].ends_with(": Welcome"));
        assert!(lines[1].starts_with("Ada at "));
        assert!(lines[1].ends_with(": Hello"));
    }

    #[test]
    fn test_unknown_kind_falls_back_to_raw_lines() {
        let record = LogRecord {
            seq: 0,
            sender: "Ada".to_string(),
            timestamp: chrono::Utc::now(),
            kind: "hologram".to_string(),
            payload: serde_json::json!({"uri": "holo://1"}),
        };

        let text = render_text(&[record]);
        assert!(text.starts_with("Ada at "));
        assert!(text.ends_with("{\"uri\":\"holo://1\"}"));
    }

    #[tokio::test]
    async fn test_persist_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TextFileSink::new(dir.path());
        let identity = SessionIdentity::new("Weekly Sync");

        let mut log = MessageLog::new();
        log.append(Message::text("Grace", "Morning")).unwrap();
        sink.persist(&log.to_serializable(), &identity).await.unwrap();

        let content = std::fs::read_to_string(sink.path_for(&identity)).unwrap();
        assert!(content.starts_with("Grace at "));
        assert!(content.ends_with(": Morning\n"));
        assert!(sink.path_for(&identity).ends_with("weekly-sync/conversation.txt"));
    }
}
