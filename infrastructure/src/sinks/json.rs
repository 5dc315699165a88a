//! JSON transcript sink.
//!
//! Writes the whole log as a pretty-printed JSON array of [`LogRecord`]s to
//! `<base_dir>/<session-slug>/conversation.json`. Each persist call rewrites
//! the file through a temporary sibling, so a crash mid-write leaves the
//! previous checkpoint intact.

use async_trait::async_trait;
use conclave_application::ports::durable_sink::{DurableSink, SinkError};
use conclave_domain::{LogRecord, SessionIdentity};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the JSON transcript inside a session directory
pub const JSON_TRANSCRIPT_FILE: &str = "conversation.json";

pub struct JsonFileSink {
    base_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where the transcript of `identity` is written
    pub fn path_for(&self, identity: &SessionIdentity) -> PathBuf {
        self.base_dir
            .join(identity.slug())
            .join(JSON_TRANSCRIPT_FILE)
    }
}

#[async_trait]
impl DurableSink for JsonFileSink {
    async fn persist(
        &self,
        records: &[LogRecord],
        identity: &SessionIdentity,
    ) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| SinkError::Serialization(e.to_string()))?;

        let path = self.path_for(identity);
        write_replacing(&path, json.as_bytes()).await?;

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }
}

/// Write `contents` to `path` via a temporary file and a rename.
pub(crate) async fn write_replacing(path: &Path, contents: &[u8]) -> Result<(), SinkError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::{MediaAsset, Message, MessageLog};

    fn sample_log() -> MessageLog {
        let mut log = MessageLog::new();
        log.append(Message::system("Welcome")).unwrap();
        log.append(Message::text("Ada", "Hello")).unwrap();
        log.append(Message::image(
            "Ada",
            MediaAsset::new("image/png", "file:///sketch.png").with_caption("A sketch"),
        ))
        .unwrap();
        log
    }

    #[tokio::test]
    async fn test_writes_pretty_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let identity = SessionIdentity::new("Design Review");
        let log = sample_log();

        sink.persist(&log.to_serializable(), &identity).await.unwrap();

        let path = dir.path().join("design-review").join("conversation.json");
        assert_eq!(sink.path_for(&identity), path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  "));

        let records: Vec<LogRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].sender.as_str(), "Ada");
        assert_eq!(records[2].kind, "image");
    }

    #[tokio::test]
    async fn test_rewrites_on_each_persist() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let identity = SessionIdentity::new("checkpoints");
        let mut log = sample_log();

        sink.persist(&log.to_serializable(), &identity).await.unwrap();
        log.append(Message::system("Goodbye")).unwrap();
        sink.persist(&log.to_serializable(), &identity).await.unwrap();

        let content = std::fs::read_to_string(sink.path_for(&identity)).unwrap();
        let records: Vec<LogRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(records.len(), 4);
        assert!(!dir.path().join("checkpoints").join("conversation.json.tmp").exists());
    }
}
