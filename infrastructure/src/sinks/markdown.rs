//! Markdown transcript sink.
//!
//! Renders the log as a human-readable document at
//! `<base_dir>/<session-slug>/conversation.md`: one paragraph per message,
//! media as Markdown images or links.

use super::json::write_replacing;
use async_trait::async_trait;
use conclave_application::ports::durable_sink::{DurableSink, SinkError};
use conclave_domain::{LogRecord, Payload, SessionIdentity};
use std::path::PathBuf;
use tracing::{debug, warn};

/// File name of the Markdown transcript inside a session directory
pub const MARKDOWN_TRANSCRIPT_FILE: &str = "conversation.md";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub struct MarkdownFileSink {
    base_dir: PathBuf,
}

impl MarkdownFileSink {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn path_for(&self, identity: &SessionIdentity) -> PathBuf {
        self.base_dir
            .join(identity.slug())
            .join(MARKDOWN_TRANSCRIPT_FILE)
    }
}

#[async_trait]
impl DurableSink for MarkdownFileSink {
    async fn persist(
        &self,
        records: &[LogRecord],
        identity: &SessionIdentity,
    ) -> Result<(), SinkError> {
        let path = self.path_for(identity);
        write_replacing(&path, render_markdown(records, identity).as_bytes()).await?;

        debug!("Wrote Markdown transcript to {}", path.display());
        Ok(())
    }
}

/// Render records as a Markdown document titled after the session.
pub fn render_markdown(records: &[LogRecord], identity: &SessionIdentity) -> String {
    let mut out = format!("# {}\n", identity.name());

    for record in records {
        out.push('\n');
        out.push_str(&format!(
            "**{} ({}):** {}\n",
            record.sender,
            record.timestamp.format(TIMESTAMP_FORMAT),
            render_body(record)
        ));
    }

    out
}

fn render_body(record: &LogRecord) -> String {
    match Payload::from_parts(&record.kind, record.payload.clone()) {
        Ok(Payload::Text(text)) => text,
        Ok(Payload::Image(asset)) => {
            format!("![{}]({})", asset.caption.as_deref().unwrap_or(""), asset.uri)
        }
        Ok(payload @ (Payload::Audio(_) | Payload::Video(_))) => {
            let label = payload.summary();
            match payload.as_media() {
                Some(asset) => format!("[{}]({})", label, asset.uri),
                None => label,
            }
        }
        Err(e) => {
            warn!("Rendering record {} as raw JSON: {}", record.seq, e);
            format!("`{}`", record.payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::{MediaAsset, Message, MessageLog};

    #[test]
    fn test_render_markdown() {
        let mut log = MessageLog::new();
        log.append(Message::text("Ada", "Hello")).unwrap();
        log.append(Message::image(
            "Ada",
            MediaAsset::new("image/png", "sketch.png").with_caption("A sketch"),
        ))
        .unwrap();
        log.append(Message::audio("Grace", MediaAsset::new("audio/wav", "hum.wav")))
            .unwrap();

        let markdown = render_markdown(&log.to_serializable(), &SessionIdentity::new("Studio"));
        let lines: Vec<&str> = markdown.lines().filter(|l| !l.is_empty()).collect();

        assert_eq!(lines[0], "# Studio");
        assert!(lines[1].starts_with("**Ada ("));
        assert!(lines[1].ends_with("):** Hello"));
        assert!(lines[2].ends_with("![A sketch](sketch.png)"));
        assert!(lines[3].ends_with("[[Audio]](hum.wav)"));
    }

    #[test]
    fn test_unknown_kind_falls_back_to_raw_payload() {
        let record = LogRecord {
            seq: 0,
            sender: "Ada".to_string(),
            timestamp: chrono::Utc::now(),
            kind: "hologram".to_string(),
            payload: serde_json::json!({"uri": "holo://1"}),
        };

        let markdown = render_markdown(&[record], &SessionIdentity::new("x"));
        assert!(markdown.contains("`{\"uri\":\"holo://1\"}`"));
    }

    #[tokio::test]
    async fn test_persist_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MarkdownFileSink::new(dir.path());
        let identity = SessionIdentity::new("Weekly Sync");

        let mut log = MessageLog::new();
        log.append(Message::system("Welcome")).unwrap();
        sink.persist(&log.to_serializable(), &identity).await.unwrap();

        let content =
            std::fs::read_to_string(dir.path().join("weekly-sync").join("conversation.md"))
                .unwrap();
        assert!(content.starts_with("# Weekly Sync\n"));
        assert!(content.contains("Welcome"));
    }
}
