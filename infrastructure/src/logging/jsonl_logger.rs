//! JSONL event log for a single session.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying its `type` and a
//! millisecond `timestamp` next to the event's own fields. Lines are buffered
//! and reach the disk every [`FLUSH_EVERY`] events, whenever a termination
//! check settles, and when the session closes or is cancelled. Reading the
//! file in order replays what happened to the session.

use chrono::{DateTime, SecondsFormat, Utc};
use conclave_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use conclave_domain::SessionIdentity;
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// File name of the event log inside a session directory
pub const EVENT_LOG_FILE: &str = "events.jsonl";

/// Buffered events written before a forced flush
pub const FLUSH_EVERY: usize = 16;

struct EventWriter {
    out: BufWriter<File>,
    pending: usize,
    broken: bool,
}

impl EventWriter {
    fn write(&mut self, line: &str, flush: bool) -> std::io::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.pending += 1;
        if flush || self.pending >= FLUSH_EVERY {
            self.out.flush()?;
            self.pending = 0;
        }
        Ok(())
    }
}

/// Writes a session's events to `<base_dir>/<session-slug>/events.jsonl`.
pub struct JsonlConversationLogger {
    writer: Mutex<EventWriter>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Event log for `identity` under `base_dir`, next to its transcripts.
    pub fn for_session(base_dir: impl AsRef<Path>, identity: &SessionIdentity) -> Option<Self> {
        let path = base_dir
            .as_ref()
            .join(identity.slug())
            .join(EVENT_LOG_FILE);
        let logger = Self::new(&path)?;
        debug!("Logging events of '{}' to {}", identity, path.display());
        Some(logger)
    }

    /// Event log at an explicit path, replacing any earlier file.
    ///
    /// Returns `None` (after a warning) if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Could not create event log directory {}: {}", parent.display(), e);
                return None;
            }
        }

        match File::create(path) {
            Ok(file) => Some(Self {
                writer: Mutex::new(EventWriter {
                    out: BufWriter::new(file),
                    pending: 0,
                    broken: false,
                }),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!("Could not create event log {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Events after which the log must be on disk
fn settles(event_type: &str) -> bool {
    matches!(
        event_type,
        "termination_outcome" | "session_closed" | "session_cancelled"
    )
}

fn to_record(event: ConversationEvent, at: DateTime<Utc>) -> Value {
    let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    match event.payload {
        Value::Object(mut fields) => {
            fields.insert("type".to_string(), event.event_type.into());
            fields.insert("timestamp".to_string(), timestamp.into());
            Value::Object(fields)
        }
        data => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": data,
        }),
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let flush = settles(event.event_type);
        let Ok(line) = serde_json::to_string(&to_record(event, Utc::now())) else {
            return;
        };

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if writer.broken {
            return;
        }
        if let Err(e) = writer.write(&line, flush) {
            // Warn once; the conversation carries on without its event log
            warn!("Event log {} stopped: {}", self.path.display(), e);
            writer.broken = true;
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.out.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_for_session_writes_next_to_transcripts() {
        let dir = tempfile::tempdir().unwrap();
        let identity = SessionIdentity::new("Design Review");
        let logger = JsonlConversationLogger::for_session(dir.path(), &identity).unwrap();

        assert_eq!(
            logger.path(),
            dir.path().join("design-review").join(EVENT_LOG_FILE).as_path()
        );
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("review.events.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            "message_appended",
            json!({
                "session": "review",
                "seq": 0,
                "sender": "Ada",
                "kind": "text",
                "payload": "Hello",
            }),
        ));
        logger.log(ConversationEvent::new(
            "participants_left",
            json!({"session": "review", "participants": ["Ada"]}),
        ));
        drop(logger);

        let events = read_lines(&path);
        assert_eq!(events.len(), 2);
        for event in &events {
            assert!(event["timestamp"].is_string());
        }

        assert_eq!(events[0]["type"], "message_appended");
        assert_eq!(events[0]["sender"], "Ada");
        assert_eq!(events[0]["seq"], 0);
        assert_eq!(events[1]["type"], "participants_left");
        assert_eq!(events[1]["participants"][0], "Ada");
    }

    #[test]
    fn test_flushes_when_the_session_settles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new("message_appended", json!({"seq": 0})));
        assert!(read_lines(&path).is_empty());

        logger.log(ConversationEvent::new("session_closed", json!({"messages": 1})));
        let events = read_lines(&path);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["type"], "session_closed");
    }

    #[test]
    fn test_flushes_after_a_full_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        for seq in 0..FLUSH_EVERY {
            logger.log(ConversationEvent::new("message_appended", json!({"seq": seq})));
        }

        assert_eq!(read_lines(&path).len(), FLUSH_EVERY);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapped.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new("session_cancelled", json!(3)));

        let events = read_lines(&path);
        assert_eq!(events[0]["type"], "session_cancelled");
        assert_eq!(events[0]["data"], 3);
    }

    #[test]
    fn test_unwritable_location_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        assert!(JsonlConversationLogger::new(blocker.join("events.jsonl")).is_none());
    }
}
