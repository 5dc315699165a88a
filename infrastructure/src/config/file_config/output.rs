//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};

/// Transcript format written when a session closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    Json,
    Markdown,
    Text,
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Transcript formats to write
    pub formats: Vec<FileOutputFormat>,
    /// Also write a JSONL event log next to the transcripts
    pub event_log: bool,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            formats: vec![FileOutputFormat::Json],
            event_log: false,
            color: true,
        }
    }
}
