//! Message payloads
//!
//! A payload is a closed sum type over the four media a conversation can
//! carry. Handlers dispatch with an exhaustive `match` on [`Payload`].

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The medium of a message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Text,
    Image,
    Audio,
    Video,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
            PayloadKind::Image => "image",
            PayloadKind::Audio => "audio",
            PayloadKind::Video => "video",
        }
    }

    /// Placeholder text used when a media payload has no caption
    pub fn placeholder(&self) -> &'static str {
        match self {
            PayloadKind::Text => "",
            PayloadKind::Image => "[Image]",
            PayloadKind::Audio => "[Audio]",
            PayloadKind::Video => "[Video]",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PayloadKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(PayloadKind::Text),
            "image" => Ok(PayloadKind::Image),
            "audio" => Ok(PayloadKind::Audio),
            "video" => Ok(PayloadKind::Video),
            other => Err(DomainError::InvalidPayloadKind(other.to_string())),
        }
    }
}

/// A reference to a non-text asset (image, audio clip, video)
///
/// The asset bytes live outside the conversation; the log only records
/// where to find them and how to describe them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Location of the asset (path or URL)
    pub uri: String,
    /// Optional human-readable caption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl MediaAsset {
    pub fn new(media_type: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            uri: uri.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Top-level MIME type (`image` for `image/png`)
    pub fn top_level_type(&self) -> &str {
        self.media_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

/// Message payload (tagged union over the supported media)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Image(MediaAsset),
    Audio(MediaAsset),
    Video(MediaAsset),
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text(_) => PayloadKind::Text,
            Payload::Image(_) => PayloadKind::Image,
            Payload::Audio(_) => PayloadKind::Audio,
            Payload::Video(_) => PayloadKind::Video,
        }
    }

    /// The text of a text payload
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The asset of a media payload
    pub fn as_media(&self) -> Option<&MediaAsset> {
        match self {
            Payload::Text(_) => None,
            Payload::Image(asset) | Payload::Audio(asset) | Payload::Video(asset) => Some(asset),
        }
    }

    /// Check that the payload content matches its kind.
    ///
    /// A media asset whose MIME top-level type disagrees with the variant
    /// (an `Image` holding `audio/wav`) is rejected as an invalid kind.
    pub fn validate(&self) -> Result<(), DomainError> {
        let Some(asset) = self.as_media() else {
            return Ok(());
        };

        let expected = self.kind().as_str();
        if asset.top_level_type().eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(DomainError::InvalidPayloadKind(format!(
                "{} payload carries media type '{}'",
                expected, asset.media_type
            )))
        }
    }

    /// One-line textual stand-in for the payload
    pub fn summary(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Image(asset) | Payload::Audio(asset) | Payload::Video(asset) => asset
                .caption
                .clone()
                .unwrap_or_else(|| self.kind().placeholder().to_string()),
        }
    }

    /// Format-agnostic JSON value of the payload body (without the kind tag)
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Payload::Text(text) => serde_json::Value::String(text.clone()),
            Payload::Image(asset) | Payload::Audio(asset) | Payload::Video(asset) => {
                serde_json::to_value(asset).unwrap_or(serde_json::Value::Null)
            }
        }
    }

    /// Rebuild a payload from a kind name and a JSON body.
    pub fn from_parts(kind: &str, value: serde_json::Value) -> Result<Self, DomainError> {
        let kind: PayloadKind = kind.parse()?;

        let payload = match kind {
            PayloadKind::Text => match value {
                serde_json::Value::String(text) => Payload::Text(text),
                other => {
                    return Err(DomainError::InvalidMessage(format!(
                        "text payload must be a string, got {}",
                        other
                    )));
                }
            },
            PayloadKind::Image => Payload::Image(parse_asset(value)?),
            PayloadKind::Audio => Payload::Audio(parse_asset(value)?),
            PayloadKind::Video => Payload::Video(parse_asset(value)?),
        };

        payload.validate()?;
        Ok(payload)
    }
}

fn parse_asset(value: serde_json::Value) -> Result<MediaAsset, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::InvalidMessage(format!("malformed media asset: {}", e)))
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}
