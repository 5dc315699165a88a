//! Participant identity value objects

use serde::{Deserialize, Serialize};

/// Name-based identity of a conversation participant (Value Object)
///
/// Two participants with the same name are the same participant as far as
/// the membership registry and the message log are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Sender name used for announcements and other session-generated messages
    pub const SYSTEM: &'static str = "System";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The reserved sender of system messages
    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    pub fn is_system(&self) -> bool {
        self.0 == Self::SYSTEM
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pronouns used when a participant is referred to in generated text.
///
/// Purely cosmetic: nothing in the orchestration engine branches on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronouns {
    pub subject: String,
    pub object: String,
    pub possessive: String,
}

impl Pronouns {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        possessive: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
            possessive: possessive.into(),
        }
    }
}

impl Default for Pronouns {
    fn default() -> Self {
        Self::new("they", "them", "their")
    }
}

impl std::fmt::Display for Pronouns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subject, self.object)
    }
}

impl std::str::FromStr for Pronouns {
    type Err = String;

    /// Parse "she/her", "he/him/his" or "they/them/their".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [subject, object] if !subject.is_empty() && !object.is_empty() => {
                Ok(Self::new(*subject, *object, *object))
            }
            [subject, object, possessive]
                if !subject.is_empty() && !object.is_empty() && !possessive.is_empty() =>
            {
                Ok(Self::new(*subject, *object, *possessive))
            }
            _ => Err(format!(
                "Invalid pronouns: {}. Expected subject/object or subject/object/possessive",
                s
            )),
        }
    }
}
