//! Session identity value object

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name under which a session is durably recorded (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    name: String,
    opened_at: DateTime<Utc>,
}

impl SessionIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opened_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Filesystem-safe form of the name: lowercase ASCII alphanumerics
    /// separated by single dashes.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            "session".to_string()
        } else {
            slug.to_string()
        }
    }
}

impl std::fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for SessionIdentity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
