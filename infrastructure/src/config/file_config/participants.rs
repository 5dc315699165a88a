//! Participant and query configuration from TOML
//! (`[[participants]]` and `[[queries]]` arrays)
//!
//! ```toml
//! [[participants]]
//! name = "Ada"
//! pronouns = "she/her"
//! lines = ["What if we cached it?", "Agreed."]
//!
//! [[participants]]
//! name = "Judge"
//! role = "evaluator"
//! decide = "after:2"
//!
//! [[queries]]
//! evaluators = ["Judge"]
//! prompt = "Have we settled on a design?"
//! ```

use crate::participants::DecisionPolicy;
use conclave_domain::{ConfigIssue, ConfigIssueCode, Pronouns, QuorumRule};
use serde::{Deserialize, Serialize};

/// How a configured participant takes part in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Joined as a speaker when the session opens
    Speaker,
    /// Joined as a bystander when the session opens
    Bystander,
    /// Not joined; only asked termination queries
    Evaluator,
    /// Not joined; only takes part through a group
    Member,
}

impl FileRole {
    const VALID: [&'static str; 4] = ["speaker", "bystander", "evaluator", "member"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Speaker => "speaker",
            FileRole::Bystander => "bystander",
            FileRole::Evaluator => "evaluator",
            FileRole::Member => "member",
        }
    }
}

impl std::str::FromStr for FileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "speaker" => Ok(FileRole::Speaker),
            "bystander" => Ok(FileRole::Bystander),
            "evaluator" => Ok(FileRole::Evaluator),
            "member" => Ok(FileRole::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Raw participant definition from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileParticipantConfig {
    pub name: String,
    /// speaker, bystander, evaluator or member
    pub role: String,
    /// e.g. "she/her"; defaults to they/them
    pub pronouns: Option<String>,
    /// Lines spoken one per round
    pub lines: Vec<String>,
    /// Decision policy: exhausted, always, never or after:N
    pub decide: String,
    /// Names of member participants; makes this entry a group
    pub members: Vec<String>,
    /// Quorum rule for group decisions: majority, unanimous, atleast:N, N%
    pub rule: Option<String>,
    /// Stance argued when the session runs a debate
    pub position: Option<String>,
}

impl Default for FileParticipantConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: "speaker".to_string(),
            pronouns: None,
            lines: Vec::new(),
            decide: "exhausted".to_string(),
            members: Vec::new(),
            rule: None,
            position: None,
        }
    }
}

impl FileParticipantConfig {
    pub fn is_group(&self) -> bool {
        !self.members.is_empty()
    }

    fn field(&self, name: &str) -> String {
        format!("participants.{}.{}", self.name, name)
    }

    pub fn parse_role(&self) -> (FileRole, Vec<ConfigIssue>) {
        match self.role.parse() {
            Ok(role) => (role, Vec::new()),
            Err(_) => (
                FileRole::Speaker,
                vec![invalid_value(
                    self.field("role"),
                    &self.role,
                    FileRole::VALID.iter().map(|s| s.to_string()).collect(),
                )],
            ),
        }
    }

    pub fn parse_policy(&self) -> (DecisionPolicy, Vec<ConfigIssue>) {
        match self.decide.parse() {
            Ok(policy) => (policy, Vec::new()),
            Err(_) => (
                DecisionPolicy::default(),
                vec![invalid_value(
                    self.field("decide"),
                    &self.decide,
                    DecisionPolicy::valid_values(),
                )],
            ),
        }
    }

    pub fn parse_pronouns(&self) -> (Pronouns, Vec<ConfigIssue>) {
        let Some(raw) = &self.pronouns else {
            return (Pronouns::default(), Vec::new());
        };
        match raw.parse() {
            Ok(pronouns) => (pronouns, Vec::new()),
            Err(_) => (
                Pronouns::default(),
                vec![invalid_value(
                    self.field("pronouns"),
                    raw,
                    vec!["subject/object".to_string(), "subject/object/possessive".to_string()],
                )],
            ),
        }
    }

    pub fn parse_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        let Some(raw) = &self.rule else {
            return (QuorumRule::default(), Vec::new());
        };
        match raw.parse() {
            Ok(rule) => (rule, Vec::new()),
            Err(_) => (
                QuorumRule::default(),
                vec![invalid_value(
                    self.field("rule"),
                    raw,
                    ["majority", "unanimous", "atleast:N", "N%"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                )],
            ),
        }
    }
}

/// Raw termination query from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQueryConfig {
    /// Participants asked, in order
    pub evaluators: Vec<String>,
    pub prompt: String,
}

fn invalid_value(field: String, value: &str, valid_values: Vec<String>) -> ConfigIssue {
    let message = format!(
        "{}: unknown value '{}' (expected one of: {})",
        field,
        value,
        valid_values.join(", ")
    );
    ConfigIssue::error(
        ConfigIssueCode::InvalidEnumValue {
            field,
            value: value.to_string(),
            valid_values,
        },
        message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(role: &str, decide: &str) -> FileParticipantConfig {
        FileParticipantConfig {
            name: "Ada".to_string(),
            role: role.to_string(),
            decide: decide.to_string(),
            ..FileParticipantConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let p = FileParticipantConfig::default();
        assert_eq!(p.parse_role().0, FileRole::Speaker);
        assert_eq!(p.parse_policy().0, DecisionPolicy::Exhausted);
        assert_eq!(p.parse_pronouns().0, Pronouns::default());
        assert_eq!(p.parse_rule().0, QuorumRule::Unanimous);
        assert!(!p.is_group());
    }

    #[test]
    fn test_valid_values_parse_cleanly() {
        let p = participant("Evaluator", "after:2");
        let (role, issues) = p.parse_role();
        assert_eq!(role, FileRole::Evaluator);
        assert!(issues.is_empty());

        let (policy, issues) = p.parse_policy();
        assert_eq!(policy, DecisionPolicy::After(2));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_invalid_role_is_reported() {
        let (role, issues) = participant("moderator", "always").parse_role();
        assert_eq!(role, FileRole::Speaker);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        match &issues[0].code {
            ConfigIssueCode::InvalidEnumValue { field, value, .. } => {
                assert_eq!(field, "participants.Ada.role");
                assert_eq!(value, "moderator");
            }
            other => panic!("unexpected code: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_pronouns_and_rule_are_reported() {
        let p = FileParticipantConfig {
            name: "Panel".to_string(),
            pronouns: Some("they".to_string()),
            rule: Some("most".to_string()),
            members: vec!["Ada".to_string()],
            ..FileParticipantConfig::default()
        };

        assert_eq!(p.parse_pronouns().1.len(), 1);
        assert_eq!(p.parse_rule().1.len(), 1);
        assert!(p.is_group());
    }
}
