//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; enum-like fields stay strings here and are
//! parsed (and reported on) by [`FileConfig::validate`].

mod output;
mod participants;
mod session;

pub use output::{FileOutputConfig, FileOutputFormat};
pub use participants::{FileParticipantConfig, FileQueryConfig, FileRole};
pub use session::FileSessionConfig;

use conclave_domain::{ConfigIssue, ConfigIssueCode, ParticipantId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Session settings
    pub session: FileSessionConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Everyone who can take part
    pub participants: Vec<FileParticipantConfig>,
    /// Termination queries asked after every round
    pub queries: Vec<FileQueryConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Duplicate, reserved and blank participant names
    /// 2. Enum parse failures (role, decide, pronouns, rule)
    /// 3. Group members and query evaluators that name no participant
    /// 4. Speakers with nothing to say, and sessions with no speaker
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Names
        let mut seen = HashSet::new();
        for participant in &self.participants {
            if participant.name.trim().is_empty() || participant.name == ParticipantId::SYSTEM {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ReservedName {
                        name: participant.name.clone(),
                    },
                    format!(
                        "participant name '{}' is reserved for session announcements",
                        participant.name
                    ),
                ));
            }
            if !seen.insert(participant.name.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateParticipant {
                        name: participant.name.clone(),
                    },
                    format!("participant '{}' is defined more than once", participant.name),
                ));
            }
        }

        // 2. Enum parse validation
        for participant in &self.participants {
            issues.extend(participant.parse_role().1);
            issues.extend(participant.parse_policy().1);
            issues.extend(participant.parse_pronouns().1);
            issues.extend(participant.parse_rule().1);
        }

        // 3. References
        for participant in self.participants.iter().filter(|p| p.is_group()) {
            for member in &participant.members {
                if !seen.contains(member.as_str()) || member == &participant.name {
                    issues.push(unknown_participant(
                        member,
                        format!("group '{}'", participant.name),
                    ));
                }
            }
        }
        for (i, query) in self.queries.iter().enumerate() {
            for evaluator in &query.evaluators {
                if !seen.contains(evaluator.as_str()) {
                    issues.push(unknown_participant(evaluator, format!("queries[{}]", i)));
                }
            }
        }

        // 4. Speakers, counting only roles that parsed
        let roles: Vec<Result<FileRole, String>> =
            self.participants.iter().map(|p| p.role.parse()).collect();
        let speakers: Vec<&FileParticipantConfig> = self
            .participants
            .iter()
            .zip(&roles)
            .filter(|(_, role)| matches!(role, Ok(FileRole::Speaker)))
            .map(|(p, _)| p)
            .collect();
        for speaker in speakers.iter().filter(|p| !p.is_group() && p.lines.is_empty()) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyScript {
                    name: speaker.name.clone(),
                },
                format!("speaker '{}' has no lines and will stay silent", speaker.name),
            ));
        }
        if !self.participants.is_empty() && speakers.is_empty() && roles.iter().all(Result::is_ok) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoSpeakers,
                "no participant has the speaker role; rounds will be empty",
            ));
        }

        issues
    }
}

fn unknown_participant(name: &str, referrer: String) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::UnknownParticipant {
            name: name.to_string(),
        },
        format!("{} refers to unknown participant '{}'", referrer, name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::Severity;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[session]
name = "Design Review"
max_rounds = 4
echo_decisions = true

[output]
formats = ["markdown"]

[[participants]]
name = "Ada"
pronouns = "she/her"
lines = ["Let's cache it.", "Fine by me."]

[[participants]]
name = "Linus"
lines = ["Caching is hard."]
decide = "after:2"

[[participants]]
name = "Observer"
role = "bystander"

[[queries]]
evaluators = ["Ada", "Linus"]
prompt = "Have we agreed?"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.name, "Design Review");
        assert_eq!(config.session.max_rounds, 4);
        assert!(config.session.echo_decisions);
        assert_eq!(config.output.formats, vec![FileOutputFormat::Markdown]);
        assert_eq!(config.participants.len(), 3);
        assert_eq!(config.participants[1].decide, "after:2");
        assert_eq!(config.participants[2].role, "bystander");
        assert_eq!(config.queries[0].evaluators, vec!["Ada", "Linus"]);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[session]
rounds = 3
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.rounds, Some(3));
        // Defaults should apply
        assert_eq!(config.session.name, "conversation");
        assert_eq!(config.output.formats, vec![FileOutputFormat::Json]);
        assert!(config.participants.is_empty());
    }

    #[test]
    fn test_validate_default_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let toml_str = r#"
[[participants]]
name = "Ada"
role = "chair"

[[participants]]
name = "Ada"
lines = ["hi"]

[[participants]]
name = "Panel"
members = ["Ada", "Ghost"]

[[queries]]
evaluators = ["Nobody"]
prompt = "Done?"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        let codes: Vec<&ConfigIssueCode> = issues.iter().map(|i| &i.code).collect();

        assert!(codes.contains(&&ConfigIssueCode::DuplicateParticipant {
            name: "Ada".to_string()
        }));
        assert!(codes.contains(&&ConfigIssueCode::UnknownParticipant {
            name: "Ghost".to_string()
        }));
        assert!(codes.contains(&&ConfigIssueCode::UnknownParticipant {
            name: "Nobody".to_string()
        }));
        assert!(codes
            .iter()
            .any(|c| matches!(c, ConfigIssueCode::InvalidEnumValue { value, .. } if value == "chair")));
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn test_unknown_role_is_not_treated_as_speaker() {
        let config = FileConfig {
            participants: vec![FileParticipantConfig {
                name: "Ada".to_string(),
                role: "chair".to_string(),
                ..FileParticipantConfig::default()
            }],
            ..FileConfig::default()
        };

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::InvalidEnumValue { value, .. } if value == "chair"
        ));
    }

    #[test]
    fn test_validate_rejects_reserved_names() {
        let config = FileConfig {
            participants: vec![
                FileParticipantConfig {
                    name: "System".to_string(),
                    lines: vec!["I am the session".to_string()],
                    ..FileParticipantConfig::default()
                },
                FileParticipantConfig {
                    name: "  ".to_string(),
                    lines: vec!["hello?".to_string()],
                    ..FileParticipantConfig::default()
                },
                FileParticipantConfig {
                    name: "system".to_string(),
                    lines: vec!["lowercase is fine".to_string()],
                    ..FileParticipantConfig::default()
                },
            ],
            ..FileConfig::default()
        };

        let issues = config.validate();
        let reserved: Vec<&ConfigIssueCode> = issues
            .iter()
            .filter(|i| i.is_error())
            .map(|i| &i.code)
            .collect();
        assert_eq!(
            reserved,
            vec![
                &ConfigIssueCode::ReservedName {
                    name: "System".to_string()
                },
                &ConfigIssueCode::ReservedName {
                    name: "  ".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_validate_warns_about_silent_speakers() {
        let config = FileConfig {
            participants: vec![FileParticipantConfig {
                name: "Mute".to_string(),
                ..FileParticipantConfig::default()
            }],
            ..FileConfig::default()
        };

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert_eq!(
            issues[0].code,
            ConfigIssueCode::EmptyScript {
                name: "Mute".to_string()
            }
        );
    }

    #[test]
    fn test_validate_warns_without_speakers() {
        let config = FileConfig {
            participants: vec![FileParticipantConfig {
                name: "Judge".to_string(),
                role: "evaluator".to_string(),
                ..FileParticipantConfig::default()
            }],
            ..FileConfig::default()
        };

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::NoSpeakers);
    }
}
