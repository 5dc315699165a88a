//! Turning a validated [`FileConfig`] into live participants.

use super::file_config::{FileConfig, FileParticipantConfig, FileRole};
use crate::participants::ScriptedParticipant;
use conclave_application::{Participant, ParticipantGroup, TerminationQuery};
use conclave_domain::ConfigIssue;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// The configuration could not be turned into a cast
#[derive(Error, Debug)]
#[error("configuration has {} error(s)", .issues.len())]
pub struct CastError {
    pub issues: Vec<ConfigIssue>,
}

/// Everyone taking part in a configured session
#[derive(Default)]
pub struct Cast {
    /// Joined as speakers, in config order
    pub speakers: Vec<Arc<dyn Participant>>,
    /// Joined as bystanders, in config order
    pub bystanders: Vec<Arc<dyn Participant>>,
    /// Termination queries, in config order
    pub queries: Vec<TerminationQuery>,
    /// Participants with a debate position, in config order
    pub positions: Vec<(Arc<dyn Participant>, String)>,
    participants: HashMap<String, Arc<dyn Participant>>,
}

impl Cast {
    /// Build the cast, failing if validation reports any error.
    ///
    /// Warnings are not fatal; callers that want to show them should call
    /// [`FileConfig::validate`] themselves.
    pub fn from_config(config: &FileConfig) -> Result<Self, CastError> {
        let issues: Vec<ConfigIssue> = config
            .validate()
            .into_iter()
            .filter(ConfigIssue::is_error)
            .collect();
        if !issues.is_empty() {
            return Err(CastError { issues });
        }

        let mut cast = Cast::default();

        let (groups, individuals): (Vec<_>, Vec<_>) =
            config.participants.iter().partition(|p| p.is_group());
        for entry in individuals {
            let participant = scripted(entry);
            cast.participants.insert(entry.name.clone(), participant);
        }
        for entry in groups {
            let members = entry
                .members
                .iter()
                .filter_map(|name| cast.participants.get(name).cloned())
                .collect();
            let group = ParticipantGroup::new(members)
                .with_name(entry.name.as_str())
                .with_rule(entry.parse_rule().0);
            debug!("Built group {} ({})", entry.name, group.rule());
            cast.participants.insert(entry.name.clone(), Arc::new(group));
        }

        for entry in &config.participants {
            let Some(participant) = cast.participants.get(&entry.name).cloned() else {
                continue;
            };
            if let Some(position) = &entry.position {
                cast.positions.push((Arc::clone(&participant), position.clone()));
            }
            match entry.parse_role().0 {
                FileRole::Speaker => cast.speakers.push(participant),
                FileRole::Bystander => cast.bystanders.push(participant),
                FileRole::Evaluator | FileRole::Member => {}
            }
        }

        cast.queries = config
            .queries
            .iter()
            .map(|query| {
                let evaluators = query
                    .evaluators
                    .iter()
                    .filter_map(|name| cast.participants.get(name).cloned());
                TerminationQuery::each(evaluators, query.prompt.clone())
            })
            .collect();

        Ok(cast)
    }

    /// Look up any configured participant by name, joined or not
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Participant>> {
        self.participants.get(name)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

fn scripted(entry: &FileParticipantConfig) -> Arc<dyn Participant> {
    Arc::new(
        ScriptedParticipant::new(entry.name.as_str(), entry.lines.iter().cloned())
            .with_policy(entry.parse_policy().0)
            .with_pronouns(entry.parse_pronouns().0),
    )
}
