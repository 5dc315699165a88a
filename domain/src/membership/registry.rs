//! Membership registry
//!
//! Tracks who speaks, who only listens, and who is transiently asked to
//! judge whether the conversation is done. All views preserve registration
//! order because turn order is derived from them.

use crate::core::error::DomainError;
use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Persistent role of a conversation member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Produces a message every round
    Speaker,
    /// Receives broadcasts but never produces
    Bystander,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Speaker => "speaker",
            Role::Bystander => "bystander",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "speaker" => Ok(Role::Speaker),
            "bystander" => Ok(Role::Bystander),
            _ => Err(format!("Unknown role: {}. Valid: speaker, bystander", s)),
        }
    }
}

/// An ordered set of join requests, each naming a participant and a role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    entries: Vec<(ParticipantId, Role)>,
}

impl JoinRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speakers<I, P>(ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        Self::of(ids, Role::Speaker)
    }

    pub fn bystanders<I, P>(ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        Self::of(ids, Role::Bystander)
    }

    pub fn of<I, P>(ids: I, role: Role) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        Self {
            entries: ids.into_iter().map(|id| (id.into(), role)).collect(),
        }
    }

    pub fn with(mut self, id: impl Into<ParticipantId>, role: Role) -> Self {
        self.entries.push((id.into(), role));
        self
    }

    pub fn entries(&self) -> &[(ParticipantId, Role)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fail if any participant is requested as both speaker and bystander
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut conflicting: Vec<String> = Vec::new();

        for (id, role) in &self.entries {
            let clash = self
                .entries
                .iter()
                .any(|(other, other_role)| other == id && other_role != role);
            if clash && !conflicting.iter().any(|c| c == id.as_str()) {
                conflicting.push(id.to_string());
            }
        }

        if conflicting.is_empty() {
            Ok(())
        } else {
            Err(DomainError::AmbiguousRoleRequest(conflicting))
        }
    }
}

/// Speakers, bystanders and the transient evaluator overlay
///
/// A participant is never both a speaker and a bystander. Every mutating
/// method returns the participants whose state actually changed, so the
/// caller can announce the change exactly once.
#[derive(Debug, Clone, Default)]
pub struct MembershipRegistry {
    speakers: Vec<ParticipantId>,
    bystanders: Vec<ParticipantId>,
    evaluators: Vec<ParticipantId>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join participants in the requested roles.
    ///
    /// Joining as a speaker clears bystander status; joining as a bystander
    /// clears speaker status. Already-joined participants are skipped.
    pub fn join(&mut self, request: &JoinRequest) -> Result<Vec<ParticipantId>, DomainError> {
        request.validate()?;

        let mut changed = Vec::new();
        for (id, role) in request.entries() {
            if self.role_of(id) == Some(*role) {
                continue;
            }

            match role {
                Role::Speaker => {
                    remove(&mut self.bystanders, id);
                    self.speakers.push(id.clone());
                }
                Role::Bystander => {
                    remove(&mut self.speakers, id);
                    self.bystanders.push(id.clone());
                }
            }
            push_unique(&mut changed, id);
        }

        Ok(changed)
    }

    /// Remove participants from every role, including the evaluator overlay.
    ///
    /// Non-members are ignored.
    pub fn leave(&mut self, ids: &[ParticipantId]) -> Vec<ParticipantId> {
        let mut removed = Vec::new();
        for id in ids {
            let was_member = remove(&mut self.speakers, id)
                | remove(&mut self.bystanders, id)
                | remove(&mut self.evaluators, id);
            if was_member {
                push_unique(&mut removed, id);
            }
        }
        removed
    }

    /// Make participants bystanders.
    ///
    /// A speaker added as bystander stops speaking.
    pub fn add_bystanders(&mut self, ids: &[ParticipantId]) -> Vec<ParticipantId> {
        let mut added = Vec::new();
        for id in ids {
            if self.bystanders.contains(id) {
                continue;
            }
            remove(&mut self.speakers, id);
            self.bystanders.push(id.clone());
            push_unique(&mut added, id);
        }
        added
    }

    /// Drop bystander status; speaker status is never touched.
    pub fn remove_bystanders(&mut self, ids: &[ParticipantId]) -> Vec<ParticipantId> {
        let mut removed = Vec::new();
        for id in ids {
            if remove(&mut self.bystanders, id) {
                push_unique(&mut removed, id);
            }
        }
        removed
    }

    /// Install the evaluator overlay for one termination check
    pub fn begin_evaluation(&mut self, ids: &[ParticipantId]) {
        self.evaluators.clear();
        for id in ids {
            push_unique(&mut self.evaluators, id);
        }
    }

    /// Clear the evaluator overlay
    pub fn end_evaluation(&mut self) {
        self.evaluators.clear();
    }

    pub fn speakers(&self) -> &[ParticipantId] {
        &self.speakers
    }

    pub fn bystanders(&self) -> &[ParticipantId] {
        &self.bystanders
    }

    pub fn evaluators(&self) -> &[ParticipantId] {
        &self.evaluators
    }

    /// Speakers followed by bystanders
    pub fn all_participants(&self) -> Vec<ParticipantId> {
        self.speakers
            .iter()
            .chain(self.bystanders.iter())
            .cloned()
            .collect()
    }

    /// Everyone who receives a broadcast, each exactly once
    pub fn broadcast_targets(&self) -> Vec<ParticipantId> {
        let mut targets = self.all_participants();
        for id in &self.evaluators {
            push_unique(&mut targets, id);
        }
        targets
    }

    pub fn role_of(&self, id: &ParticipantId) -> Option<Role> {
        if self.speakers.contains(id) {
            Some(Role::Speaker)
        } else if self.bystanders.contains(id) {
            Some(Role::Bystander)
        } else {
            None
        }
    }

    /// Whether the participant is a speaker, bystander or active evaluator
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.role_of(id).is_some() || self.evaluators.contains(id)
    }
}

fn remove(list: &mut Vec<ParticipantId>, id: &ParticipantId) -> bool {
    let before = list.len();
    list.retain(|existing| existing != id);
    list.len() != before
}

fn push_unique(list: &mut Vec<ParticipantId>, id: &ParticipantId) {
    if !list.contains(id) {
        list.push(id.clone());
    }
}
