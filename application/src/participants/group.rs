//! Participant groups
//!
//! A [`ParticipantGroup`] takes part in a conversation as a single
//! participant on behalf of its members. Members hear everything the group
//! hears, the group speaks with the first thing a member says, and its
//! decisions are a vote among the members.

use crate::ports::participant::{Participant, ParticipantError};
use async_trait::async_trait;
use conclave_domain::{Message, ParticipantId, QuorumRule, Vote, VoteResult, english_join};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

/// Composite participant
pub struct ParticipantGroup {
    id: ParticipantId,
    members: Vec<Arc<dyn Participant>>,
    rule: QuorumRule,
}

impl ParticipantGroup {
    /// Group named after its members, e.g. "Ada, Grace and Linus"
    pub fn new(members: Vec<Arc<dyn Participant>>) -> Self {
        let name = english_join(members.iter().map(|m| m.id().as_str()));
        Self {
            id: ParticipantId::new(name),
            members,
            rule: QuorumRule::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<ParticipantId>) -> Self {
        self.id = name.into();
        self
    }

    pub fn with_rule(mut self, rule: QuorumRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn members(&self) -> &[Arc<dyn Participant>] {
        &self.members
    }

    pub fn rule(&self) -> QuorumRule {
        self.rule
    }

    /// Poll every member in order and tally the votes.
    pub async fn poll(&self, prompt: &str, remember: bool) -> Result<VoteResult, ParticipantError> {
        let mut votes = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let approved = member.decide(prompt, remember).await?;
            votes.push(Vote::new(member.id().clone(), approved));
        }
        Ok(VoteResult::tally(votes, self.rule))
    }
}

#[async_trait]
impl Participant for ParticipantGroup {
    fn id(&self) -> &ParticipantId {
        &self.id
    }

    async fn produce(&self) -> Result<Option<Message>, ParticipantError> {
        for member in &self.members {
            if let Some(message) = member.produce().await? {
                debug!("{} speaks for {}", member.id(), self.id);
                return Ok(Some(message.reattributed(self.id.clone())));
            }
        }
        Ok(None)
    }

    async fn receive(&self, message: &Message) -> Result<(), ParticipantError> {
        try_join_all(self.members.iter().map(|member| member.receive(message))).await?;
        Ok(())
    }

    async fn decide(&self, prompt: &str, remember: bool) -> Result<bool, ParticipantError> {
        let result = self.poll(prompt, remember).await?;
        debug!(
            "{} voted {} under {} -> {}",
            self.id,
            result.vote_summary(),
            self.rule,
            if result.passed { "yes" } else { "no" }
        );
        Ok(result.passed)
    }
}
