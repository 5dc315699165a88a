//! Votes cast by group members

use super::rule::QuorumRule;
use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// One member's answer to a yes/no question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: ParticipantId,
    pub approved: bool,
}

impl Vote {
    pub fn new(voter: impl Into<ParticipantId>, approved: bool) -> Self {
        Self {
            voter: voter.into(),
            approved,
        }
    }

    pub fn approve(voter: impl Into<ParticipantId>) -> Self {
        Self::new(voter, true)
    }

    pub fn reject(voter: impl Into<ParticipantId>) -> Self {
        Self::new(voter, false)
    }
}

/// Aggregate of a set of votes under a [`QuorumRule`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub passed: bool,
    pub approve_count: usize,
    pub reject_count: usize,
    pub rule: QuorumRule,
    pub votes: Vec<Vote>,
}

impl VoteResult {
    pub fn tally(votes: Vec<Vote>, rule: QuorumRule) -> Self {
        let approve_count = votes.iter().filter(|v| v.approved).count();
        let reject_count = votes.len() - approve_count;

        Self {
            passed: rule.is_satisfied(approve_count, votes.len()),
            approve_count,
            reject_count,
            rule,
            votes,
        }
    }

    pub fn total_votes(&self) -> usize {
        self.votes.len()
    }

    pub fn is_unanimous(&self) -> bool {
        self.approve_count == self.total_votes() || self.reject_count == self.total_votes()
    }

    /// Visual summary, e.g. "[●●○]"
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(if vote.approved { '●' } else { '○' });
        }
        summary.push(']');
        summary
    }

    pub fn dissenters(&self) -> impl Iterator<Item = &ParticipantId> {
        self.votes.iter().filter(|v| !v.approved).map(|v| &v.voter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_majority() {
        let result = VoteResult::tally(
            vec![Vote::approve("a"), Vote::approve("b"), Vote::reject("c")],
            QuorumRule::Majority,
        );
        assert!(result.passed);
        assert_eq!(result.approve_count, 2);
        assert_eq!(result.reject_count, 1);
        assert!(!result.is_unanimous());
        assert_eq!(result.vote_summary(), "[●●○]");
    }

    #[test]
    fn test_tally_unanimous_fails_on_dissent() {
        let result = VoteResult::tally(
            vec![Vote::approve("a"), Vote::reject("b")],
            QuorumRule::Unanimous,
        );
        assert!(!result.passed);
        let dissenters: Vec<_> = result.dissenters().map(|d| d.as_str()).collect();
        assert_eq!(dissenters, vec!["b"]);
    }
}
