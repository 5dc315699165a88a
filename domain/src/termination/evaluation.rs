//! Per-round evaluation records
//!
//! Each round of a termination check produces an [`EvaluationRound`]: the
//! verdicts that were actually asked for, and whether the round stopped
//! early on a "no".

use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One evaluator's answer to one query prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub evaluator: ParticipantId,
    pub prompt: String,
    pub approved: bool,
}

impl Verdict {
    pub fn new(evaluator: impl Into<ParticipantId>, prompt: impl Into<String>, approved: bool) -> Self {
        Self {
            evaluator: evaluator.into(),
            prompt: prompt.into(),
            approved,
        }
    }
}

/// The evaluation performed after one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRound {
    /// Round number (1-indexed)
    pub round: usize,
    /// Verdicts in query order, up to and including the first "no"
    pub verdicts: Vec<Verdict>,
    /// Number of queries this round was expected to evaluate
    pub expected: usize,
    pub timestamp: DateTime<Utc>,
}

impl EvaluationRound {
    pub fn new(round: usize, expected: usize) -> Self {
        Self {
            round,
            verdicts: Vec::new(),
            expected,
            timestamp: Utc::now(),
        }
    }

    /// Every expected query was asked and answered yes
    pub fn converged(&self) -> bool {
        self.verdicts.len() == self.expected && self.verdicts.iter().all(|v| v.approved)
    }

    /// The round stopped at a "no" before reaching the end of the queries
    pub fn short_circuited(&self) -> bool {
        self.verdicts.len() < self.expected && self.first_rejection().is_some()
    }

    pub fn first_rejection(&self) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| !v.approved)
    }

    /// Visual summary, e.g. "[●●○··]" where `·` marks skipped queries
    pub fn summary(&self) -> String {
        let mut summary = String::from("[");
        for verdict in &self.verdicts {
            summary.push(if verdict.approved { '●' } else { '○' });
        }
        for _ in self.verdicts.len()..self.expected {
            summary.push('·');
        }
        summary.push(']');
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_yes_converges() {
        let mut round = EvaluationRound::new(1, 2);
        round.verdicts.push(Verdict::new("a", "done?", true));
        round.verdicts.push(Verdict::new("b", "done?", true));

        assert!(round.converged());
        assert!(!round.short_circuited());
        assert_eq!(round.summary(), "[●●]");
    }

    #[test]
    fn test_first_no_short_circuits() {
        let mut round = EvaluationRound::new(2, 3);
        round.verdicts.push(Verdict::new("a", "done?", true));
        round.verdicts.push(Verdict::new("b", "done?", false));

        assert!(!round.converged());
        assert!(round.short_circuited());
        assert_eq!(round.first_rejection().unwrap().evaluator.as_str(), "b");
        assert_eq!(round.summary(), "[●○·]");
    }

    #[test]
    fn test_no_queries_converges() {
        assert!(EvaluationRound::new(1, 0).converged());
    }
}
