//! Round accounting for termination checks
//!
//! [`RoundTracker`] owns the bookkeeping of a `converse_until_done` run so
//! that the round cap and the convergence rule can be tested without any
//! participants.

use super::evaluation::{EvaluationRound, Verdict};
use super::outcome::{TerminationOutcome, TerminationState};

/// State machine for one termination check
#[derive(Debug, Clone)]
pub struct RoundTracker {
    max_rounds: usize,
    expected: usize,
    rounds_run: usize,
    state: TerminationState,
    current: Option<EvaluationRound>,
    history: Vec<EvaluationRound>,
}

impl RoundTracker {
    /// Track a check of `expected` queries per round, capped at `max_rounds`.
    ///
    /// A cap of zero is exceeded before any round runs.
    pub fn new(max_rounds: usize, expected: usize) -> Self {
        let state = if max_rounds == 0 {
            TerminationState::RoundCapExceeded
        } else {
            TerminationState::Running { round: 0 }
        };

        Self {
            max_rounds,
            expected,
            rounds_run: 0,
            state,
            current: None,
            history: Vec::new(),
        }
    }

    /// Start the next round, returning its 1-indexed number.
    ///
    /// Returns `None` once the check has finished.
    pub fn begin_round(&mut self) -> Option<usize> {
        if !self.state.is_running() || self.rounds_run >= self.max_rounds {
            return None;
        }

        self.rounds_run += 1;
        self.state = TerminationState::Running {
            round: self.rounds_run,
        };
        self.current = Some(EvaluationRound::new(self.rounds_run, self.expected));
        Some(self.rounds_run)
    }

    /// Record a verdict; returns whether the remaining queries should be asked.
    pub fn record(&mut self, verdict: Verdict) -> bool {
        let approved = verdict.approved;
        if let Some(current) = self.current.as_mut() {
            current.verdicts.push(verdict);
        }
        approved
    }

    /// Close the current round and report the outcome if the check is over.
    pub fn finish_round(&mut self) -> Option<TerminationOutcome> {
        let round = self.current.take()?;
        let converged = round.converged();
        self.history.push(round);

        let outcome = if converged {
            Some(TerminationOutcome::Converged {
                rounds: self.rounds_run,
            })
        } else if self.rounds_run >= self.max_rounds {
            Some(TerminationOutcome::RoundCapExceeded {
                rounds: self.rounds_run,
            })
        } else {
            None
        };

        if let Some(outcome) = outcome {
            self.state = outcome.into();
        }
        outcome
    }

    /// The final outcome, once there is one
    pub fn outcome(&self) -> Option<TerminationOutcome> {
        match self.state {
            TerminationState::Running { .. } => None,
            TerminationState::Converged => Some(TerminationOutcome::Converged {
                rounds: self.rounds_run,
            }),
            TerminationState::RoundCapExceeded => Some(TerminationOutcome::RoundCapExceeded {
                rounds: self.rounds_run,
            }),
        }
    }

    pub fn state(&self) -> TerminationState {
        self.state
    }

    pub fn rounds_run(&self) -> usize {
        self.rounds_run
    }

    pub fn history(&self) -> &[EvaluationRound] {
        &self.history
    }

    /// The round in progress, if any
    pub fn current(&self) -> Option<&EvaluationRound> {
        self.current.as_ref()
    }

    pub fn into_history(self) -> Vec<EvaluationRound> {
        self.history
    }
}
