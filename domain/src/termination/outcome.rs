//! Termination outcomes and states

use serde::{Deserialize, Serialize};

/// How a `converse_until_done` run ended
///
/// Hitting the round cap is an ordinary outcome, not an error; callers decide
/// whether it counts as failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TerminationOutcome {
    /// Every query answered yes within one round
    Converged { rounds: usize },
    /// The round cap was reached without convergence
    RoundCapExceeded { rounds: usize },
}

impl TerminationOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, TerminationOutcome::Converged { .. })
    }

    /// Number of rounds that were executed
    pub fn rounds(&self) -> usize {
        match self {
            TerminationOutcome::Converged { rounds }
            | TerminationOutcome::RoundCapExceeded { rounds } => *rounds,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationOutcome::Converged { .. } => "converged",
            TerminationOutcome::RoundCapExceeded { .. } => "round_cap_exceeded",
        }
    }
}

impl std::fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationOutcome::Converged { rounds } => {
                write!(f, "Converged after {} round(s)", rounds)
            }
            TerminationOutcome::RoundCapExceeded { rounds } => {
                write!(f, "Round cap exceeded after {} round(s)", rounds)
            }
        }
    }
}

/// Lifecycle of a termination check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationState {
    /// Still going; `round` is the number of rounds started so far
    Running { round: usize },
    Converged,
    RoundCapExceeded,
}

impl TerminationState {
    pub fn is_running(&self) -> bool {
        matches!(self, TerminationState::Running { .. })
    }
}

impl From<TerminationOutcome> for TerminationState {
    fn from(outcome: TerminationOutcome) -> Self {
        match outcome {
            TerminationOutcome::Converged { .. } => TerminationState::Converged,
            TerminationOutcome::RoundCapExceeded { .. } => TerminationState::RoundCapExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            TerminationOutcome::Converged { rounds: 1 }.to_string(),
            "Converged after 1 round(s)"
        );
        assert_eq!(
            TerminationOutcome::RoundCapExceeded { rounds: 5 }.to_string(),
            "Round cap exceeded after 5 round(s)"
        );
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(TerminationOutcome::RoundCapExceeded { rounds: 3 }).unwrap();
        assert_eq!(json["status"], "round_cap_exceeded");
        assert_eq!(json["rounds"], 3);
    }

    #[test]
    fn test_state_from_outcome() {
        assert_eq!(
            TerminationState::from(TerminationOutcome::Converged { rounds: 2 }),
            TerminationState::Converged
        );
        assert!(!TerminationState::RoundCapExceeded.is_running());
        assert!(TerminationState::Running { round: 0 }.is_running());
    }
}
