//! Session parameters: orchestration loop control.
//!
//! [`SessionParams`] groups the static parameters that control how a
//! [`ConversationSession`](crate::session::ConversationSession) runs. These
//! are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};

/// Default notice appended when a session is cancelled
pub const DEFAULT_EARLY_TERMINATION_NOTICE: &str = "The conversation was ended early.";

/// Session loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Round cap used by activities when none is given.
    pub max_rounds: usize,
    /// Post every termination decision as a "yes"/"no" message.
    pub echo_decisions: bool,
    /// Persist the log every N completed rounds.
    pub checkpoint_every: Option<usize>,
    /// System message posted when the session opens.
    pub initial_message: Option<String>,
    /// System message posted when the session closes, unless one is given.
    pub final_message: Option<String>,
    /// System message appended when the session is cancelled.
    pub early_termination_notice: String,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            echo_decisions: false,
            checkpoint_every: None,
            initial_message: None,
            final_message: None,
            early_termination_notice: DEFAULT_EARLY_TERMINATION_NOTICE.to_string(),
        }
    }
}

impl SessionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_echo_decisions(mut self, echo: bool) -> Self {
        self.echo_decisions = echo;
        self
    }

    pub fn with_checkpoint_every(mut self, rounds: Option<usize>) -> Self {
        self.checkpoint_every = rounds.filter(|&n| n > 0);
        self
    }

    pub fn with_initial_message(mut self, message: impl Into<String>) -> Self {
        self.initial_message = Some(message.into());
        self
    }

    pub fn with_final_message(mut self, message: impl Into<String>) -> Self {
        self.final_message = Some(message.into());
        self
    }

    pub fn with_early_termination_notice(mut self, notice: impl Into<String>) -> Self {
        self.early_termination_notice = notice.into();
        self
    }

    /// Whether a checkpoint is due after `rounds_completed` rounds
    pub fn checkpoint_due(&self, rounds_completed: usize) -> bool {
        match self.checkpoint_every {
            Some(every) if every > 0 => rounds_completed > 0 && rounds_completed % every == 0,
            _ => false,
        }
    }
}
