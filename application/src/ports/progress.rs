//! Progress notification port
//!
//! Defines the interface for reporting progress while a session runs.

use conclave_domain::{Message, ParticipantId, TerminationOutcome, Verdict};

/// Callback for progress updates during a session
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bars, etc.)
pub trait SessionProgress: Send + Sync {
    /// Called before the speakers of a round are asked to produce
    fn on_round_start(&self, _round: usize, _speakers: &[ParticipantId]) {}

    /// Called after a message has been appended to the log
    fn on_message(&self, _message: &Message) {}

    /// Called after each termination query is answered
    fn on_evaluation(&self, _round: usize, _verdict: &Verdict) {}

    /// Called when every speaker has had its turn
    fn on_round_complete(&self, _round: usize) {}

    /// Called when a termination check finishes
    fn on_outcome(&self, _outcome: &TerminationOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SessionProgress for NoProgress {}
