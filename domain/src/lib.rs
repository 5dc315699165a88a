//! Domain layer for conclave
//!
//! This crate contains the core conversation model: messages and the
//! append-only log, participant membership, and the bookkeeping of
//! termination checks. It has no I/O and no async code; the application
//! layer drives it.
//!
//! # Core Concepts
//!
//! ## Message Log
//!
//! Every utterance, announcement and membership change ends up as a
//! [`Message`] in the session's [`MessageLog`]. The log is the authoritative
//! history: entries are appended, never edited or reordered.
//!
//! ## Membership
//!
//! - **Speakers** produce a message every round
//! - **Bystanders** receive every broadcast but never speak
//! - **Evaluators** are asked whether the activity is done, only while a
//!   termination check runs
//!
//! ## Termination
//!
//! After each round, evaluators answer their queries in order. The first
//! "no" ends that round's check; a round of only "yes" answers converges.
//! A round cap bounds the whole run.

pub mod config;
pub mod core;
pub mod membership;
pub mod message;
pub mod quorum;
pub mod termination;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{
    error::DomainError,
    identity::SessionIdentity,
    participant::{ParticipantId, Pronouns},
    string::{english_join, truncate},
};
pub use membership::{JoinRequest, MembershipRegistry, Role};
pub use message::{
    entities::Message,
    log::{LogRecord, LogSlice, MessageLog},
    payload::{MediaAsset, Payload, PayloadKind},
};
pub use quorum::{QuorumRule, Vote, VoteResult};
pub use termination::{
    EvaluationRound, RoundTracker, TerminationOutcome, TerminationState, Verdict,
};
