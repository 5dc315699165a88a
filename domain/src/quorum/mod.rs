//! Quorum voting primitives
//!
//! A group of participants can answer a termination query as one voice.
//! Each member votes; a [`QuorumRule`] decides whether the group agrees.

pub mod rule;
pub mod vote;

pub use rule::QuorumRule;
pub use vote::{Vote, VoteResult};
