//! Participant adapters

mod scripted;

pub use scripted::{DecisionPolicy, ScriptedParticipant};
