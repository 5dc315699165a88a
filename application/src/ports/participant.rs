//! Participant capability port
//!
//! Defines the interface the session uses to talk to anything that takes
//! part in a conversation: a language model, a scripted bot, a human at a
//! terminal, or a group of other participants.

use async_trait::async_trait;
use conclave_domain::{Message, ParticipantId, Pronouns};
use thiserror::Error;

/// Errors that can occur while a participant acts
#[derive(Error, Debug)]
pub enum ParticipantError {
    #[error("Failed to produce a message: {0}")]
    Produce(String),

    #[error("Failed to receive a message: {0}")]
    Receive(String),

    #[error("Failed to decide: {0}")]
    Decide(String),

    #[error("{0}")]
    Other(String),
}

/// A conversation participant
///
/// The session calls these methods strictly one at a time per session, so
/// implementations only need interior mutability, not their own ordering.
#[async_trait]
pub trait Participant: Send + Sync {
    /// Stable identity, unique within a session
    fn id(&self) -> &ParticipantId;

    /// Pronouns used when other text refers to this participant
    fn pronouns(&self) -> Pronouns {
        Pronouns::default()
    }

    /// Produce this participant's contribution for the current round.
    ///
    /// `None` means the participant has nothing to say this round.
    async fn produce(&self) -> Result<Option<Message>, ParticipantError>;

    /// Observe a message broadcast to the conversation.
    async fn receive(&self, message: &Message) -> Result<(), ParticipantError>;

    /// Answer a yes/no question.
    ///
    /// With `remember == false` the question must not become part of what the
    /// participant considers the conversation.
    async fn decide(&self, prompt: &str, remember: bool) -> Result<bool, ParticipantError>;
}
