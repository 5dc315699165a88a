//! Core domain concepts shared across all subdomains.
//!
//! - [`identity::SessionIdentity`]: name under which a session is recorded
//! - [`participant::ParticipantId`]: identity of a conversation participant
//! - [`participant::Pronouns`]: cosmetic pronouns for generated text
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod identity;
pub mod participant;
pub mod string;
