//! Conversation membership.
//!
//! - [`registry::MembershipRegistry`]: speakers, bystanders and evaluators
//! - [`registry::JoinRequest`]: who joins in which [`registry::Role`]

pub mod registry;

pub use registry::{JoinRequest, MembershipRegistry, Role};
