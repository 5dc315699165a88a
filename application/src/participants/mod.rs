//! Participants built from other participants

pub mod group;

pub use group::ParticipantGroup;
