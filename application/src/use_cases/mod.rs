//! Use cases
//!
//! Application-level operations that orchestrate a session.

pub mod activities;
