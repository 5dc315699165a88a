//! Application-level configuration.
//!
//! - [`SessionParams`]: session loop control (round cap, checkpoints,
//!   framing messages)

pub mod session_params;

pub use session_params::{DEFAULT_EARLY_TERMINATION_NOTICE, SessionParams};
