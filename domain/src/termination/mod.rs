//! Termination protocol bookkeeping.
//!
//! After every round of a `converse_until_done` run the session asks its
//! evaluators, in order, whether the activity is finished. The first "no"
//! ends that round's evaluation; a round of only "yes" answers converges.
//!
//! ```text
//! Running ──all yes──▶ Converged
//!    │
//!    └──max_rounds reached──▶ RoundCapExceeded
//! ```

pub mod evaluation;
pub mod outcome;
pub mod tracker;

pub use evaluation::{EvaluationRound, Verdict};
pub use outcome::{TerminationOutcome, TerminationState};
pub use tracker::RoundTracker;
