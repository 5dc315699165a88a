//! Rules for folding several yes/no decisions into one
//!
//! Used when a group of participants answers a termination query as a
//! single voice.

use serde::{Deserialize, Serialize};

/// How many member approvals a group decision needs
///
/// - `Majority`: more than half
/// - `Unanimous`: every member (default for groups)
/// - `AtLeast(n)`: at least n members
/// - `Percentage(p)`: at least p% of members, rounded up
///
/// # Example
///
/// ```
/// use conclave_domain::quorum::QuorumRule;
///
/// assert!(QuorumRule::Majority.is_satisfied(2, 3));
/// assert!(!QuorumRule::Unanimous.is_satisfied(2, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    Majority,
    #[default]
    Unanimous,
    AtLeast(usize),
    Percentage(u8),
}

impl QuorumRule {
    /// Whether `approvals` out of `total` satisfies the rule.
    ///
    /// An empty electorate never satisfies any rule.
    pub fn is_satisfied(&self, approvals: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        approvals >= self.min_approvals_needed(total)
    }

    pub fn min_approvals_needed(&self, total: usize) -> usize {
        match self {
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }

    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all must agree)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} in favour", n),
            QuorumRule::Percentage(p) => format!("at least {}% in favour", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                if p > 100 {
                    return Err(format!("Percentage out of range: {}", p));
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(format!(
                "Unknown quorum rule: {}. Valid: majority, unanimous, atleast:N, percentage:N or N%",
                s
            )),
        }
    }
}
