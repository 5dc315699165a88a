//! Session configuration from TOML (`[session]` section)

use conclave_application::SessionParams;
use serde::{Deserialize, Serialize};

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Session name; also names the output directory
    pub name: String,
    /// Directory transcripts are written under
    pub output_dir: String,
    /// Round cap for termination checks
    pub max_rounds: usize,
    /// Fixed number of rounds when no queries are configured
    pub rounds: Option<usize>,
    /// Post each termination answer as a message
    pub echo_decisions: bool,
    /// Persist every N rounds
    pub checkpoint_every: Option<usize>,
    pub initial_message: Option<String>,
    pub final_message: Option<String>,
    pub early_termination_notice: Option<String>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            name: "conversation".to_string(),
            output_dir: "conversations".to_string(),
            max_rounds: 10,
            rounds: None,
            echo_decisions: false,
            checkpoint_every: None,
            initial_message: None,
            final_message: None,
            early_termination_notice: None,
        }
    }
}

impl FileSessionConfig {
    pub fn to_params(&self) -> SessionParams {
        let mut params = SessionParams::default()
            .with_max_rounds(self.max_rounds)
            .with_echo_decisions(self.echo_decisions)
            .with_checkpoint_every(self.checkpoint_every);
        if let Some(message) = &self.initial_message {
            params = params.with_initial_message(message);
        }
        if let Some(message) = &self.final_message {
            params = params.with_final_message(message);
        }
        if let Some(notice) = &self.early_termination_notice {
            params = params.with_early_termination_notice(notice);
        }
        params
    }

    /// Rounds to run when conversing without termination queries
    pub fn fixed_rounds(&self) -> usize {
        self.rounds.unwrap_or(self.max_rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_params() {
        let config = FileSessionConfig {
            max_rounds: 4,
            echo_decisions: true,
            checkpoint_every: Some(2),
            final_message: Some("bye".to_string()),
            ..FileSessionConfig::default()
        };

        let params = config.to_params();
        assert_eq!(params.max_rounds, 4);
        assert!(params.echo_decisions);
        assert_eq!(params.checkpoint_every, Some(2));
        assert_eq!(params.final_message.as_deref(), Some("bye"));
        assert!(params.initial_message.is_none());
    }

    #[test]
    fn test_fixed_rounds_falls_back_to_cap() {
        let mut config = FileSessionConfig::default();
        assert_eq!(config.fixed_rounds(), 10);
        config.rounds = Some(2);
        assert_eq!(config.fixed_rounds(), 2);
    }
}
