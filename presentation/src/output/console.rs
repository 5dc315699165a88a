//! Console output formatter for conversation transcripts

use colored::Colorize;
use conclave_domain::{Message, MessageLog, TerminationOutcome};

/// Formats a finished conversation for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete transcript with a closing summary
    pub fn format(title: &str, log: &MessageLog, outcomes: &[TerminationOutcome]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(title));
        output.push('\n');

        output.push_str(&Self::section_header("Transcript"));
        for message in log {
            output.push_str(&Self::format_message(message));
            output.push('\n');
        }

        if !outcomes.is_empty() {
            output.push_str(&Self::section_header("Outcome"));
            for outcome in outcomes {
                let line = if outcome.is_converged() {
                    outcome.to_string().green()
                } else {
                    outcome.to_string().yellow()
                };
                output.push_str(&format!("  * {}\n", line));
            }
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Messages:".cyan().bold(),
            log.len()
        ));
        output.push_str(&Self::footer());

        output
    }

    /// One line per message; system announcements are dimmed
    pub fn format_message(message: &Message) -> String {
        let body = message.payload().summary();
        if message.is_system() {
            format!("{}", format!("{}: {}", message.sender(), body).dimmed())
        } else {
            let body = Self::indent(&body, "  ");
            format!(
                "{} {}",
                format!("{}:", message.sender()).yellow().bold(),
                body.trim_start()
            )
        }
    }

    /// Plain `sender: text` lines, no color
    pub fn format_plain(log: &MessageLog) -> String {
        log.to_transcript(false)
    }

    /// Format as JSON transcript records
    pub fn format_json(log: &MessageLog) -> String {
        serde_json::to_string_pretty(&log.to_serializable()).unwrap_or_else(|_| "[]".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
