//! Progress reporting while a session runs

use colored::Colorize;
use conclave_application::SessionProgress;
use conclave_domain::{Message, ParticipantId, TerminationOutcome, Verdict, english_join};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with a spinner per round
pub struct ProgressReporter {
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} [{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.round_bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProgress for ProgressReporter {
    fn on_round_start(&self, round: usize, speakers: &[ParticipantId]) {
        let bar = ProgressBar::new(speakers.len() as u64);
        bar.set_style(Self::round_style());
        bar.set_prefix(format!("Round {}", round));
        bar.set_message("Starting...");

        if let Ok(mut guard) = self.round_bar.lock() {
            if let Some(previous) = guard.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_message(&self, message: &Message) {
        if message.is_system() {
            return;
        }
        self.with_bar(|bar| {
            bar.set_message(format!("{} {}", "v".green(), message.sender()));
            bar.inc(1);
        });
    }

    fn on_evaluation(&self, _round: usize, verdict: &Verdict) {
        let answer = if verdict.approved {
            "yes".green()
        } else {
            "no".red()
        };
        self.with_bar(|bar| bar.set_message(format!("{} says {}", verdict.evaluator, answer)));
    }

    fn on_round_complete(&self, round: usize) {
        if let Ok(mut guard) = self.round_bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_with_message(format!("{}", format!("Round {} complete!", round).green()));
            }
        }
    }

    fn on_outcome(&self, outcome: &TerminationOutcome) {
        if let Ok(mut guard) = self.round_bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
        if outcome.is_converged() {
            eprintln!("{} {}", "->".cyan(), outcome.to_string().green());
        } else {
            eprintln!("{} {}", "->".cyan(), outcome.to_string().yellow());
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SessionProgress for SimpleProgress {
    fn on_round_start(&self, round: usize, speakers: &[ParticipantId]) {
        let names = english_join(speakers.iter().map(ParticipantId::as_str));
        println!(
            "{} {} ({})",
            "->".cyan(),
            format!("Round {}", round).bold(),
            if names.is_empty() { "nobody" } else { names.as_str() }
        );
    }

    fn on_evaluation(&self, _round: usize, verdict: &Verdict) {
        if verdict.approved {
            println!("  {} {}", "v".green(), verdict.evaluator);
        } else {
            println!("  {} {} (not yet)", "x".red(), verdict.evaluator);
        }
    }

    fn on_round_complete(&self, _round: usize) {
        println!();
    }

    fn on_outcome(&self, outcome: &TerminationOutcome) {
        println!("{} {}", "=>".cyan(), outcome);
    }
}
