//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How the transcript is printed when the session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored transcript with a summary
    Full,
    /// Plain `sender: text` lines
    Plain,
    /// The JSON transcript records
    Json,
}

/// What the session does once it is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Activity {
    /// Converse until the configured queries are satisfied, or for a fixed
    /// number of rounds when there are none
    #[default]
    Converse,
    /// Brainstorm on --topic until the speakers are done
    Brainstorm,
    /// Discuss --topic until the speakers agree, then collect final thoughts
    Consensus,
    /// Work through every --topic as an agenda item
    Meeting,
    /// Debate --topic between participants with a configured position
    Debate,
    /// Negotiate --topic among the speakers for a fixed number of rounds
    Negotiation,
    /// --author presents the --topic work and the other speakers review it
    PeerReview,
    /// Every --questioner asks and the other speakers answer until the
    /// questioners are satisfied
    QuestionAndAnswer,
    /// Chat among the speakers for a fixed number of rounds
    Casual,
}

/// CLI arguments for conclave
#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(author, version, about = "Run a turn-based conversation between participants")]
#[command(long_about = r#"
Conclave runs a round-robin conversation between configured participants.

Every round each speaker says something, and everyone in the session hears it.
After each round the configured evaluators are asked whether the conversation
is done; the first "no" moves on to the next round, and --max-rounds bounds
the whole run.

Configuration files are loaded from (in priority order):
1. CONCLAVE_* environment variables
2. --config <path>     Explicit config file
3. ./conclave.toml     Project-level config
4. ~/.config/conclave/config.toml   Global config

Example:
  conclave --config standup.toml
  conclave --activity brainstorm --topic "release names" --max-rounds 5
  conclave --activity meeting --topic "budget" --topic "hiring"
  conclave --activity peer-review --topic "the parser" --author Ada
  conclave --activity question-and-answer --questioner Grace
  conclave --replay conversations/standup/conversation.json
"#)]
pub struct Cli {
    /// Activity to run
    #[arg(short, long, value_enum, default_value = "converse")]
    pub activity: Activity,

    /// Topic of the activity (repeat for meeting agenda items)
    #[arg(short, long, value_name = "TOPIC")]
    pub topic: Vec<String>,

    /// Participant who presents the work in a peer review (default: first speaker)
    #[arg(long, value_name = "NAME")]
    pub author: Option<String>,

    /// Participant asking questions in a Q&A session (repeatable)
    #[arg(long, value_name = "NAME")]
    pub questioner: Vec<String>,

    /// Session name (overrides config)
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Run exactly this many rounds, ignoring termination queries
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Round cap for termination checks (overrides config)
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Print a saved JSON transcript and exit
    #[arg(long, value_name = "PATH")]
    pub replay: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Directory for transcripts (overrides config)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write daily-rotated trace logs to this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Tracing filter directive for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace", // -vvv or more
        }
    }
}
