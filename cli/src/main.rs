//! CLI entrypoint for conclave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use conclave_application::{
    ConversationLogger, ConversationSession, DurableSink, NoConversationLogger, NoProgress,
    Participant, SessionError, SessionProgress, activities,
};
use conclave_domain::{MessageLog, SessionIdentity, TerminationOutcome};
use conclave_infrastructure::{
    Cast, CompositeSink, ConfigLoader, FileConfig, FileOutputFormat, JsonFileSink,
    JsonlConversationLogger, MarkdownFileSink, TextFileSink, load_transcript,
};
use conclave_presentation::{Activity, Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli);

    info!("Starting conclave");

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    if let Some(path) = &cli.replay {
        return replay(path, cli.output);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);

    if !config.output.color {
        colored::control::set_override(false);
    }

    for issue in config.validate() {
        if issue.is_error() {
            eprintln!("{}", issue);
        } else {
            warn!("{}", issue.message);
        }
    }
    let cast = Cast::from_config(&config)?;
    let lineup = check_activity_inputs(&cli, &cast)?;

    // === Dependency Injection ===
    let identity = SessionIdentity::new(config.session.name.as_str());
    let output_dir = PathBuf::from(&config.session.output_dir);

    let sink = build_sink(&config, &output_dir);
    let logger: Arc<dyn ConversationLogger> = if config.output.event_log {
        match JsonlConversationLogger::for_session(&output_dir, &identity) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoConversationLogger),
        }
    } else {
        Arc::new(NoConversationLogger)
    };
    let progress: Arc<dyn SessionProgress> = if cli.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    // Ctrl-C ends the session at the next suspension point
    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut session = ConversationSession::builder(identity)
        .speakers(cast.speakers.iter().cloned())
        .bystanders(cast.bystanders.iter().cloned())
        .sink(sink)
        .logger(logger)
        .progress(progress)
        .params(config.session.to_params())
        .cancellation(shutdown.child_token())
        .open()
        .await?;

    let outcomes = match run_activity(&mut session, &cli, &config, &cast, &lineup).await {
        Ok(outcomes) => outcomes,
        Err(e) if e.is_cancelled() => {
            warn!("Session '{}' was cancelled", session.identity());
            Vec::new()
        }
        Err(e) => {
            if let Err(close_err) = session.close(None).await {
                warn!("Could not close session after error: {}", close_err);
            }
            return Err(e.into());
        }
    };

    session.close(None).await?;

    print_log(
        &session.identity().to_string(),
        session.log(),
        &outcomes,
        cli.output,
    );
    if !cli.quiet {
        eprintln!(
            "Transcript written under {}",
            output_dir.join(session.identity().slug()).display()
        );
    }

    Ok(())
}

fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "conclave.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    guard
}

fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(name) = &cli.name {
        config.session.name = name.clone();
    }
    if let Some(max_rounds) = cli.max_rounds {
        config.session.max_rounds = max_rounds;
    }
    if let Some(rounds) = cli.rounds {
        config.session.rounds = Some(rounds);
    }
    if let Some(dir) = &cli.output_dir {
        config.session.output_dir = dir.display().to_string();
    }
}

/// Participants an activity casts in a particular part
#[derive(Default)]
struct Lineup {
    author: Option<Arc<dyn Participant>>,
    reviewers: Vec<Arc<dyn Participant>>,
    questioners: Vec<Arc<dyn Participant>>,
    answerers: Vec<Arc<dyn Participant>>,
}

fn check_activity_inputs(cli: &Cli, cast: &Cast) -> Result<Lineup> {
    let mut lineup = Lineup::default();
    match cli.activity {
        Activity::Converse | Activity::Casual => {}
        Activity::Brainstorm | Activity::Consensus | Activity::Negotiation => {
            if cli.topic.is_empty() {
                bail!("--activity {:?} needs a --topic", cli.activity);
            }
        }
        Activity::Meeting => {
            if cli.topic.is_empty() {
                bail!("a meeting needs at least one --topic agenda item");
            }
        }
        Activity::Debate => {
            if cli.topic.is_empty() {
                bail!("a debate needs a --topic");
            }
            if cast.positions.is_empty() {
                bail!("a debate needs participants with a `position` in the config");
            }
        }
        Activity::PeerReview => {
            if cli.topic.is_empty() {
                bail!("a peer review needs the work under review as --topic");
            }
            let author = match &cli.author {
                Some(name) => cast
                    .get(name)
                    .cloned()
                    .with_context(|| format!("unknown --author '{}'", name))?,
                None => cast
                    .speakers
                    .first()
                    .cloned()
                    .context("a peer review needs at least one speaker")?,
            };
            lineup.reviewers = others(&cast.speakers, std::slice::from_ref(&author));
            if lineup.reviewers.is_empty() {
                bail!("a peer review needs a speaker other than {}", author.id());
            }
            lineup.author = Some(author);
        }
        Activity::QuestionAndAnswer => {
            if cli.questioner.is_empty() {
                bail!("a Q&A session needs at least one --questioner");
            }
            lineup.questioners = cli
                .questioner
                .iter()
                .map(|name| {
                    cast.get(name)
                        .cloned()
                        .with_context(|| format!("unknown --questioner '{}'", name))
                })
                .collect::<Result<_>>()?;
            lineup.answerers = others(&cast.speakers, &lineup.questioners);
            if lineup.answerers.is_empty() {
                bail!("a Q&A session needs a speaker who is not a questioner");
            }
        }
    }
    Ok(lineup)
}

/// Speakers not in `excluded`, in speaker order
fn others(
    speakers: &[Arc<dyn Participant>],
    excluded: &[Arc<dyn Participant>],
) -> Vec<Arc<dyn Participant>> {
    speakers
        .iter()
        .filter(|p| !excluded.iter().any(|e| e.id() == p.id()))
        .cloned()
        .collect()
}

fn build_sink(config: &FileConfig, output_dir: &Path) -> Arc<dyn DurableSink> {
    let mut sink = CompositeSink::default();
    for format in &config.output.formats {
        sink = match format {
            FileOutputFormat::Json => sink.with(Arc::new(JsonFileSink::new(output_dir))),
            FileOutputFormat::Markdown => sink.with(Arc::new(MarkdownFileSink::new(output_dir))),
            FileOutputFormat::Text => sink.with(Arc::new(TextFileSink::new(output_dir))),
        };
    }
    Arc::new(sink)
}

async fn run_activity(
    session: &mut ConversationSession,
    cli: &Cli,
    config: &FileConfig,
    cast: &Cast,
    lineup: &Lineup,
) -> Result<Vec<TerminationOutcome>, SessionError> {
    let topic = cli.topic.first().map(String::as_str).unwrap_or_default();
    let rounds = config.session.fixed_rounds();

    match cli.activity {
        Activity::Converse => {
            if config.session.rounds.is_some() || cast.queries.is_empty() {
                session.converse(rounds).await?;
                Ok(Vec::new())
            } else {
                let max_rounds = session.params().max_rounds;
                let outcome = session.converse_until_done(&cast.queries, max_rounds).await?;
                Ok(vec![outcome])
            }
        }
        Activity::Brainstorm => {
            let outcome = activities::brainstorm(session, topic, &cast.speakers).await?;
            Ok(vec![outcome])
        }
        Activity::Consensus => {
            let closing = activities::consensus_building(session, topic, &cast.speakers).await?;
            info!("Collected {} closing message(s)", closing.len());
            Ok(Vec::new())
        }
        Activity::Meeting => activities::meeting(session, &cli.topic, &cast.speakers).await,
        Activity::Debate => {
            activities::debate(session, topic, &cast.positions, rounds).await?;
            Ok(Vec::new())
        }
        Activity::Negotiation => {
            activities::negotiation(session, topic, &cast.speakers, rounds).await?;
            Ok(Vec::new())
        }
        Activity::PeerReview => {
            if let Some(author) = &lineup.author {
                activities::peer_review(session, topic, author, &lineup.reviewers, rounds)
                    .await?;
            }
            Ok(Vec::new())
        }
        Activity::QuestionAndAnswer => {
            let outcome = activities::question_and_answer_session(
                session,
                &lineup.questioners,
                &lineup.answerers,
            )
            .await?;
            Ok(vec![outcome])
        }
        Activity::Casual => {
            let appended = activities::casual_conversation(session, rounds).await?;
            info!("Casual conversation produced {} message(s)", appended);
            Ok(Vec::new())
        }
    }
}

fn replay(path: &Path, format: OutputFormat) -> Result<()> {
    let log = load_transcript(path)
        .with_context(|| format!("failed to load transcript {}", path.display()))?;
    let title = path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    print_log(&title, &log, &[], format);
    Ok(())
}

fn print_log(title: &str, log: &MessageLog, outcomes: &[TerminationOutcome], format: OutputFormat) {
    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(title, log, outcomes),
        OutputFormat::Plain => ConsoleFormatter::format_plain(log),
        OutputFormat::Json => ConsoleFormatter::format_json(log),
    };
    println!("{}", output);
}
