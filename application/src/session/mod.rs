//! Conversation session
//!
//! [`ConversationSession`] is the boundary through which a conversation is
//! driven. It owns the [`MessageLog`] and the [`MembershipRegistry`], talks to
//! participants only through the [`Participant`] port, and hands the log to a
//! [`DurableSink`] at checkpoints and on close.
//!
//! Every state change goes through `&mut self`, so one session is always
//! driven by one task. Independent sessions share nothing mutable.
//!
//! # Message flow
//!
//! ```text
//! input / produce ──▶ validate ──▶ broadcast to every target ──▶ append
//! ```
//!
//! A message that fails validation is neither broadcast nor appended. A
//! message whose broadcast fails part-way is not appended either; the error
//! is returned to the caller unchanged.
//!
//! # Cancellation
//!
//! Participant calls race the session's [`CancellationToken`]. Once it fires,
//! the current operation returns [`SessionError::Cancelled`], a single notice
//! is appended to the log (without broadcasting it), and every later
//! operation except [`ConversationSession::close`] fails the same way.
//! Messages appended before that point stay in the log.

mod scheduler;
mod termination;

pub use termination::TerminationQuery;

use crate::config::SessionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::durable_sink::{DurableSink, NoSink, SinkError};
use crate::ports::participant::{Participant, ParticipantError};
use crate::ports::progress::{NoProgress, SessionProgress};
use conclave_domain::{
    DomainError, EvaluationRound, JoinRequest, MembershipRegistry, Message, MessageLog,
    ParticipantId, Role, SessionIdentity, english_join,
};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while driving a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Participant {participant} failed: {source}")]
    Participant {
        participant: ParticipantId,
        source: ParticipantError,
    },

    #[error("Failed to persist the conversation: {0}")]
    Persistence(#[from] SinkError),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    #[error("Session was cancelled")]
    Cancelled,

    #[error("Session is closed")]
    Closed,
}

impl SessionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Domain(DomainError::Cancelled))
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Cancelled,
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder for [`ConversationSession`]
pub struct SessionBuilder {
    identity: SessionIdentity,
    speakers: Vec<Arc<dyn Participant>>,
    bystanders: Vec<Arc<dyn Participant>>,
    sink: Arc<dyn DurableSink>,
    logger: Arc<dyn ConversationLogger>,
    progress: Arc<dyn SessionProgress>,
    params: SessionParams,
    cancellation: CancellationToken,
}

impl SessionBuilder {
    fn new(identity: SessionIdentity) -> Self {
        Self {
            identity,
            speakers: Vec::new(),
            bystanders: Vec::new(),
            sink: Arc::new(NoSink),
            logger: Arc::new(NoConversationLogger),
            progress: Arc::new(NoProgress),
            params: SessionParams::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn speakers(mut self, speakers: impl IntoIterator<Item = Arc<dyn Participant>>) -> Self {
        self.speakers.extend(speakers);
        self
    }

    pub fn speaker(mut self, speaker: Arc<dyn Participant>) -> Self {
        self.speakers.push(speaker);
        self
    }

    pub fn bystanders(
        mut self,
        bystanders: impl IntoIterator<Item = Arc<dyn Participant>>,
    ) -> Self {
        self.bystanders.extend(bystanders);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DurableSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn SessionProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn params(mut self, params: SessionParams) -> Self {
        self.params = params;
        self
    }

    /// Use an externally owned token, e.g. a child of a Ctrl-C token
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Register the initial members and post the initial message, if any.
    pub async fn open(self) -> Result<ConversationSession, SessionError> {
        let mut request = JoinRequest::new();
        let mut roster: HashMap<ParticipantId, Arc<dyn Participant>> = HashMap::new();
        for (participants, role) in [
            (&self.speakers, Role::Speaker),
            (&self.bystanders, Role::Bystander),
        ] {
            for participant in participants {
                request = request.with(participant.id().clone(), role);
                roster
                    .entry(participant.id().clone())
                    .or_insert_with(|| Arc::clone(participant));
            }
        }

        let mut registry = MembershipRegistry::new();
        registry.join(&request)?;

        info!(
            "Opening session '{}' with {} speaker(s) and {} bystander(s)",
            self.identity,
            registry.speakers().len(),
            registry.bystanders().len()
        );

        let mut session = ConversationSession {
            identity: self.identity,
            log: MessageLog::new(),
            registry,
            roster,
            evaluator_handles: HashMap::new(),
            sink: self.sink,
            logger: self.logger,
            progress: self.progress,
            params: self.params,
            cancellation: self.cancellation,
            status: SessionStatus::Open,
            rounds_completed: 0,
            evaluation_history: Vec::new(),
        };

        if let Some(initial) = session.params.initial_message.clone() {
            let result = session.post(Message::system(initial)).await;
            session.settle(result)?;
        }

        Ok(session)
    }
}

/// A shared, persisted conversation among a changing set of participants
pub struct ConversationSession {
    identity: SessionIdentity,
    log: MessageLog,
    registry: MembershipRegistry,
    /// Handles of speakers and bystanders
    roster: HashMap<ParticipantId, Arc<dyn Participant>>,
    /// Handles of evaluators while a termination check runs
    evaluator_handles: HashMap<ParticipantId, Arc<dyn Participant>>,
    sink: Arc<dyn DurableSink>,
    logger: Arc<dyn ConversationLogger>,
    progress: Arc<dyn SessionProgress>,
    params: SessionParams,
    cancellation: CancellationToken,
    status: SessionStatus,
    rounds_completed: usize,
    evaluation_history: Vec<EvaluationRound>,
}

impl ConversationSession {
    pub fn builder(identity: impl Into<SessionIdentity>) -> SessionBuilder {
        SessionBuilder::new(identity.into())
    }

    /// Open a session with default collaborators.
    pub async fn open(
        identity: impl Into<SessionIdentity>,
        speakers: Vec<Arc<dyn Participant>>,
        bystanders: Vec<Arc<dyn Participant>>,
    ) -> Result<Self, SessionError> {
        Self::builder(identity)
            .speakers(speakers)
            .bystanders(bystanders)
            .open()
            .await
    }

    // ==================== Accessors ====================

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// The authoritative history, readable in every state
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn state(&self) -> SessionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Rounds completed over the lifetime of the session
    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    /// Every evaluation round of every termination check so far
    pub fn evaluation_history(&self) -> &[EvaluationRound] {
        &self.evaluation_history
    }

    /// A clone of the session's cancellation token
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The handle of a current speaker or bystander
    pub fn participant(&self, id: &ParticipantId) -> Option<&Arc<dyn Participant>> {
        self.roster.get(id)
    }

    // ==================== Input ====================

    /// Broadcast a message to every current target, then append it.
    ///
    /// Plain strings become system messages. Returns the log position.
    pub async fn input(&mut self, message: impl Into<Message>) -> Result<usize, SessionError> {
        self.ensure_open()?;
        let result = self.post(message.into()).await;
        self.settle(result)
    }

    // ==================== Membership ====================

    /// Join participants in one role.
    ///
    /// Returns the participants whose membership changed; if any did, a
    /// single "joined the conversation" message names them.
    pub async fn join(
        &mut self,
        participants: impl IntoIterator<Item = Arc<dyn Participant>>,
        role: Role,
    ) -> Result<Vec<ParticipantId>, SessionError> {
        let entries = participants.into_iter().map(|p| (p, role)).collect();
        self.join_request(entries).await
    }

    /// Join participants with individually requested roles.
    ///
    /// A participant requested as both speaker and bystander fails the whole
    /// request before anything changes.
    pub async fn join_request(
        &mut self,
        entries: Vec<(Arc<dyn Participant>, Role)>,
    ) -> Result<Vec<ParticipantId>, SessionError> {
        self.ensure_open()?;

        let request = entries
            .iter()
            .fold(JoinRequest::new(), |request, (participant, role)| {
                request.with(participant.id().clone(), *role)
            });
        request.validate()?;

        for (participant, _) in &entries {
            self.register(participant);
        }
        let joined = self.registry.join(&request)?;
        if joined.is_empty() {
            debug!("Join request for session '{}' changed nothing", self.identity);
            return Ok(joined);
        }

        let names = english_join(&joined);
        info!("{} joined session '{}'", names, self.identity);
        self.logger.log(ConversationEvent::new(
            "participants_joined",
            json!({
                "session": self.identity.name(),
                "participants": joined
                    .iter()
                    .map(|id| json!({
                        "id": id.as_str(),
                        "role": self.registry.role_of(id).map(|r| r.as_str()),
                    }))
                    .collect::<Vec<_>>(),
            }),
        ));

        let result = self
            .post(Message::system(format!("{} joined the conversation", names)))
            .await;
        self.settle(result)?;
        Ok(joined)
    }

    /// Remove participants from every role.
    ///
    /// Leavers are removed before the "left the conversation" message is
    /// broadcast, so they do not receive it. Non-members are ignored.
    pub async fn leave<I, P>(&mut self, participants: I) -> Result<Vec<ParticipantId>, SessionError>
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        self.ensure_open()?;

        let ids: Vec<ParticipantId> = participants.into_iter().map(Into::into).collect();
        let left = self.registry.leave(&ids);
        if left.is_empty() {
            return Ok(left);
        }
        for id in &left {
            self.forget(id);
        }

        let names = english_join(&left);
        info!("{} left session '{}'", names, self.identity);
        self.logger.log(ConversationEvent::new(
            "participants_left",
            json!({
                "session": self.identity.name(),
                "participants": left.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            }),
        ));

        let result = self
            .post(Message::system(format!("{} left the conversation", names)))
            .await;
        self.settle(result)?;
        Ok(left)
    }

    /// Make participants bystanders, demoting any that were speakers.
    pub async fn add_bystanders(
        &mut self,
        participants: impl IntoIterator<Item = Arc<dyn Participant>>,
    ) -> Result<Vec<ParticipantId>, SessionError> {
        self.ensure_open()?;

        let participants: Vec<Arc<dyn Participant>> = participants.into_iter().collect();
        for participant in &participants {
            self.register(participant);
        }
        let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id().clone()).collect();
        let added = self.registry.add_bystanders(&ids);
        if added.is_empty() {
            return Ok(added);
        }

        let names = english_join(&added);
        debug!("{} now bystanding in session '{}'", names, self.identity);
        self.logger.log(ConversationEvent::new(
            "bystanders_added",
            json!({
                "session": self.identity.name(),
                "participants": added.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            }),
        ));

        let text = if added.len() == 1 {
            format!("{} is now a bystander to the conversation: {}", names, self.identity)
        } else {
            format!("{} are now bystanders to the conversation: {}", names, self.identity)
        };
        let result = self.post(Message::system(text)).await;
        self.settle(result)?;
        Ok(added)
    }

    /// Drop bystander status. Speakers and non-members are unaffected.
    pub async fn remove_bystanders<I, P>(
        &mut self,
        participants: I,
    ) -> Result<Vec<ParticipantId>, SessionError>
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        self.ensure_open()?;

        let ids: Vec<ParticipantId> = participants.into_iter().map(Into::into).collect();
        let removed = self.registry.remove_bystanders(&ids);
        if removed.is_empty() {
            return Ok(removed);
        }
        for id in &removed {
            self.forget(id);
        }

        let names = english_join(&removed);
        debug!("{} stopped bystanding in session '{}'", names, self.identity);
        self.logger.log(ConversationEvent::new(
            "bystanders_removed",
            json!({
                "session": self.identity.name(),
                "participants": removed.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            }),
        ));

        let text = if removed.len() == 1 {
            format!("{} is no longer a bystander to the conversation: {}", names, self.identity)
        } else {
            format!("{} are no longer bystanders to the conversation: {}", names, self.identity)
        };
        let result = self.post(Message::system(text)).await;
        self.settle(result)?;
        Ok(removed)
    }

    // ==================== Lifecycle ====================

    /// Cancel the session from the driving task.
    ///
    /// Other tasks cancel through [`Self::cancellation_token`].
    pub fn cancel(&mut self) {
        self.cancellation.cancel();
        self.record_cancellation();
    }

    /// Post the final message and hand the log to the sink.
    ///
    /// `final_message` falls back to the configured one. A cancelled session
    /// is persisted without a final message. The session counts as closed
    /// even when persisting fails; the log stays readable. Closing a closed
    /// session does nothing.
    pub async fn close(&mut self, final_message: Option<Message>) -> Result<(), SessionError> {
        if self.status == SessionStatus::Closed {
            return Ok(());
        }
        if self.status == SessionStatus::Open && self.cancellation.is_cancelled() {
            self.record_cancellation();
        }

        let final_message =
            final_message.or_else(|| self.params.final_message.clone().map(Message::system));
        let posted = match final_message {
            Some(message) if self.status == SessionStatus::Open => {
                let result = self.post(message).await.map(|_| ());
                self.settle(result)
            }
            _ => Ok(()),
        };

        let cancelled = self.status == SessionStatus::Cancelled;
        self.status = SessionStatus::Closed;

        let records = self.log.to_serializable();
        let persisted = self.sink.persist(&records, &self.identity).await;

        self.logger.log(ConversationEvent::new(
            "session_closed",
            json!({
                "session": self.identity.name(),
                "messages": records.len(),
                "rounds": self.rounds_completed,
                "cancelled": cancelled,
                "persisted": persisted.is_ok(),
            }),
        ));

        match &persisted {
            Ok(()) => info!(
                "Closed session '{}' ({} messages, {} rounds)",
                self.identity,
                records.len(),
                self.rounds_completed
            ),
            Err(e) => warn!("Failed to persist session '{}': {}", self.identity, e),
        }

        persisted?;
        posted
    }

    // ==================== Internals ====================

    /// Validate, broadcast, then append.
    async fn post(&mut self, message: Message) -> Result<usize, SessionError> {
        message.payload().validate()?;
        self.broadcast(&message).await?;

        let position = self.log.append(message)?;
        if let Some(appended) = self.log.get(position) {
            debug!("[{}] {}", position, appended);
            self.logger.log(ConversationEvent::new(
                "message_appended",
                json!({
                    "session": self.identity.name(),
                    "seq": position,
                    "sender": appended.sender().as_str(),
                    "kind": appended.kind().as_str(),
                    "payload": appended.payload().to_value(),
                }),
            ));
            self.progress.on_message(appended);
        }
        Ok(position)
    }

    /// Deliver a message to every current target, each exactly once.
    async fn broadcast(&self, message: &Message) -> Result<(), SessionError> {
        for id in self.registry.broadcast_targets() {
            let participant = self
                .handle(&id)
                .ok_or_else(|| SessionError::UnknownParticipant(id.clone()))?;
            self.guarded(&id, participant.receive(message)).await?;
        }
        Ok(())
    }

    /// Run a participant call unless the session is cancelled first.
    async fn guarded<T>(
        &self,
        participant: &ParticipantId,
        call: impl Future<Output = Result<T, ParticipantError>>,
    ) -> Result<T, SessionError> {
        tokio::select! {
            biased;

            _ = self.cancellation.cancelled() => Err(SessionError::Cancelled),
            result = call => result.map_err(|source| SessionError::Participant {
                participant: participant.clone(),
                source,
            }),
        }
    }

    fn handle(&self, id: &ParticipantId) -> Option<&Arc<dyn Participant>> {
        self.roster
            .get(id)
            .or_else(|| self.evaluator_handles.get(id))
    }

    fn register(&mut self, participant: &Arc<dyn Participant>) {
        self.roster
            .entry(participant.id().clone())
            .or_insert_with(|| Arc::clone(participant));
    }

    /// Drop the handle of a participant that no longer holds any role.
    fn forget(&mut self, id: &ParticipantId) {
        if self.registry.role_of(id).is_none() {
            self.roster.remove(id);
        }
    }

    fn ensure_open(&mut self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Closed => Err(SessionError::Closed),
            SessionStatus::Cancelled => Err(SessionError::Cancelled),
            SessionStatus::Open if self.cancellation.is_cancelled() => {
                self.record_cancellation();
                Err(SessionError::Cancelled)
            }
            SessionStatus::Open => Ok(()),
        }
    }

    /// Turn a cancelled result into the cancelled session state.
    fn settle<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        match result {
            Err(e) if e.is_cancelled() => {
                self.record_cancellation();
                Err(SessionError::Cancelled)
            }
            other => other,
        }
    }

    /// Append the early-termination notice once, without broadcasting it.
    fn record_cancellation(&mut self) {
        if self.status != SessionStatus::Open {
            return;
        }
        self.status = SessionStatus::Cancelled;

        let notice = Message::system(self.params.early_termination_notice.clone());
        if let Err(e) = self.log.append(notice) {
            warn!("Failed to record cancellation of '{}': {}", self.identity, e);
        }

        warn!(
            "Session '{}' cancelled after {} rounds",
            self.identity, self.rounds_completed
        );
        self.logger.log(ConversationEvent::new(
            "session_cancelled",
            json!({
                "session": self.identity.name(),
                "rounds": self.rounds_completed,
                "messages": self.log.len(),
            }),
        ));
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("identity", &self.identity)
            .field("status", &self.status)
            .field("registry", &self.registry)
            .field("messages", &self.log.len())
            .field("rounds_completed", &self.rounds_completed)
            .finish()
    }
}
