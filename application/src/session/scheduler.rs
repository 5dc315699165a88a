//! Turn scheduling: rounds of speaker contributions

use super::{ConversationSession, SessionError};
use conclave_domain::ParticipantId;
use tracing::{debug, info, warn};

impl ConversationSession {
    /// Run one round.
    ///
    /// Every speaker, in registration order as of the start of the round, is
    /// asked to produce once. Produced messages are broadcast and appended
    /// before the next speaker is asked. Returns the number of messages
    /// appended.
    pub async fn step(&mut self) -> Result<usize, SessionError> {
        self.ensure_open()?;
        let result = self.run_round().await;
        self.settle(result)
    }

    /// Run exactly `rounds` rounds, with no early exit.
    ///
    /// Returns the number of messages appended across all rounds.
    pub async fn converse(&mut self, rounds: usize) -> Result<usize, SessionError> {
        let mut appended = 0;
        for _ in 0..rounds {
            appended += self.step().await?;
        }
        Ok(appended)
    }

    /// Let one current member produce once, outside of any round.
    ///
    /// Returns the log position of the produced message, or `None` if the
    /// participant had nothing to say. The round counter does not move.
    pub async fn turn(&mut self, id: &ParticipantId) -> Result<Option<usize>, SessionError> {
        self.ensure_open()?;
        let result = self.take_turn(id).await;
        self.settle(result)
    }

    async fn take_turn(&mut self, id: &ParticipantId) -> Result<Option<usize>, SessionError> {
        let Some(participant) = self.roster.get(id).cloned() else {
            return Err(SessionError::UnknownParticipant(id.clone()));
        };

        match self.guarded(id, participant.produce()).await? {
            Some(message) => Ok(Some(self.post(message).await?)),
            None => {
                debug!("{} passed on a turn", id);
                Ok(None)
            }
        }
    }

    pub(super) async fn run_round(&mut self) -> Result<usize, SessionError> {
        let round = self.rounds_completed + 1;
        let speakers = self.registry.speakers().to_vec();

        debug!(
            "Session '{}' round {}: {} speaker(s)",
            self.identity,
            round,
            speakers.len()
        );
        self.progress.on_round_start(round, &speakers);

        let mut appended = 0;
        for id in &speakers {
            let Some(speaker) = self.roster.get(id).cloned() else {
                return Err(SessionError::UnknownParticipant(id.clone()));
            };

            let produced = self.guarded(id, speaker.produce()).await?;
            match produced {
                Some(message) => {
                    self.post(message).await?;
                    appended += 1;
                }
                None => debug!("{} had nothing to say in round {}", id, round),
            }
        }

        self.rounds_completed = round;
        self.progress.on_round_complete(round);
        info!(
            "Session '{}' completed round {} ({} message(s))",
            self.identity, round, appended
        );

        self.checkpoint().await;
        Ok(appended)
    }

    /// Persist the log if a checkpoint is due. Failures only warn.
    async fn checkpoint(&self) {
        if !self.params.checkpoint_due(self.rounds_completed) {
            return;
        }

        let records = self.log.to_serializable();
        match self.sink.persist(&records, &self.identity).await {
            Ok(()) => debug!(
                "Checkpointed session '{}' after round {}",
                self.identity, self.rounds_completed
            ),
            Err(e) => warn!(
                "Checkpoint of session '{}' after round {} failed: {}",
                self.identity, self.rounds_completed, e
            ),
        }
    }
}
