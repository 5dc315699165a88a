//! Termination protocol: converse until the evaluators agree the activity
//! is done, or a round cap is hit.

use super::{ConversationSession, SessionError};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::participant::Participant;
use conclave_domain::{Message, ParticipantId, RoundTracker, TerminationOutcome, Verdict};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A yes/no question put to one or more evaluators after every round
#[derive(Clone)]
pub struct TerminationQuery {
    evaluators: Vec<Arc<dyn Participant>>,
    prompt: String,
}

impl TerminationQuery {
    pub fn new(evaluator: Arc<dyn Participant>, prompt: impl Into<String>) -> Self {
        Self {
            evaluators: vec![evaluator],
            prompt: prompt.into(),
        }
    }

    /// The same prompt, asked of each evaluator in turn
    pub fn each(
        evaluators: impl IntoIterator<Item = Arc<dyn Participant>>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            evaluators: evaluators.into_iter().collect(),
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn evaluators(&self) -> &[Arc<dyn Participant>] {
        &self.evaluators
    }

    /// One `(evaluator, prompt)` pair per evaluator, in query order
    pub fn expand(queries: &[TerminationQuery]) -> Vec<(Arc<dyn Participant>, String)> {
        queries
            .iter()
            .flat_map(|query| {
                query
                    .evaluators
                    .iter()
                    .map(move |evaluator| (Arc::clone(evaluator), query.prompt.clone()))
            })
            .collect()
    }
}

impl std::fmt::Debug for TerminationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminationQuery")
            .field(
                "evaluators",
                &self
                    .evaluators
                    .iter()
                    .map(|e| e.id().as_str())
                    .collect::<Vec<_>>(),
            )
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl ConversationSession {
    /// Converse round by round until every query is answered "yes".
    ///
    /// After each round the expanded queries are asked in order with
    /// `remember = false`; the first "no" ends that round's check and the
    /// next round starts. Evaluators receive every broadcast while the check
    /// runs and stop receiving when it returns, whatever the outcome.
    ///
    /// Hitting the cap is an `Ok` outcome. `max_rounds == 0` returns
    /// immediately without running a round; an empty query list converges
    /// after one round.
    pub async fn converse_until_done(
        &mut self,
        queries: &[TerminationQuery],
        max_rounds: usize,
    ) -> Result<TerminationOutcome, SessionError> {
        self.ensure_open()?;

        let pairs = TerminationQuery::expand(queries);
        let evaluator_ids: Vec<ParticipantId> =
            pairs.iter().map(|(e, _)| e.id().clone()).collect();
        let handles: HashMap<ParticipantId, Arc<dyn Participant>> = pairs
            .iter()
            .map(|(e, _)| (e.id().clone(), Arc::clone(e)))
            .collect();

        info!(
            "Session '{}' conversing until done: {} query(ies), at most {} round(s)",
            self.identity,
            pairs.len(),
            max_rounds
        );

        self.registry.begin_evaluation(&evaluator_ids);
        self.evaluator_handles = handles;

        let result = self.run_until_done(&pairs, max_rounds).await;

        self.registry.end_evaluation();
        self.evaluator_handles.clear();

        let outcome = self.settle(result)?;
        info!("Session '{}': {}", self.identity, outcome);
        self.logger.log(ConversationEvent::new(
            "termination_outcome",
            json!({
                "session": self.identity.name(),
                "status": outcome.as_str(),
                "rounds": outcome.rounds(),
            }),
        ));
        self.progress.on_outcome(&outcome);
        Ok(outcome)
    }

    async fn run_until_done(
        &mut self,
        pairs: &[(Arc<dyn Participant>, String)],
        max_rounds: usize,
    ) -> Result<TerminationOutcome, SessionError> {
        let mut tracker = RoundTracker::new(max_rounds, pairs.len());

        while let Some(round) = tracker.begin_round() {
            self.run_round().await?;

            for (evaluator, prompt) in pairs {
                let id = evaluator.id().clone();
                let approved = self.guarded(&id, evaluator.decide(prompt, false)).await?;
                debug!(
                    "Round {}: {} answered {} to {:?}",
                    round,
                    id,
                    if approved { "yes" } else { "no" },
                    prompt
                );

                let verdict = Verdict::new(id.clone(), prompt.as_str(), approved);
                self.progress.on_evaluation(round, &verdict);

                if self.params.echo_decisions {
                    self.post(Message::text(id, if approved { "yes" } else { "no" }))
                        .await?;
                }

                if !tracker.record(verdict) {
                    break;
                }
            }

            let finished = tracker.finish_round();
            if let Some(evaluation) = tracker.history().last() {
                self.logger.log(ConversationEvent::new(
                    "termination_check",
                    json!({
                        "session": self.identity.name(),
                        "round": evaluation.round,
                        "summary": evaluation.summary(),
                        "converged": evaluation.converged(),
                        "verdicts": evaluation.verdicts,
                    }),
                ));
                self.evaluation_history.push(evaluation.clone());
            }

            if let Some(outcome) = finished {
                return Ok(outcome);
            }
        }

        Ok(tracker
            .outcome()
            .unwrap_or(TerminationOutcome::RoundCapExceeded {
                rounds: tracker.rounds_run(),
            }))
    }
}
