//! Scripted group activities
//!
//! Each activity frames a conversation with a few system messages and then
//! lets the session's scheduler and termination protocol do the work. The
//! participants taking part should already be speakers of the session;
//! activities that need particular speakers join them first.
//!
//! Open-ended activities stop at the session's configured round cap
//! ([`SessionParams::max_rounds`](crate::config::SessionParams::max_rounds)).

use crate::ports::participant::Participant;
use crate::session::{ConversationSession, SessionError, TerminationQuery};
use conclave_domain::{Message, Role, TerminationOutcome, english_join};
use std::sync::Arc;
use tracing::info;

/// Brainstorm until every agent says the brainstorm is finished.
pub async fn brainstorm(
    session: &mut ConversationSession,
    topic: &str,
    agents: &[Arc<dyn Participant>],
) -> Result<TerminationOutcome, SessionError> {
    info!("Brainstorming on '{}' with {} agent(s)", topic, agents.len());

    session
        .input(format!("Now let's brainstorm on the topic: {}", topic))
        .await?;
    let query = TerminationQuery::each(
        agents.iter().cloned(),
        format!("Have we finished brainstorming about {}?", topic),
    );
    let max_rounds = session.params().max_rounds;
    let outcome = session.converse_until_done(&[query], max_rounds).await?;
    session
        .input(format!("Please share your final ideas about {}.", topic))
        .await?;

    Ok(outcome)
}

/// Discuss until every agent agrees a consensus was reached, then collect
/// one closing round of final thoughts.
///
/// Returns the messages posted after the closing prompt.
pub async fn consensus_building(
    session: &mut ConversationSession,
    topic: &str,
    agents: &[Arc<dyn Participant>],
) -> Result<Vec<Message>, SessionError> {
    info!("Building consensus on '{}' with {} agent(s)", topic, agents.len());

    session
        .input(format!("Now let's build a consensus on the topic: {}", topic))
        .await?;
    let query = TerminationQuery::each(
        agents.iter().cloned(),
        format!("Have we reached a consensus on {}?", topic),
    );
    let max_rounds = session.params().max_rounds;
    session.converse_until_done(&[query], max_rounds).await?;

    let prompt_position = session
        .input(format!("Please share your final thoughts about {}.", topic))
        .await?;
    session.step().await?;

    Ok(session.log().since(prompt_position + 1).to_vec())
}

/// Work through an agenda, one termination check per item.
pub async fn meeting(
    session: &mut ConversationSession,
    agenda: &[String],
    agents: &[Arc<dyn Participant>],
) -> Result<Vec<TerminationOutcome>, SessionError> {
    info!("Meeting with {} agenda item(s)", agenda.len());

    session.input("The meeting has started.").await?;

    let max_rounds = session.params().max_rounds;
    let mut outcomes = Vec::with_capacity(agenda.len());
    for item in agenda {
        session.input(format!("Agenda item: {}", item)).await?;
        let query = TerminationQuery::each(
            agents.iter().cloned(),
            format!("Have we finished discussing \"{}\"?", item),
        );
        outcomes.push(session.converse_until_done(&[query], max_rounds).await?);
    }

    session.input("The meeting has ended.").await?;
    Ok(outcomes)
}

/// A fixed number of debate rounds between agents holding given positions.
///
/// Each agent is briefed privately on its position, joins as a speaker if it
/// is not one already, and gets a last word after the debate closes.
pub async fn debate(
    session: &mut ConversationSession,
    topic: &str,
    positions: &[(Arc<dyn Participant>, String)],
    rounds: usize,
) -> Result<(), SessionError> {
    info!(
        "Debating '{}' over {} round(s) with {} side(s)",
        topic,
        rounds,
        positions.len()
    );

    session
        .join(positions.iter().map(|(agent, _)| Arc::clone(agent)), Role::Speaker)
        .await?;
    session
        .input(format!("Now let's debate on the topic: {}", topic))
        .await?;

    for (agent, position) in positions {
        let briefing = Message::system(format!("Your position on {} is: {}", topic, position));
        agent
            .receive(&briefing)
            .await
            .map_err(|source| SessionError::Participant {
                participant: agent.id().clone(),
                source,
            })?;
    }

    for round in 1..=rounds {
        session
            .input(format!("Round {} of {}", round, rounds))
            .await?;
        session.step().await?;
    }

    session
        .input(format!("The debate on {} has ended", topic))
        .await?;
    session
        .input(format!("Please share your final thoughts on {}.", topic))
        .await?;
    session.step().await?;

    Ok(())
}

/// A fixed number of negotiation rounds between the given agents.
pub async fn negotiation(
    session: &mut ConversationSession,
    topic: &str,
    agents: &[Arc<dyn Participant>],
    rounds: usize,
) -> Result<(), SessionError> {
    info!("Negotiating '{}' over {} round(s)", topic, rounds);

    session.join(agents.iter().cloned(), Role::Speaker).await?;
    session
        .input(format!("Now let's negotiate on the topic: {}", topic))
        .await?;
    for round in 1..=rounds {
        session
            .input(format!("Round {} out of {}", round, rounds))
            .await?;
        session.step().await?;
    }
    session
        .input(format!("The negotiation on {} has ended", topic))
        .await?;

    Ok(())
}

/// The author presents a piece of work, then each round every reviewer gives
/// feedback and the author answers it before the next reviewer speaks.
pub async fn peer_review(
    session: &mut ConversationSession,
    work: &str,
    author: &Arc<dyn Participant>,
    reviewers: &[Arc<dyn Participant>],
    rounds: usize,
) -> Result<(), SessionError> {
    info!(
        "Peer review of '{}' by {} reviewer(s) over {} round(s)",
        work,
        reviewers.len(),
        rounds
    );

    session
        .join(
            std::iter::once(Arc::clone(author)).chain(reviewers.iter().cloned()),
            Role::Speaker,
        )
        .await?;
    session
        .input(format!(
            "Now let's conduct a peer review for the following work: {}",
            work
        ))
        .await?;

    let author_id = author.id();
    session
        .input(format!(
            "{} will first present {} work: {}",
            author_id,
            author.pronouns().possessive,
            work
        ))
        .await?;
    session.turn(author_id).await?;

    for round in 1..=rounds {
        session
            .input(format!("Round {} out of {}", round, rounds))
            .await?;
        session
            .input(format!(
                "The reviewers will now provide their feedback on {}",
                work
            ))
            .await?;
        for reviewer in reviewers {
            session
                .input(format!("{}, please provide feedback.", reviewer.id()))
                .await?;
            session.turn(reviewer.id()).await?;
            session
                .input(format!(
                    "{}, please address {}'s feedback.",
                    author_id,
                    reviewer.id()
                ))
                .await?;
            session.turn(author_id).await?;
        }
    }

    session.input("The peer review session has ended.").await?;
    Ok(())
}

/// Questions and answers until every questioner is satisfied.
///
/// Questioners join before answerers, so in each round the questions come
/// first unless the participants were already speakers.
pub async fn question_and_answer_session(
    session: &mut ConversationSession,
    questioners: &[Arc<dyn Participant>],
    answerers: &[Arc<dyn Participant>],
) -> Result<TerminationOutcome, SessionError> {
    info!(
        "Q&A with {} questioner(s) and {} answerer(s)",
        questioners.len(),
        answerers.len()
    );

    session.join(questioners.iter().cloned(), Role::Speaker).await?;
    session.join(answerers.iter().cloned(), Role::Speaker).await?;
    session
        .input("Now let's have a question and answer session.")
        .await?;

    let answerer_names = english_join(answerers.iter().map(|a| a.id().as_str()));
    let query = TerminationQuery::each(
        questioners.iter().cloned(),
        format!("Are you satisfied with the answers from {}?", answerer_names),
    );
    let max_rounds = session.params().max_rounds;
    let outcome = session.converse_until_done(&[query], max_rounds).await?;

    session
        .input("The question and answer session has ended.")
        .await?;
    Ok(outcome)
}

/// Free conversation among the current speakers for a fixed number of rounds.
///
/// Returns the number of messages the speakers contributed.
pub async fn casual_conversation(
    session: &mut ConversationSession,
    rounds: usize,
) -> Result<usize, SessionError> {
    let names = english_join(session.registry().speakers());
    info!("Casual conversation among {} for {} round(s)", names, rounds);

    session
        .input(format!("{} are having a casual conversation.", names))
        .await?;
    let appended = session.converse(rounds).await?;
    session.input("The conversation has ended.").await?;

    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionParams;
    use crate::ports::participant::ParticipantError;
    use async_trait::async_trait;
    use conclave_domain::{ParticipantId, Pronouns};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Mock {
        id: ParticipantId,
        pronouns: Pronouns,
        lines: Mutex<VecDeque<String>>,
        answers: Mutex<VecDeque<bool>>,
        default_answer: bool,
        received: Mutex<Vec<String>>,
        decisions: Mutex<Vec<String>>,
    }

    impl Mock {
        fn new(name: &str) -> Self {
            Self {
                id: ParticipantId::new(name),
                pronouns: Pronouns::default(),
                lines: Mutex::new(VecDeque::new()),
                answers: Mutex::new(VecDeque::new()),
                default_answer: true,
                received: Mutex::new(Vec::new()),
                decisions: Mutex::new(Vec::new()),
            }
        }

        fn says(self, lines: &[&str]) -> Self {
            *self.lines.lock().unwrap() = lines.iter().map(|s| s.to_string()).collect();
            self
        }

        fn answers(self, answers: &[bool]) -> Self {
            *self.answers.lock().unwrap() = answers.iter().copied().collect();
            self
        }

        fn defaults_to(mut self, answer: bool) -> Self {
            self.default_answer = answer;
            self
        }

        fn with_pronouns(mut self, pronouns: &str) -> Self {
            self.pronouns = pronouns.parse().unwrap();
            self
        }

        fn arc(self) -> Arc<Self> {
            Arc::new(self)
        }

        fn received(&self) -> Vec<String> {
            self.received.lock().unwrap().clone()
        }

        fn decisions(&self) -> Vec<String> {
            self.decisions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Participant for Mock {
        fn id(&self) -> &ParticipantId {
            &self.id
        }

        fn pronouns(&self) -> Pronouns {
            self.pronouns.clone()
        }

        async fn produce(&self) -> Result<Option<Message>, ParticipantError> {
            let line = self.lines.lock().unwrap().pop_front();
            Ok(line.map(|text| Message::text(self.id.clone(), text)))
        }

        async fn receive(&self, message: &Message) -> Result<(), ParticipantError> {
            self.received.lock().unwrap().push(message.to_string());
            Ok(())
        }

        async fn decide(&self, prompt: &str, _remember: bool) -> Result<bool, ParticipantError> {
            self.decisions.lock().unwrap().push(prompt.to_string());
            let answer = self.answers.lock().unwrap().pop_front();
            Ok(answer.unwrap_or(self.default_answer))
        }
    }

    fn dyn_p(p: &Arc<Mock>) -> Arc<dyn Participant> {
        p.clone()
    }

    fn texts(session: &ConversationSession) -> Vec<String> {
        session.log().iter().map(|m| m.to_string()).collect()
    }

    async fn open(name: &str, speakers: &[&Arc<Mock>], params: SessionParams) -> ConversationSession {
        ConversationSession::builder(name)
            .speakers(speakers.iter().map(|p| dyn_p(p)))
            .params(params)
            .open()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_brainstorm_frames_the_conversation() {
        let a = Mock::new("A").says(&["idea"]).arc();
        let b = Mock::new("B").says(&["another"]).arc();
        let mut session = open("brainstorm", &[&a, &b], SessionParams::default()).await;

        let outcome = brainstorm(&mut session, "names", &[dyn_p(&a), dyn_p(&b)])
            .await
            .unwrap();

        assert!(outcome.is_converged());
        assert_eq!(
            texts(&session),
            vec![
                "System: Now let's brainstorm on the topic: names",
                "A: idea",
                "B: another",
                "System: Please share your final ideas about names.",
            ]
        );
        assert_eq!(a.decisions(), vec!["Have we finished brainstorming about names?"]);
    }

    #[tokio::test]
    async fn test_brainstorm_stops_at_configured_round_cap() {
        let a = Mock::new("A").says(&["1", "2", "3", "4", "5"]).arc();
        let undecided = Mock::new("U").defaults_to(false).arc();
        let mut session = open(
            "capped",
            &[&a],
            SessionParams::default().with_max_rounds(2),
        )
        .await;

        let outcome = brainstorm(&mut session, "names", &[dyn_p(&undecided)])
            .await
            .unwrap();

        assert_eq!(outcome, TerminationOutcome::RoundCapExceeded { rounds: 2 });
        assert_eq!(session.rounds_completed(), 2);
        assert_eq!(undecided.decisions().len(), 2);
    }

    #[tokio::test]
    async fn test_consensus_building_returns_final_thoughts() {
        let a = Mock::new("A").says(&["opinion", "final A"]).arc();
        let b = Mock::new("B").says(&["view", "final B"]).arc();
        let mut session = open("consensus", &[&a, &b], SessionParams::default()).await;

        let finals = consensus_building(&mut session, "lunch", &[dyn_p(&a), dyn_p(&b)])
            .await
            .unwrap();

        let finals: Vec<String> = finals.iter().map(|m| m.to_string()).collect();
        assert_eq!(finals, vec!["A: final A", "B: final B"]);
    }

    #[tokio::test]
    async fn test_meeting_reports_one_outcome_per_item() {
        let a = Mock::new("A").says(&["1", "2", "3"]).arc();
        let stubborn = Mock::new("S").answers(&[false, false]).defaults_to(true).arc();
        let mut session = open(
            "meeting",
            &[&a],
            SessionParams::default().with_max_rounds(2),
        )
        .await;

        let agenda = vec!["budget".to_string(), "roadmap".to_string()];
        let outcomes = meeting(&mut session, &agenda, &[dyn_p(&stubborn)])
            .await
            .unwrap();

        assert_eq!(
            outcomes,
            vec![
                TerminationOutcome::RoundCapExceeded { rounds: 2 },
                TerminationOutcome::Converged { rounds: 1 },
            ]
        );
        assert_eq!(
            session.log().last().unwrap().to_string(),
            "System: The meeting has ended."
        );
    }

    #[tokio::test]
    async fn test_debate_briefs_privately_and_runs_fixed_rounds() {
        let pro = Mock::new("Pro").says(&["yes because", "still yes", "final yes"]).arc();
        let con = Mock::new("Con").says(&["no because", "still no", "final no"]).arc();
        let mut session = open("debate", &[], SessionParams::default()).await;

        debate(
            &mut session,
            "tabs",
            &[
                (dyn_p(&pro), "in favour".to_string()),
                (dyn_p(&con), "against".to_string()),
            ],
            2,
        )
        .await
        .unwrap();

        assert_eq!(session.rounds_completed(), 3);
        assert!(pro
            .received()
            .contains(&"System: Your position on tabs is: in favour".to_string()));
        assert!(!texts(&session).iter().any(|line| line.contains("Your position")));
        assert_eq!(session.log().last().unwrap().to_string(), "Con: final no");
    }

    #[tokio::test]
    async fn test_negotiation_runs_fixed_rounds() {
        let buyer = Mock::new("Buyer").says(&["50?", "60?", "never said"]).arc();
        let seller = Mock::new("Seller").says(&["80.", "70."]).arc();
        let mut session = open("negotiation", &[&buyer], SessionParams::default()).await;

        negotiation(&mut session, "price", &[dyn_p(&buyer), dyn_p(&seller)], 2)
            .await
            .unwrap();

        assert_eq!(
            texts(&session),
            vec![
                "System: Seller joined the conversation",
                "System: Now let's negotiate on the topic: price",
                "System: Round 1 out of 2",
                "Buyer: 50?",
                "Seller: 80.",
                "System: Round 2 out of 2",
                "Buyer: 60?",
                "Seller: 70.",
                "System: The negotiation on price has ended",
            ]
        );
        assert_eq!(session.rounds_completed(), 2);
    }

    #[tokio::test]
    async fn test_peer_review_alternates_reviewers_and_author() {
        let author = Mock::new("Ada")
            .with_pronouns("she/her")
            .says(&["Here is the parser.", "Fixed the naming.", "Added tests."])
            .arc();
        let r1 = Mock::new("Linus").says(&["Names are vague."]).arc();
        let r2 = Mock::new("Grace").says(&["Where are the tests?"]).arc();
        let mut session = open("review", &[], SessionParams::default()).await;

        peer_review(
            &mut session,
            "the parser",
            &dyn_p(&author),
            &[dyn_p(&r1), dyn_p(&r2)],
            1,
        )
        .await
        .unwrap();

        assert_eq!(
            texts(&session),
            vec![
                "System: Ada, Linus and Grace joined the conversation",
                "System: Now let's conduct a peer review for the following work: the parser",
                "System: Ada will first present her work: the parser",
                "Ada: Here is the parser.",
                "System: Round 1 out of 1",
                "System: The reviewers will now provide their feedback on the parser",
                "System: Linus, please provide feedback.",
                "Linus: Names are vague.",
                "System: Ada, please address Linus's feedback.",
                "Ada: Fixed the naming.",
                "System: Grace, please provide feedback.",
                "Grace: Where are the tests?",
                "System: Ada, please address Grace's feedback.",
                "Ada: Added tests.",
                "System: The peer review session has ended.",
            ]
        );
        // Individual turns are not rounds
        assert_eq!(session.rounds_completed(), 0);
    }

    #[tokio::test]
    async fn test_question_and_answer_runs_until_questioners_are_satisfied() {
        let asker = Mock::new("Q")
            .says(&["Why?", "And how?"])
            .answers(&[false, true])
            .arc();
        let expert = Mock::new("E").says(&["Because.", "Like this."]).arc();
        let mut session = open("qa", &[], SessionParams::default()).await;

        let outcome = question_and_answer_session(&mut session, &[dyn_p(&asker)], &[dyn_p(&expert)])
            .await
            .unwrap();

        assert_eq!(outcome, TerminationOutcome::Converged { rounds: 2 });
        assert_eq!(
            asker.decisions(),
            vec![
                "Are you satisfied with the answers from E?",
                "Are you satisfied with the answers from E?",
            ]
        );
        assert_eq!(
            texts(&session)[2..],
            [
                "System: Now let's have a question and answer session.",
                "Q: Why?",
                "E: Because.",
                "Q: And how?",
                "E: Like this.",
                "System: The question and answer session has ended.",
            ]
        );
    }

    #[tokio::test]
    async fn test_question_and_answer_respects_round_cap() {
        let asker = Mock::new("Q").defaults_to(false).arc();
        let expert = Mock::new("E").arc();
        let mut session = open("qa-cap", &[], SessionParams::default().with_max_rounds(3)).await;

        let outcome = question_and_answer_session(&mut session, &[dyn_p(&asker)], &[dyn_p(&expert)])
            .await
            .unwrap();

        assert_eq!(outcome, TerminationOutcome::RoundCapExceeded { rounds: 3 });
    }

    #[tokio::test]
    async fn test_casual_conversation_names_the_speakers() {
        let a = Mock::new("A").says(&["hey", "how are you?"]).arc();
        let b = Mock::new("B").says(&["hi"]).arc();
        let mut session = open("casual", &[&a, &b], SessionParams::default()).await;

        let appended = casual_conversation(&mut session, 2).await.unwrap();

        assert_eq!(appended, 3);
        assert_eq!(
            texts(&session),
            vec![
                "System: A and B are having a casual conversation.",
                "A: hey",
                "B: hi",
                "A: how are you?",
                "System: The conversation has ended.",
            ]
        );
    }
}
