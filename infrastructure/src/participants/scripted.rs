//! Scripted participants.
//!
//! A [`ScriptedParticipant`] says a fixed list of lines, one per round, and
//! answers termination questions according to a [`DecisionPolicy`]. It keeps
//! a memory of everything it was told, which makes it useful both for
//! replaying configured conversations and for testing.

use async_trait::async_trait;
use conclave_application::ports::participant::{Participant, ParticipantError};
use conclave_domain::{Message, ParticipantId, Pronouns};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

/// How a scripted participant answers "are we done?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecisionPolicy {
    /// Yes once every line has been said
    #[default]
    Exhausted,
    Always,
    Never,
    /// Yes from the N-th question on (1-indexed)
    After(usize),
}

impl DecisionPolicy {
    pub fn as_label(&self) -> String {
        match self {
            DecisionPolicy::Exhausted => "exhausted".to_string(),
            DecisionPolicy::Always => "always".to_string(),
            DecisionPolicy::Never => "never".to_string(),
            DecisionPolicy::After(n) => format!("after:{}", n),
        }
    }

    /// Accepted spellings, for error messages
    pub fn valid_values() -> Vec<String> {
        ["exhausted", "always", "never", "after:N"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl std::fmt::Display for DecisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

impl std::str::FromStr for DecisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "exhausted" | "done" => Ok(DecisionPolicy::Exhausted),
            "always" | "yes" => Ok(DecisionPolicy::Always),
            "never" | "no" => Ok(DecisionPolicy::Never),
            other => other
                .strip_prefix("after:")
                .and_then(|n| n.trim().parse().ok())
                .map(DecisionPolicy::After)
                .ok_or_else(|| format!("Invalid decision policy: {}", s)),
        }
    }
}

#[derive(Default)]
struct Memory {
    received: Vec<Message>,
    prompts: Vec<String>,
    decisions: usize,
}

pub struct ScriptedParticipant {
    id: ParticipantId,
    pronouns: Pronouns,
    lines: Mutex<VecDeque<String>>,
    policy: DecisionPolicy,
    memory: Mutex<Memory>,
}

impl ScriptedParticipant {
    pub fn new<I, S>(name: impl Into<ParticipantId>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: name.into(),
            pronouns: Pronouns::default(),
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            policy: DecisionPolicy::default(),
            memory: Mutex::new(Memory::default()),
        }
    }

    /// A participant that never speaks, e.g. an observer or a judge
    pub fn silent(name: impl Into<ParticipantId>) -> Self {
        Self::new(name, Vec::<String>::new())
    }

    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_pronouns(mut self, pronouns: Pronouns) -> Self {
        self.pronouns = pronouns;
        self
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn remaining_lines(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }

    /// Messages received so far
    pub fn received(&self) -> Vec<Message> {
        self.memory
            .lock()
            .map(|m| m.received.clone())
            .unwrap_or_default()
    }

    /// Prompts asked with `remember = true`
    pub fn remembered_prompts(&self) -> Vec<String> {
        self.memory
            .lock()
            .map(|m| m.prompts.clone())
            .unwrap_or_default()
    }

    fn memory(&self) -> Result<MutexGuard<'_, Memory>, ParticipantError> {
        self.memory
            .lock()
            .map_err(|_| ParticipantError::Other(format!("{}: memory poisoned", self.id)))
    }

    fn script(&self) -> Result<MutexGuard<'_, VecDeque<String>>, ParticipantError> {
        self.lines
            .lock()
            .map_err(|_| ParticipantError::Other(format!("{}: script poisoned", self.id)))
    }
}

#[async_trait]
impl Participant for ScriptedParticipant {
    fn id(&self) -> &ParticipantId {
        &self.id
    }

    fn pronouns(&self) -> Pronouns {
        self.pronouns.clone()
    }

    async fn produce(&self) -> Result<Option<Message>, ParticipantError> {
        let line = self.script()?.pop_front();
        Ok(line.map(|text| Message::text(self.id.clone(), text)))
    }

    async fn receive(&self, message: &Message) -> Result<(), ParticipantError> {
        trace!("{} received: {}", self.id, message);
        self.memory()?.received.push(message.clone());
        Ok(())
    }

    async fn decide(&self, prompt: &str, remember: bool) -> Result<bool, ParticipantError> {
        let exhausted = self.script()?.is_empty();

        let mut memory = self.memory()?;
        memory.decisions += 1;
        if remember {
            memory.prompts.push(prompt.to_string());
        }

        let answer = match self.policy {
            DecisionPolicy::Exhausted => exhausted,
            DecisionPolicy::Always => true,
            DecisionPolicy::Never => false,
            DecisionPolicy::After(n) => memory.decisions >= n,
        };
        trace!("{} decided {} on {:?}", self.id, answer, prompt);
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("exhausted".parse::<DecisionPolicy>(), Ok(DecisionPolicy::Exhausted));
        assert_eq!("Always".parse::<DecisionPolicy>(), Ok(DecisionPolicy::Always));
        assert_eq!("never".parse::<DecisionPolicy>(), Ok(DecisionPolicy::Never));
        assert_eq!("after:3".parse::<DecisionPolicy>(), Ok(DecisionPolicy::After(3)));
        assert!("after:x".parse::<DecisionPolicy>().is_err());
        assert!("sometimes".parse::<DecisionPolicy>().is_err());
        assert_eq!(DecisionPolicy::After(2).to_string(), "after:2");
    }

    #[tokio::test]
    async fn test_speaks_lines_in_order_then_goes_quiet() {
        let p = ScriptedParticipant::new("Ada", ["one", "two"]);

        assert_eq!(p.produce().await.unwrap().unwrap().to_string(), "Ada: one");
        assert_eq!(p.produce().await.unwrap().unwrap().to_string(), "Ada: two");
        assert!(p.produce().await.unwrap().is_none());
        assert_eq!(p.remaining_lines(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_policy_agrees_after_last_line() {
        let p = ScriptedParticipant::new("Ada", ["only"]);

        assert!(!p.decide("done?", false).await.unwrap());
        p.produce().await.unwrap();
        assert!(p.decide("done?", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_after_policy_counts_questions() {
        let p = ScriptedParticipant::silent("Judge").with_policy(DecisionPolicy::After(3));

        assert!(!p.decide("done?", false).await.unwrap());
        assert!(!p.decide("done?", false).await.unwrap());
        assert!(p.decide("done?", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_remember_flag_controls_memory() {
        let p = ScriptedParticipant::silent("Judge").with_policy(DecisionPolicy::Always);

        p.decide("forget me", false).await.unwrap();
        p.decide("remember me", true).await.unwrap();
        p.receive(&Message::system("hello")).await.unwrap();

        assert_eq!(p.remembered_prompts(), vec!["remember me"]);
        assert_eq!(p.received().len(), 1);
    }

    #[test]
    fn test_pronouns_default_to_they() {
        let p = ScriptedParticipant::silent("Sam");
        assert_eq!(p.pronouns().to_string(), "they/them");

        let p = p.with_pronouns("she/her".parse().unwrap());
        assert_eq!(p.pronouns().to_string(), "she/her");
    }
}
