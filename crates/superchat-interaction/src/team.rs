//! Bounded round-robin debate team over a subset of the agent pool.
//!
//! A team round is one pass where every member replies once, in setup
//! order, to the shared conversation. The shared log uses an explicit
//! tagged speaker so replies can be attributed without inspecting message
//! internals.

use crate::client::{ChatMessage, ModelInvoker};
use crate::error::AgentError;
use std::sync::Arc;
use superchat_core::stats::UsageRecord;

/// Upper bound on the shared log; the seeded context at the front is
/// always preserved when trimming.
const TEAM_LOG_CAPACITY: usize = 48;

/// Who produced a shared-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Agent(usize),
}

/// One entry of the shared team conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMessage {
    pub speaker: Speaker,
    pub text: String,
}

/// Identity of one team participant, captured from its pool agent.
#[derive(Debug, Clone)]
pub struct TeamMember {
    pub agent_index: usize,
    pub symbol: String,
    pub label: String,
    pub display_name: String,
    pub model_id: String,
    pub system_prompt: String,
}

/// A fixed-membership, fixed-order debate team sharing one conversation.
pub struct Team {
    members: Vec<TeamMember>,
    log: Vec<TeamMessage>,
    invoker: Arc<dyn ModelInvoker>,
}

impl Team {
    pub fn new(members: Vec<TeamMember>, invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            members,
            log: Vec::new(),
            invoker,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn log(&self) -> &[TeamMessage] {
        &self.log
    }

    /// Seeds the shared conversation (the assembled individual-phase
    /// context) before any round runs.
    pub fn seed_context(&mut self, context: impl Into<String>) {
        self.log.insert(
            0,
            TeamMessage {
                speaker: Speaker::User,
                text: context.into(),
            },
        );
    }

    /// Appends a user message that the next round responds to.
    pub fn push_user_message(&mut self, text: impl Into<String>) {
        self.log.push(TeamMessage {
            speaker: Speaker::User,
            text: text.into(),
        });
        self.trim();
    }

    /// Runs one member's turn of the current round: builds that member's
    /// view of the shared conversation, invokes its model, and appends the
    /// reply to the log so later members in the round can see it.
    ///
    /// # Errors
    ///
    /// `AgentError::UnknownAgent` for an out-of-range position, otherwise
    /// whatever the model call produced. The log is untouched on error.
    pub async fn reply(&mut self, position: usize) -> Result<(String, UsageRecord), AgentError> {
        let member = self
            .members
            .get(position)
            .ok_or(AgentError::UnknownAgent(position))?;
        let agent_index = member.agent_index;
        let model_id = member.model_id.clone();

        let mut messages = Vec::with_capacity(self.log.len() + 1);
        messages.push(ChatMessage::system(&member.system_prompt));
        for entry in &self.log {
            match entry.speaker {
                Speaker::User => messages.push(ChatMessage::user(&entry.text)),
                Speaker::Agent(i) if i == agent_index => {
                    messages.push(ChatMessage::assistant(&entry.text));
                }
                Speaker::Agent(i) => {
                    // Other members' turns arrive attributed by name.
                    messages.push(ChatMessage::user(format!(
                        "{}: {}",
                        self.display_name_of(i),
                        entry.text
                    )));
                }
            }
        }

        let (content, usage) = self.invoker.chat(&model_id, &messages).await?;

        self.log.push(TeamMessage {
            speaker: Speaker::Agent(agent_index),
            text: content.clone(),
        });
        self.trim();

        Ok((content, usage))
    }

    fn display_name_of(&self, agent_index: usize) -> &str {
        self.members
            .iter()
            .find(|m| m.agent_index == agent_index)
            .map(|m| m.display_name.as_str())
            .unwrap_or("Agent")
    }

    fn trim(&mut self) {
        while self.log.len() > TEAM_LOG_CAPACITY {
            // Index 0 holds the seeded context; drop the oldest entry after it.
            self.log.remove(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedInvoker {
        calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
        fail_models: Vec<String>,
    }

    impl ScriptedInvoker {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_models: Vec::new(),
            })
        }

        fn failing(models: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_models: models.iter().map(|m| m.to_string()).collect(),
            })
        }
    }

    #[async_trait]
    impl ModelInvoker for ScriptedInvoker {
        async fn chat(
            &self,
            model_id: &str,
            messages: &[ChatMessage],
        ) -> Result<(String, UsageRecord), AgentError> {
            self.calls
                .lock()
                .unwrap()
                .push((model_id.to_string(), messages.to_vec()));
            if self.fail_models.iter().any(|m| m == model_id) {
                return Err(AgentError::from_http(500, "server error".to_string()));
            }
            Ok((format!("{model_id} says hi"), UsageRecord::new(5, 5)))
        }
    }

    fn member(agent_index: usize, name: &str) -> TeamMember {
        TeamMember {
            agent_index,
            symbol: format!("s{agent_index}"),
            label: name.to_string(),
            display_name: name.to_string(),
            model_id: format!("provider/{name}"),
            system_prompt: format!("you are {name}"),
        }
    }

    fn team(invoker: Arc<ScriptedInvoker>) -> Team {
        Team::new(vec![member(0, "alpha"), member(2, "gamma")], invoker)
    }

    #[tokio::test]
    async fn test_round_runs_members_in_order_with_shared_view() {
        let invoker = ScriptedInvoker::new();
        let mut team = team(invoker.clone());

        team.seed_context("Original Prompt:\nq");
        team.push_user_message("round one");

        for pos in 0..team.len() {
            team.reply(pos).await.unwrap();
        }

        let calls = invoker.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "provider/alpha");
        assert_eq!(calls[1].0, "provider/gamma");

        // The second member sees the first member's reply, attributed.
        let gamma_view = &calls[1].1;
        let attributed = gamma_view
            .iter()
            .any(|m| m.content == "alpha: provider/alpha says hi");
        assert!(attributed);
    }

    #[tokio::test]
    async fn test_own_replies_come_back_as_assistant_role() {
        let invoker = ScriptedInvoker::new();
        let mut team = team(invoker.clone());

        team.push_user_message("one");
        team.reply(0).await.unwrap();
        team.push_user_message("two");
        team.reply(0).await.unwrap();

        let calls = invoker.calls.lock().unwrap();
        let second_view = &calls[1].1;
        let own = second_view
            .iter()
            .find(|m| m.content == "provider/alpha says hi")
            .unwrap();
        assert_eq!(own.role, crate::client::Role::Assistant);
    }

    #[tokio::test]
    async fn test_failed_member_leaves_log_untouched() {
        let invoker = ScriptedInvoker::failing(&["provider/alpha"]);
        let mut team = team(invoker);

        team.push_user_message("round");
        let before = team.log().len();
        assert!(team.reply(0).await.is_err());
        assert_eq!(team.log().len(), before);

        // The next member still responds.
        team.reply(1).await.unwrap();
        assert_eq!(team.log().len(), before + 1);
    }

    #[tokio::test]
    async fn test_unknown_position_errors() {
        let mut team = team(ScriptedInvoker::new());
        assert!(matches!(
            team.reply(9).await.unwrap_err(),
            AgentError::UnknownAgent(9)
        ));
    }

    #[tokio::test]
    async fn test_log_trim_preserves_seed() {
        let invoker = ScriptedInvoker::new();
        let mut team = team(invoker);

        team.seed_context("SEED");
        for i in 0..60 {
            team.push_user_message(format!("m{i}"));
        }

        assert!(team.log().len() <= 48);
        assert_eq!(team.log()[0].text, "SEED");
    }
}
