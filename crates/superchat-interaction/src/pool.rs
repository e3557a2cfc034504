//! The pool of agents configured for a session.

use crate::agent::ChatAgent;
use crate::client::ModelInvoker;
use crate::error::AgentError;
use crate::prompts::{SINGLE_AGENT_PROMPT, debate_prompt};
use crate::team::{Team, TeamMember};
use async_trait::async_trait;
use std::sync::Arc;
use superchat_core::models::ModelConfig;
use superchat_core::staged::AgentChannel;
use superchat_core::stats::UsageRecord;

/// Owns one [`ChatAgent`] per configured model, in setup order.
///
/// Membership is fixed at construction. All agents share one invoker.
pub struct AgentPool {
    agents: Vec<ChatAgent>,
    invoker: Arc<dyn ModelInvoker>,
}

impl AgentPool {
    /// Builds one agent per model config. Single-agent sessions get the
    /// plain assistant persona; multi-agent sessions get the debate persona
    /// naming the other participants.
    pub fn new(models: &[ModelConfig], invoker: Arc<dyn ModelInvoker>) -> Self {
        let multi_agent = models.len() > 1;

        let agents = models
            .iter()
            .enumerate()
            .map(|(index, config)| {
                let system_prompt = if multi_agent {
                    let others: Vec<String> = models
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != index)
                        .map(|(_, other)| other.display_name())
                        .collect();
                    debate_prompt(&config.display_name(), &others, models.len())
                } else {
                    SINGLE_AGENT_PROMPT.to_string()
                };
                ChatAgent::new(index, config.clone(), system_prompt, models.len())
            })
            .collect();

        Self { agents, invoker }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent(&self, index: usize) -> Option<&ChatAgent> {
        self.agents.get(index)
    }

    pub fn agents(&self) -> &[ChatAgent] {
        &self.agents
    }

    /// Display names in setup order (agent index order).
    pub fn display_names(&self) -> Vec<String> {
        self.agents.iter().map(ChatAgent::display_name).collect()
    }

    /// Sends a message to the agent at `index` through its rolling context.
    ///
    /// # Errors
    ///
    /// `AgentError::UnknownAgent` for an out-of-range index, otherwise
    /// whatever the model call produced.
    pub async fn send(
        &mut self,
        index: usize,
        text: &str,
    ) -> Result<(String, UsageRecord), AgentError> {
        let invoker = Arc::clone(&self.invoker);
        let agent = self
            .agents
            .get_mut(index)
            .ok_or(AgentError::UnknownAgent(index))?;
        agent.send(invoker.as_ref(), text).await
    }

    /// Clears the rolling history of the agent at `index`.
    pub fn clear_agent_history(&mut self, index: usize) {
        if let Some(agent) = self.agents.get_mut(index) {
            agent.clear_history();
        }
    }

    /// Builds a debate team over exactly the given agent subset. Each
    /// member keeps the identity and persona it was set up with; unknown
    /// indices are ignored.
    pub fn build_team(&self, indices: &[usize]) -> Team {
        let members = indices
            .iter()
            .filter_map(|&index| self.agents.get(index).map(|a| (index, a)))
            .map(|(index, agent)| TeamMember {
                agent_index: index,
                symbol: agent.symbol().to_string(),
                label: agent.label().to_string(),
                display_name: agent.display_name(),
                model_id: agent.config().openrouter_id.clone(),
                system_prompt: agent.system_prompt().to_string(),
            })
            .collect();
        Team::new(members, Arc::clone(&self.invoker))
    }
}

#[async_trait]
impl AgentChannel for AgentPool {
    type Error = AgentError;

    async fn send(
        &mut self,
        agent_index: usize,
        message: &str,
    ) -> Result<(String, UsageRecord), Self::Error> {
        AgentPool::send(self, agent_index, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;
    use std::sync::Mutex;
    use superchat_core::models::ModelRegistry;

    struct RecordingInvoker {
        calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl RecordingInvoker {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelInvoker for RecordingInvoker {
        async fn chat(
            &self,
            model_id: &str,
            messages: &[ChatMessage],
        ) -> Result<(String, UsageRecord), AgentError> {
            self.calls
                .lock()
                .unwrap()
                .push((model_id.to_string(), messages.to_vec()));
            Ok((format!("reply from {model_id}"), UsageRecord::new(7, 3)))
        }
    }

    fn models(keys: &[&str]) -> Vec<superchat_core::models::ModelConfig> {
        let registry = ModelRegistry::builtin();
        keys.iter()
            .map(|k| registry.get(k).unwrap().clone())
            .collect()
    }

    #[test]
    fn test_single_agent_gets_plain_persona() {
        let pool = AgentPool::new(&models(&["lite"]), RecordingInvoker::new());
        assert_eq!(pool.len(), 1);
        assert!(
            pool.agent(0)
                .unwrap()
                .system_prompt()
                .contains("helpful assistant")
        );
    }

    #[test]
    fn test_multi_agent_gets_debate_persona_naming_others() {
        let pool = AgentPool::new(&models(&["lite", "k2"]), RecordingInvoker::new());
        let first = pool.agent(0).unwrap();
        assert!(first.system_prompt().contains("Kimi K2"));
        assert!(!first.system_prompt().contains("You are Kimi K2"));
        let second = pool.agent(1).unwrap();
        assert!(second.system_prompt().contains("You are Kimi K2"));
        assert!(second.system_prompt().contains("Gemini Flash Lite (2.5)"));
    }

    #[tokio::test]
    async fn test_send_routes_to_indexed_agent() {
        let invoker = RecordingInvoker::new();
        let mut pool = AgentPool::new(&models(&["lite", "k2"]), invoker.clone());

        let (reply, usage) = pool.send(1, "hello").await.unwrap();
        assert_eq!(reply, "reply from moonshotai/kimi-k2");
        assert_eq!(usage.total_tokens(), 10);

        let calls = invoker.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "moonshotai/kimi-k2");
    }

    #[tokio::test]
    async fn test_send_unknown_index_errors() {
        let mut pool = AgentPool::new(&models(&["lite"]), RecordingInvoker::new());
        assert!(matches!(
            pool.send(5, "hello").await.unwrap_err(),
            AgentError::UnknownAgent(5)
        ));
    }

    #[test]
    fn test_build_team_keeps_subset_in_order() {
        let pool = AgentPool::new(&models(&["lite", "k2", "v3"]), RecordingInvoker::new());
        let team = pool.build_team(&[0, 2]);
        assert_eq!(team.len(), 2);
        let indices: Vec<usize> = team.members().iter().map(|m| m.agent_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
