//! A single model-backed conversational agent.

use crate::client::{ChatMessage, ModelInvoker};
use crate::error::AgentError;
use std::collections::VecDeque;
use superchat_core::models::ModelConfig;
use superchat_core::naming::{display_symbol, make_safe_identifier};
use superchat_core::stats::UsageRecord;

/// Total rolling-context budget shared across the participants of a session.
const BASE_CONTEXT_WINDOW: usize = 40;
/// Floor for the per-agent window so small exchanges always survive.
const MIN_CONTEXT_WINDOW: usize = 8;

/// Per-agent rolling window size for a session with `participant_count`
/// agents. Shrinks as participants grow so a full round stays bounded.
pub fn context_capacity(participant_count: usize) -> usize {
    (BASE_CONTEXT_WINDOW / participant_count.max(1)).max(MIN_CONTEXT_WINDOW)
}

/// One configured conversational participant.
///
/// Agents are created once at session start; membership never changes
/// afterwards. Each agent keeps its own bounded rolling message buffer for
/// 1:1 conversations.
#[derive(Debug, Clone)]
pub struct ChatAgent {
    name: String,
    symbol: String,
    config: ModelConfig,
    system_prompt: String,
    history: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ChatAgent {
    pub fn new(
        index: usize,
        config: ModelConfig,
        system_prompt: String,
        participant_count: usize,
    ) -> Self {
        let name = format!("agent_{}_{}", make_safe_identifier(&config.key), index);
        Self {
            name,
            symbol: display_symbol(index),
            config,
            system_prompt,
            history: VecDeque::new(),
            capacity: context_capacity(participant_count),
        }
    }

    /// Generated safe identifier, e.g. `agent_lite_0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positional display symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Full display name, e.g. `Gemini Flash Lite (2.5)`.
    pub fn display_name(&self) -> String {
        self.config.display_name()
    }

    /// Short label for chat output, e.g. `Flash Lite`.
    pub fn label(&self) -> &str {
        self.config.label()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Drops the rolling 1:1 history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Sends one user message with the rolling history as context, records
    /// the exchange on success, and returns the reply with its usage.
    ///
    /// # Errors
    ///
    /// Propagates the invoker's error; the history is untouched then.
    pub async fn send(
        &mut self,
        invoker: &dyn ModelInvoker,
        text: &str,
    ) -> Result<(String, UsageRecord), AgentError> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(&self.system_prompt));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(text));

        let (response, usage) = invoker.chat(&self.config.openrouter_id, &messages).await?;

        self.history.push_back(ChatMessage::user(text));
        self.history.push_back(ChatMessage::assistant(response.clone()));
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        Ok((response, usage))
    }
}
