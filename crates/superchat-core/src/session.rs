//! Session configuration and runtime state.
//!
//! `SessionConfig` is the in-memory record of what the user configured and
//! what the session has consumed so far. It is created before the chat
//! starts, mutated by every completed exchange, and dropped at exit; there
//! is no persistence.

use crate::stats::{SessionStats, UsageRecord};
use chrono::{DateTime, Utc};

/// Conversation flow for multi-agent sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowMode {
    /// Every message triggers one round where each agent responds once.
    #[default]
    Default,
    /// Individual 1:1 conversations first, then promotion into a team
    /// debate with shared context.
    Staged,
}

/// In-memory configuration and counters for a chat session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    models: Vec<String>,
    flow_mode: FlowMode,
    voice_enabled: bool,
    session_active: bool,
    current_model: Option<String>,
    started_at: Option<DateTime<Utc>>,
    total_input_tokens: u64,
    total_output_tokens: u64,
    conversation_rounds: u64,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model key if not already present. Returns whether it was added.
    pub fn add_model(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.models.contains(&key) {
            return false;
        }
        self.models.push(key);
        true
    }

    /// Removes a model key. Clears the current-model pointer if it matched.
    /// Returns whether anything was removed.
    pub fn remove_model(&mut self, key: &str) -> bool {
        let Some(pos) = self.models.iter().position(|m| m == key) else {
            return false;
        };
        self.models.remove(pos);
        if self.current_model.as_deref() == Some(key) {
            self.current_model = None;
        }
        true
    }

    /// Configured model keys in selection order (defines agent index order).
    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn flow_mode(&self) -> FlowMode {
        self.flow_mode
    }

    pub fn set_flow_mode(&mut self, mode: FlowMode) {
        self.flow_mode = mode;
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    /// Voice output is accepted on the command line but currently inert.
    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.voice_enabled = enabled;
    }

    pub fn is_multi_agent(&self) -> bool {
        self.models.len() > 1
    }

    pub fn is_valid_for_start(&self) -> bool {
        !self.models.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.session_active
    }

    pub fn current_model(&self) -> Option<&str> {
        self.current_model.as_deref()
    }

    /// Marks the session active, records the start instant, and points the
    /// current model at the first configured one. Returns false (and leaves
    /// state untouched) when no model is configured.
    pub fn start(&mut self) -> bool {
        if self.models.is_empty() {
            return false;
        }
        self.session_active = true;
        self.current_model = Some(self.models[0].clone());
        self.started_at = Some(Utc::now());
        true
    }

    /// Marks the session inactive.
    pub fn stop(&mut self) {
        self.session_active = false;
        self.current_model = None;
    }

    /// Accumulates the usage of one completed conversation round.
    pub fn record_usage(&mut self, usage: &UsageRecord) {
        self.total_input_tokens += usage.prompt_tokens;
        self.total_output_tokens += usage.completion_tokens;
        self.conversation_rounds += 1;
    }

    /// Wall-clock time since `start()`, zero when the session never started.
    pub fn elapsed(&self) -> chrono::Duration {
        match self.started_at {
            Some(start) => Utc::now() - start,
            None => chrono::Duration::zero(),
        }
    }

    /// Snapshot of the running counters with the duration pre-formatted.
    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            duration: format_duration(self.elapsed()),
            conversation_rounds: self.conversation_rounds,
            total_input_tokens: self.total_input_tokens,
            total_output_tokens: self.total_output_tokens,
            total_tokens: self.total_input_tokens + self.total_output_tokens,
        }
    }
}

/// Formats an elapsed duration as `HH:MM:SS`.
fn format_duration(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_model_rejects_duplicates() {
        let mut config = SessionConfig::new();
        assert!(config.add_model("lite"));
        assert!(!config.add_model("lite"));
        assert_eq!(config.models(), ["lite"]);
    }

    #[test]
    fn test_remove_model_clears_current_pointer() {
        let mut config = SessionConfig::new();
        config.add_model("lite");
        config.add_model("k2");
        assert!(config.start());
        assert_eq!(config.current_model(), Some("lite"));

        assert!(config.remove_model("lite"));
        assert_eq!(config.current_model(), None);
        assert!(!config.remove_model("lite"));
    }

    #[test]
    fn test_start_requires_a_model() {
        let mut config = SessionConfig::new();
        assert!(!config.start());
        assert!(!config.is_active());

        config.add_model("lite");
        assert!(config.start());
        assert!(config.is_active());
    }

    #[test]
    fn test_stop_clears_active_state() {
        let mut config = SessionConfig::new();
        config.add_model("lite");
        config.start();
        assert!(config.is_active());

        config.stop();
        assert!(!config.is_active());
        assert_eq!(config.current_model(), None);
    }

    #[test]
    fn test_elapsed_is_zero_before_start() {
        let config = SessionConfig::new();
        assert_eq!(config.elapsed(), chrono::Duration::zero());
        assert_eq!(config.snapshot().duration, "00:00:00");
    }

    #[test]
    fn test_five_rounds_accumulate() {
        let mut config = SessionConfig::new();
        config.add_model("lite");
        config.start();

        for _ in 0..5 {
            config.record_usage(&UsageRecord::new(10, 5));
        }

        let stats = config.snapshot();
        assert_eq!(stats.total_tokens, 75);
        assert_eq!(stats.conversation_rounds, 5);
        assert_eq!(stats.total_input_tokens, 50);
        assert_eq!(stats.total_output_tokens, 25);
    }

    #[test]
    fn test_counters_untouched_without_record() {
        let mut config = SessionConfig::new();
        config.add_model("lite");
        config.start();
        config.record_usage(&UsageRecord::new(10, 5));

        // A failed round never calls record_usage; counters stay put.
        let before = config.snapshot();
        let after = config.snapshot();
        assert_eq!(before.total_tokens, after.total_tokens);
        assert_eq!(before.conversation_rounds, after.conversation_rounds);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(0)), "00:00:00");
        assert_eq!(format_duration(chrono::Duration::seconds(61)), "00:01:01");
        assert_eq!(format_duration(chrono::Duration::seconds(3661)), "01:01:01");
    }
}
