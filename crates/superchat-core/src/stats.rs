//! Usage accounting and cost estimation.

use crate::models::ModelConfig;
use serde::{Deserialize, Serialize};

/// Token usage reported by a single completed model call (or an
/// accumulated round of calls).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl UsageRecord {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Adds another record into this one (accumulating a round).
    pub fn absorb(&mut self, other: &UsageRecord) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }

    pub fn is_empty(&self) -> bool {
        self.total_tokens() == 0
    }
}

/// A point-in-time snapshot of session statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Elapsed wall-clock time formatted `HH:MM:SS`.
    pub duration: String,
    pub conversation_rounds: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,
}

/// Cost for a single model given its share of the session's tokens.
pub fn model_cost(config: &ModelConfig, input_tokens: f64, output_tokens: f64) -> f64 {
    let input_cost = input_tokens / 1_000_000.0 * config.input_cost;
    let output_cost = output_tokens / 1_000_000.0 * config.output_cost;
    input_cost + output_cost
}

/// Estimates total session cost plus a per-model breakdown.
///
/// Tokens are distributed evenly across all configured models. This is a
/// deliberate simplification: no per-agent usage attribution exists
/// upstream, so an even split is the honest estimate.
pub fn estimate_cost(stats: &SessionStats, models: &[ModelConfig]) -> (f64, Vec<(String, f64)>) {
    if models.is_empty() {
        return (0.0, Vec::new());
    }

    let share = models.len() as f64;
    let input_share = stats.total_input_tokens as f64 / share;
    let output_share = stats.total_output_tokens as f64 / share;

    let mut total = 0.0;
    let mut breakdown = Vec::with_capacity(models.len());
    for config in models {
        let cost = model_cost(config, input_share, output_share);
        total += cost;
        breakdown.push((config.label().to_string(), cost));
    }
    (total, breakdown)
}
