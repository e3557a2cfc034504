//! Model name resolution: exact lookup plus fuzzy matching.
//!
//! Users select models with loose input ("flash lite", "deepseek", "k2").
//! Resolution tries an exact match against the flat display name first,
//! then falls back to scored fuzzy matching over the catalog name fields,
//! auto-selecting only when there is a clear winner.

use crate::models::{ModelConfig, ModelRegistry};
use std::collections::HashSet;

/// Minimum score for a model to appear in the match list.
const MATCH_THRESHOLD: f64 = 0.4;
/// A word is considered matched when its best similarity reaches this.
const WORD_MATCH_THRESHOLD: f64 = 0.7;

/// Outcome of resolving user input to a model key.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// Input resolved to a single model key.
    Selected(String),
    /// Multiple plausible matches; show suggestions to the user.
    Suggest {
        message: String,
        suggestions: Vec<String>,
    },
    /// Nothing matched.
    NotFound { message: String },
}

/// A scored fuzzy match candidate.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub key: String,
    pub display_name: String,
    pub score: f64,
}

/// Resolves user input to a model key using exact then fuzzy matching.
pub fn resolve_model_from_input(user_input: &str, registry: &ModelRegistry) -> ResolveOutcome {
    let input = user_input.trim();
    if input.is_empty() {
        return ResolveOutcome::NotFound {
            message: "No model name provided".to_string(),
        };
    }

    if let Some(key) = find_exact_match(input, registry) {
        return ResolveOutcome::Selected(key);
    }

    let matches = find_matching_models(input, registry);

    if matches.is_empty() {
        return ResolveOutcome::NotFound {
            message: format!("Model '{input}' not found"),
        };
    }

    if should_auto_select(&matches) {
        return ResolveOutcome::Selected(matches[0].key.clone());
    }

    let suggestions: Vec<String> = matches
        .iter()
        .take(3)
        .map(|m| m.display_name.clone())
        .collect();
    let message = format!(
        "Multiple matches for '{input}':\nDid you mean: {}?",
        suggestions.join(", ")
    );
    ResolveOutcome::Suggest {
        message,
        suggestions,
    }
}

/// Finds an exact (case-insensitive) match against key or flat display name.
pub fn find_exact_match(user_input: &str, registry: &ModelRegistry) -> Option<String> {
    let input = user_input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    registry
        .models()
        .iter()
        .find(|m| m.key.to_lowercase() == input || m.match_name() == input)
        .map(|m| m.key.clone())
}

/// Scores every catalog entry against the input and returns candidates at or
/// above the match threshold, best first (ties broken by display name).
pub fn find_matching_models(user_input: &str, registry: &ModelRegistry) -> Vec<MatchCandidate> {
    let input = user_input.trim().to_lowercase();
    if input.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<MatchCandidate> = registry
        .models()
        .iter()
        .filter_map(|m| {
            let score = match_score(&input, m);
            (score >= MATCH_THRESHOLD).then(|| MatchCandidate {
                key: m.key.clone(),
                display_name: m.display_name(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    matches
}

/// Decides whether the top candidate is unambiguous enough to auto-select.
pub fn should_auto_select(matches: &[MatchCandidate]) -> bool {
    let Some(top) = matches.first() else {
        return false;
    };

    // Two near-perfect matches means the user has to choose.
    if matches.len() >= 2 && matches[1].score >= 0.95 {
        return false;
    }

    if top.score >= 0.8 {
        return true;
    }

    match matches.get(1) {
        Some(second) => top.score >= 0.6 && top.score - second.score >= 0.2,
        None => top.score >= 0.6,
    }
}

fn match_score(input: &str, model: &ModelConfig) -> f64 {
    let flat_name = model.match_name();
    let full_score = similarity(input, &flat_name);
    if full_score >= 0.9 {
        return full_score;
    }

    // Word-by-word matching over all name fields; periods split so
    // release strings like "2.5" contribute their parts too.
    let mut field_words: Vec<String> = Vec::new();
    for field in [&model.company, &model.family, &model.model, &model.release] {
        field_words.extend(
            field
                .replace('.', " ")
                .split_whitespace()
                .map(str::to_lowercase),
        );
    }

    let input_words: Vec<&str> = input.split_whitespace().collect();

    if input_words.len() == 1 {
        let best = field_words
            .iter()
            .map(|w| similarity(input, w))
            .fold(0.0_f64, f64::max);
        return full_score.max(best);
    }

    let mut matched_words = 0usize;
    let mut total_word_score = 0.0;
    for word in &input_words {
        let best = field_words
            .iter()
            .map(|w| similarity(word, w))
            .fold(0.0_f64, f64::max);
        if best >= WORD_MATCH_THRESHOLD {
            matched_words += 1;
        }
        total_word_score += best;
    }

    let coverage = matched_words as f64 / input_words.len() as f64;
    let avg_quality = total_word_score / input_words.len() as f64;
    full_score.max(coverage * 0.7 + avg_quality * 0.3)
}

/// Character-bigram Jaccard similarity between two strings.
fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_bigrams: HashSet<(char, char)> = a.chars().zip(a.chars().skip(1)).collect();
    let b_bigrams: HashSet<(char, char)> = b.chars().zip(b.chars().skip(1)).collect();

    if a_bigrams.is_empty() || b_bigrams.is_empty() {
        // Single-character inputs have no bigrams; equality was checked above.
        return 0.0;
    }

    let intersection = a_bigrams.intersection(&b_bigrams).count();
    let union = a_bigrams.union(&b_bigrams).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
