//! Command-line argument parsing and model resolution.

use clap::{Parser, ValueEnum};
use superchat_core::models::ModelRegistry;
use superchat_core::resolver::{ResolveOutcome, resolve_model_from_input};
use superchat_core::session::FlowMode;

/// AI-driven discussions and multi-agent debates.
#[derive(Parser, Debug)]
#[command(name = "superchat")]
#[command(about = "AI-driven discussions and multi-agent debates", long_about = None)]
pub struct Args {
    /// Add models to the chat. Repeatable and comma-separated:
    /// -m lite -m k2, or -m "lite,k2"
    #[arg(short, long = "model", value_name = "MODEL")]
    pub model: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Enable voice output mode (currently inert)
    #[arg(short, long)]
    pub voice: bool,

    /// Chat flow mode
    #[arg(short, long, value_enum)]
    pub flow: Option<FlowArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowArg {
    Default,
    Staged,
}

impl From<FlowArg> for FlowMode {
    fn from(arg: FlowArg) -> Self {
        match arg {
            FlowArg::Default => FlowMode::Default,
            FlowArg::Staged => FlowMode::Staged,
        }
    }
}

/// Flattens `--model` values: each flag value may itself hold a
/// comma-separated list.
pub fn parse_model_arguments(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves `--model` inputs through the fuzzy resolver.
///
/// Returns `(success, resolved_keys, errors)`: success means every input
/// resolved cleanly, which is what allows skipping the setup loop.
pub fn resolve_cli_models(
    inputs: &[String],
    registry: &ModelRegistry,
) -> (bool, Vec<String>, Vec<String>) {
    let parsed = parse_model_arguments(inputs);
    if parsed.is_empty() {
        return (false, Vec::new(), Vec::new());
    }

    let mut resolved = Vec::new();
    let mut errors = Vec::new();
    for input in &parsed {
        match resolve_model_from_input(input, registry) {
            ResolveOutcome::Selected(key) => resolved.push(key),
            ResolveOutcome::Suggest { message, .. } => errors.push(message),
            ResolveOutcome::NotFound { message } => errors.push(message),
        }
    }

    let success = errors.is_empty() && resolved.len() == parsed.len();
    (success, resolved, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_arguments_splits_commas() {
        let values = vec!["lite,k2".to_string(), "v3".to_string()];
        assert_eq!(parse_model_arguments(&values), ["lite", "k2", "v3"]);
    }

    #[test]
    fn test_parse_model_arguments_trims_and_drops_empty() {
        let values = vec![" lite , ,k2,".to_string()];
        assert_eq!(parse_model_arguments(&values), ["lite", "k2"]);
    }

    #[test]
    fn test_resolve_cli_models_success() {
        let registry = ModelRegistry::builtin();
        let (success, resolved, errors) =
            resolve_cli_models(&["lite,k2".to_string()], registry);
        assert!(success);
        assert_eq!(resolved, ["lite", "k2"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_resolve_cli_models_reports_failures() {
        let registry = ModelRegistry::builtin();
        let (success, _, errors) =
            resolve_cli_models(&["lite,zzzznotamodel".to_string()], registry);
        assert!(!success);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_no_model_inputs_is_not_success() {
        let registry = ModelRegistry::builtin();
        let (success, resolved, errors) = resolve_cli_models(&[], registry);
        assert!(!success);
        assert!(resolved.is_empty());
        assert!(errors.is_empty());
    }
}
