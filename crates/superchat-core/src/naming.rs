//! Agent naming helpers: safe identifiers and positional display symbols.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid pattern"));
static UNDERSCORE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("valid pattern"));

/// Display symbols assigned to agents by setup position.
const SYMBOLS: [&str; 6] = ["д", "ф", "ш", "в", "г", "л"];

/// Converts an arbitrary string into a safe identifier suitable for agent
/// names: non-alphanumeric runs collapse to `_`, digit-led names get a
/// `model_` prefix, and an empty result falls back to `agent`.
pub fn make_safe_identifier(name: &str) -> String {
    let replaced = NON_ALNUM.replace_all(name, "_");
    let mut safe = UNDERSCORE_RUNS
        .replace_all(&replaced, "_")
        .trim_matches('_')
        .to_string();

    if safe.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        safe = format!("model_{safe}");
    }
    if safe.is_empty() {
        safe = "agent".to_string();
    }
    safe
}

/// Returns the display symbol for an agent index: a short fixed alphabet,
/// then `#N` once the alphabet is exhausted.
pub fn display_symbol(index: usize) -> String {
    SYMBOLS
        .get(index)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("#{}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_identifier_collapses_punctuation() {
        assert_eq!(make_safe_identifier("gemini-2.5-flash"), "gemini_2_5_flash");
    }

    #[test]
    fn test_safe_identifier_digit_prefix() {
        assert_eq!(make_safe_identifier("4o-mini"), "model_4o_mini");
    }

    #[test]
    fn test_safe_identifier_empty_fallback() {
        assert_eq!(make_safe_identifier("---"), "agent");
        assert_eq!(make_safe_identifier(""), "agent");
    }

    #[test]
    fn test_display_symbols_in_order() {
        assert_eq!(display_symbol(0), "д");
        assert_eq!(display_symbol(5), "л");
        assert_eq!(display_symbol(6), "#7");
    }
}
