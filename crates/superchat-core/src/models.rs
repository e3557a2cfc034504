//! Model catalog for OpenRouter-backed chat models.
//!
//! The catalog is embedded at compile time from `config/models.toml`. Each
//! entry maps a short key (what users type) to the OpenRouter model id, the
//! name fields used for display and matching, and per-million-token costs.
//!
//! When OpenRouter adds or reprices a model, update `config/models.toml`;
//! the `key` is the stable handle the rest of the code refers to.

use crate::error::Result;
use once_cell::sync::Lazy;
use serde::Deserialize;

const EMBEDDED_CATALOG: &str = include_str!("../config/models.toml");

/// Configuration for a single chat model.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Short key users type to select this model (e.g. "k2", "lite").
    pub key: String,
    /// Provider company name (used for fuzzy matching only).
    pub company: String,
    /// Model family (e.g. "Gemini").
    pub family: String,
    /// Model name within the family (e.g. "Flash Lite").
    pub model: String,
    /// Release or version string; may be empty.
    #[serde(default)]
    pub release: String,
    /// Fully-qualified OpenRouter model id.
    pub openrouter_id: String,
    /// USD per million input tokens.
    pub input_cost: f64,
    /// USD per million output tokens.
    pub output_cost: f64,
}

impl ModelConfig {
    /// Human-readable display name: `Family Model (Release)`.
    pub fn display_name(&self) -> String {
        let base = join_nonempty(&[self.family.as_str(), self.model.as_str()]);
        if self.release.trim().is_empty() {
            base
        } else {
            format!("{} ({})", base, self.release.trim())
        }
    }

    /// Flat matching name used for exact lookups: `family model release`,
    /// lowercased and space-joined.
    pub fn match_name(&self) -> String {
        join_nonempty(&[
            self.family.as_str(),
            self.model.as_str(),
            self.release.as_str(),
        ])
        .to_lowercase()
    }

    /// Short label shown next to the agent symbol in chat output.
    pub fn label(&self) -> &str {
        &self.model
    }
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct Catalog {
    models: Vec<ModelConfig>,
}

/// The set of models superchat knows how to talk to.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelConfig>,
}

static BUILTIN: Lazy<ModelRegistry> = Lazy::new(|| {
    ModelRegistry::from_toml_str(EMBEDDED_CATALOG)
        .unwrap_or_else(|e| panic!("embedded model catalog is invalid: {e}"))
});

impl ModelRegistry {
    /// Returns the registry parsed from the embedded catalog.
    pub fn builtin() -> &'static ModelRegistry {
        &BUILTIN
    }

    /// Parses a registry from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the TOML is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(text)?;
        Ok(Self {
            models: catalog.models,
        })
    }

    /// Looks up a model by its short key.
    pub fn get(&self, key: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.key == key)
    }

    /// All configured models, in catalog order.
    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    /// All short keys, in catalog order.
    pub fn keys(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.key.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let registry = ModelRegistry::builtin();
        assert!(registry.models().len() >= 2);
        assert!(registry.get("lite").is_some());
    }

    #[test]
    fn test_display_name_with_and_without_release() {
        let registry = ModelRegistry::builtin();
        let lite = registry.get("lite").unwrap();
        assert_eq!(lite.display_name(), "Gemini Flash Lite (2.5)");

        let k2 = registry.get("k2").unwrap();
        assert_eq!(k2.display_name(), "Kimi K2");
    }

    #[test]
    fn test_match_name_is_lowercase_flat() {
        let registry = ModelRegistry::builtin();
        let lite = registry.get("lite").unwrap();
        assert_eq!(lite.match_name(), "gemini flash lite 2.5");
    }

    #[test]
    fn test_unknown_key_returns_none() {
        assert!(ModelRegistry::builtin().get("nope").is_none());
    }
}
