// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./prism.toml` > `~/.config/prism/prism.toml` >
//! `/etc/prism/prism.toml` with environment variable overrides via the
//! `PRISM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PrismConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/prism/prism.toml` (system-wide)
/// 3. `~/.config/prism/prism.toml` (user XDG config)
/// 4. `./prism.toml` (local directory)
/// 5. `PRISM_*` environment variables
pub fn load_config() -> Result<PrismConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PrismConfig::default()))
        .merge(Toml::file("/etc/prism/prism.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("prism/prism.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("prism.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<PrismConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PrismConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PrismConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PrismConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PRISM_ROUTING_MAX_FALLBACKS` must map to
/// `routing.max_fallbacks`, not `routing.max.fallbacks`.
fn env_provider() -> Env {
    Env::prefixed("PRISM_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped, lowercased env var name onto its dotted config path.
///
/// Example: `PRISM_ROUTING_MAX_FALLBACKS` arrives as `routing_max_fallbacks`
/// and maps to `routing.max_fallbacks`.
fn map_env_key(key: &str) -> String {
    key.replacen("classifier_", "classifier.", 1)
        .replacen("routing_", "routing.", 1)
        .replacen("agent_", "agent.", 1)
        .replacen("stream_", "stream.", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_from_empty_string() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.routing.max_fallbacks, 3);
        assert_eq!(config.classifier.verification_timeout_secs, 3);
        assert!(!config.models.is_empty());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[classifier]
verification_timeout_secs = 5

[routing]
max_fallbacks = 1
force_model = "claude-opus-4-20250514"
"#,
        )
        .unwrap();
        assert_eq!(config.classifier.verification_timeout_secs, 5);
        assert_eq!(config.routing.max_fallbacks, 1);
        assert_eq!(
            config.routing.force_model.as_deref(),
            Some("claude-opus-4-20250514")
        );
    }

    #[test]
    fn models_array_replaces_default_catalogue() {
        let config = load_config_from_str(
            r#"
[[models]]
id = "only-model"
task_categories = ["general_text"]
priority = 1
"#,
        )
        .unwrap();
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].id, "only-model");
    }

    #[test]
    fn env_key_mapping_preserves_underscored_names() {
        assert_eq!(map_env_key("routing_max_fallbacks"), "routing.max_fallbacks");
        assert_eq!(map_env_key("stream_idle_grace_secs"), "stream.idle_grace_secs");
        assert_eq!(
            map_env_key("classifier_verification_timeout_secs"),
            "classifier.verification_timeout_secs"
        );
        assert_eq!(map_env_key("agent_timeout_secs"), "agent.timeout_secs");
        // Keys outside known sections pass through unchanged.
        assert_eq!(map_env_key("unrelated_key"), "unrelated_key");
    }
}
