// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Prism routing layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use prism_core::types::{ModelSpec, TaskCategory};
use serde::{Deserialize, Serialize};

/// Top-level Prism configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrismConfig {
    /// Complexity and task classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Fallback-chain routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Sandboxed agent profile for the agent path.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Stream normalization settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// The model catalogue, ordered by declaration; selection order comes
    /// from each entry's `priority`.
    #[serde(default = "default_models")]
    pub models: Vec<ModelSpec>,
}

// Manual impl: the derived Default would leave `models` empty, and the
// loader's defaults layer serializes this value, bypassing the serde field
// default.
impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            routing: RoutingConfig::default(),
            agent: AgentConfig::default(),
            stream: StreamConfig::default(),
            models: default_models(),
        }
    }
}

/// Classifier configuration.
///
/// The verification call is always mandatory on the non-heuristic path; only
/// its deadline is configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Deadline for the structured verification call, in seconds.
    #[serde(default = "default_verification_timeout_secs")]
    pub verification_timeout_secs: u64,

    /// Auxiliary model identifier decision clients should verify with.
    #[serde(default = "default_verifier_model")]
    pub verifier_model: String,

    /// Word-count ceiling for the trivial-greeting short circuit.
    #[serde(default = "default_trivial_max_words")]
    pub trivial_max_words: usize,

    /// Word-count ceiling for the simple-text heuristic on the task axis.
    #[serde(default = "default_simple_max_words")]
    pub simple_max_words: usize,

    /// Character cap for the logged text preview. Never used for routing.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl ClassifierConfig {
    /// The verification deadline as a [`Duration`].
    pub fn verification_timeout(&self) -> Duration {
        Duration::from_secs(self.verification_timeout_secs)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            verification_timeout_secs: default_verification_timeout_secs(),
            verifier_model: default_verifier_model(),
            trivial_max_words: default_trivial_max_words(),
            simple_max_words: default_simple_max_words(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_verification_timeout_secs() -> u64 {
    3
}

fn default_verifier_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_trivial_max_words() -> usize {
    12
}

fn default_simple_max_words() -> usize {
    10
}

fn default_preview_chars() -> usize {
    120
}

/// Fallback-chain routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Maximum number of fallback candidates after the primary.
    #[serde(default = "default_max_fallbacks")]
    pub max_fallbacks: usize,

    /// Operator pin of the primary model by catalogue id. Fallback planning
    /// still applies around the pinned primary.
    #[serde(default)]
    pub force_model: Option<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_fallbacks: default_max_fallbacks(),
            force_model: None,
        }
    }
}

fn default_max_fallbacks() -> usize {
    3
}

/// Sandboxed agent profile used on the agent path.
///
/// The agent is an external collaborator; this section only describes the
/// invocation profile handed to its backend adapter. The agent profile is
/// deliberately not part of the routing catalogue so fallback planning can
/// never select it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Model identifier the agent runs with inside its sandbox.
    #[serde(default = "default_agent_model")]
    pub model: String,

    /// Overall deadline for one agent run, in seconds.
    #[serde(default = "default_agent_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens the agent may generate per response.
    #[serde(default = "default_agent_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl AgentConfig {
    /// Build the invocation profile handed to the agent backend.
    pub fn profile(&self) -> ModelSpec {
        ModelSpec {
            id: self.model.clone(),
            display_name: "sandboxed agent".to_string(),
            task_categories: vec![TaskCategory::Unknown],
            priority: 0,
            max_output_tokens: self.max_output_tokens,
            supports_vision: true,
            call_timeout_secs: self.timeout_secs,
            temperature: 0.7,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_agent_model(),
            timeout_secs: default_agent_timeout_secs(),
            max_output_tokens: default_agent_max_output_tokens(),
        }
    }
}

fn default_agent_model() -> String {
    "claude-opus-4-20250514".to_string()
}

fn default_agent_timeout_secs() -> u64 {
    300
}

fn default_agent_max_output_tokens() -> u32 {
    8192
}

/// Stream normalization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// How long the normalizer waits on a silent upstream before synthesizing
    /// a degraded terminal chunk, in seconds.
    #[serde(default = "default_idle_grace_secs")]
    pub idle_grace_secs: u64,
}

impl StreamConfig {
    /// The idle grace period as a [`Duration`].
    pub fn idle_grace(&self) -> Duration {
        Duration::from_secs(self.idle_grace_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            idle_grace_secs: default_idle_grace_secs(),
        }
    }
}

fn default_idle_grace_secs() -> u64 {
    5
}

/// Built-in model catalogue: one tier per broad specialization, non-vision
/// text tiers kept separate from the vision tier so fallback filtering has
/// candidates on both sides.
fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec {
            id: "claude-haiku-4-5-20250901".to_string(),
            display_name: "Claude Haiku".to_string(),
            task_categories: vec![TaskCategory::SimpleText],
            priority: 10,
            max_output_tokens: 2048,
            supports_vision: false,
            call_timeout_secs: 30,
            temperature: 0.7,
        },
        ModelSpec {
            id: "claude-sonnet-4-20250514".to_string(),
            display_name: "Claude Sonnet".to_string(),
            task_categories: vec![TaskCategory::GeneralText, TaskCategory::Creative],
            priority: 20,
            max_output_tokens: 8192,
            supports_vision: false,
            call_timeout_secs: 60,
            temperature: 0.7,
        },
        ModelSpec {
            id: "claude-opus-4-20250514".to_string(),
            display_name: "Claude Opus".to_string(),
            task_categories: vec![TaskCategory::MathReasoning, TaskCategory::Programming],
            priority: 30,
            max_output_tokens: 16384,
            supports_vision: false,
            call_timeout_secs: 120,
            temperature: 0.3,
        },
        ModelSpec {
            id: "claude-sonnet-4-5-20250929".to_string(),
            display_name: "Claude Sonnet 4.5 (vision)".to_string(),
            task_categories: vec![TaskCategory::Vision],
            priority: 15,
            max_output_tokens: 8192,
            supports_vision: true,
            call_timeout_secs: 60,
            temperature: 0.7,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_catalogue() {
        let config = PrismConfig::default();
        assert_eq!(config.models.len(), 4);
        assert!(config.models.iter().any(|m| m.serves(TaskCategory::GeneralText)));
        assert!(config.models.iter().any(|m| m.supports_vision));
        assert!(config.models.iter().any(|m| !m.supports_vision));
    }

    #[test]
    fn classifier_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.verification_timeout(), Duration::from_secs(3));
        assert_eq!(config.trivial_max_words, 12);
        assert_eq!(config.preview_chars, 120);
    }

    #[test]
    fn models_deserialize_from_toml_array() {
        let toml_str = r#"
[[models]]
id = "claude-haiku-4-5-20250901"
task_categories = ["simple_text", "general_text"]
priority = 5

[[models]]
id = "claude-opus-4-20250514"
task_categories = ["math_reasoning"]
priority = 1
call_timeout_secs = 90
"#;
        let config: PrismConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].priority, 5);
        assert!(config.models[0].serves(TaskCategory::SimpleText));
        assert_eq!(config.models[1].call_timeout(), Duration::from_secs(90));
    }

    #[test]
    fn unknown_section_key_rejected() {
        let toml_str = r#"
[routing]
max_fallbacks = 2
retires = 3
"#;
        assert!(toml::from_str::<PrismConfig>(toml_str).is_err());
    }

    #[test]
    fn agent_profile_stays_out_of_catalogue_shape() {
        let agent = AgentConfig::default();
        let profile = agent.profile();
        assert_eq!(profile.id, "claude-opus-4-20250514");
        assert_eq!(profile.call_timeout(), Duration::from_secs(300));
        assert_eq!(profile.task_categories, vec![TaskCategory::Unknown]);
    }

    #[test]
    fn stream_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.idle_grace(), Duration::from_secs(5));
    }
}
