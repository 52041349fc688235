// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable, priority-ordered model catalogue.
//!
//! Loaded once at process start; read-only for the process lifetime, so
//! concurrent lookups need no synchronization.

use prism_config::PrismConfig;
use prism_core::types::{ModelSpec, TaskCategory};
use prism_core::PrismError;

/// Priority-ordered catalogue of backend model descriptors.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    /// Sorted by ascending `priority` at construction (stable, so declaration
    /// order breaks ties).
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    /// Build a registry from a catalogue.
    ///
    /// Rejects an empty catalogue, duplicate ids, and a catalogue with no
    /// `general_text`-capable model -- that model anchors every category miss,
    /// so lookups can be infallible afterwards.
    pub fn new(mut models: Vec<ModelSpec>) -> Result<Self, PrismError> {
        if models.is_empty() {
            return Err(PrismError::Config("model catalogue is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for model in &models {
            if !seen.insert(model.id.clone()) {
                return Err(PrismError::Config(format!(
                    "duplicate model id `{}` in catalogue",
                    model.id
                )));
            }
        }
        if !models.iter().any(|m| m.serves(TaskCategory::GeneralText)) {
            return Err(PrismError::Config(
                "catalogue has no general_text-capable model".into(),
            ));
        }
        models.sort_by_key(|m| m.priority);
        Ok(Self { models })
    }

    /// Build a registry from loaded configuration.
    pub fn from_config(config: &PrismConfig) -> Result<Self, PrismError> {
        Self::new(config.models.clone())
    }

    /// Look up a model by id.
    pub fn get(&self, id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.id == id)
    }

    /// The lowest-priority model eligible for the given category, falling
    /// back to the general-text anchor when no model serves it exactly.
    pub fn model_for_task(&self, category: TaskCategory) -> &ModelSpec {
        self.models
            .iter()
            .find(|m| m.serves(category))
            .unwrap_or_else(|| self.general_anchor())
    }

    /// Fallback candidates for a primary: everything except the primary,
    /// filtered to the request's vision requirement on both sides (a vision
    /// request never falls back to a text-only model and vice versa),
    /// priority-ordered, capped.
    pub fn fallback_models(
        &self,
        primary_id: &str,
        requires_vision: bool,
        cap: usize,
    ) -> Vec<ModelSpec> {
        self.models
            .iter()
            .filter(|m| m.id != primary_id)
            .filter(|m| m.supports_vision == requires_vision)
            .take(cap)
            .cloned()
            .collect()
    }

    /// Number of catalogue entries.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn general_anchor(&self) -> &ModelSpec {
        // Present by construction.
        self.models
            .iter()
            .find(|m| m.serves(TaskCategory::GeneralText))
            .unwrap_or(&self.models[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, categories: Vec<TaskCategory>, priority: u32, vision: bool) -> ModelSpec {
        ModelSpec {
            id: id.to_string(),
            display_name: id.to_string(),
            task_categories: categories,
            priority,
            max_output_tokens: 1024,
            supports_vision: vision,
            call_timeout_secs: 30,
            temperature: 0.7,
        }
    }

    fn test_registry() -> ModelRegistry {
        ModelRegistry::new(vec![
            spec("fast", vec![TaskCategory::SimpleText], 10, false),
            spec("general", vec![TaskCategory::GeneralText, TaskCategory::Creative], 20, false),
            spec("reasoner", vec![TaskCategory::MathReasoning, TaskCategory::Programming], 30, false),
            spec("looker", vec![TaskCategory::Vision], 15, true),
            spec("looker-backup", vec![TaskCategory::Vision], 40, true),
        ])
        .unwrap()
    }

    #[test]
    fn empty_catalogue_rejected() {
        assert!(ModelRegistry::new(vec![]).is_err());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let result = ModelRegistry::new(vec![
            spec("m", vec![TaskCategory::GeneralText], 1, false),
            spec("m", vec![TaskCategory::Programming], 2, false),
        ]);
        assert!(matches!(result, Err(PrismError::Config(_))));
    }

    #[test]
    fn missing_general_anchor_rejected() {
        let result =
            ModelRegistry::new(vec![spec("coder", vec![TaskCategory::Programming], 1, false)]);
        assert!(matches!(result, Err(PrismError::Config(_))));
    }

    #[test]
    fn model_for_task_respects_priority() {
        let registry = ModelRegistry::new(vec![
            spec("slow-coder", vec![TaskCategory::Programming], 50, false),
            spec("fast-coder", vec![TaskCategory::Programming], 5, false),
            spec("general", vec![TaskCategory::GeneralText], 20, false),
        ])
        .unwrap();
        assert_eq!(registry.model_for_task(TaskCategory::Programming).id, "fast-coder");
    }

    #[test]
    fn unserved_category_falls_back_to_general_anchor() {
        let registry = test_registry();
        // Nothing serves Unknown; the general-text anchor answers.
        assert_eq!(registry.model_for_task(TaskCategory::Unknown).id, "general");
    }

    #[test]
    fn fallbacks_exclude_primary_and_filter_vision() {
        let registry = test_registry();

        let text_fallbacks = registry.fallback_models("general", false, 3);
        let ids: Vec<&str> = text_fallbacks.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["fast", "reasoner"]);
        assert!(text_fallbacks.iter().all(|m| !m.supports_vision));

        let vision_fallbacks = registry.fallback_models("looker", true, 3);
        let ids: Vec<&str> = vision_fallbacks.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["looker-backup"]);
        assert!(vision_fallbacks.iter().all(|m| m.supports_vision));
    }

    #[test]
    fn fallbacks_respect_cap() {
        let registry = test_registry();
        let fallbacks = registry.fallback_models("fast", false, 1);
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].id, "general");
    }

    #[test]
    fn fallbacks_never_repeat_primary() {
        let registry = test_registry();
        for primary in ["fast", "general", "reasoner", "looker"] {
            for vision in [false, true] {
                let chain = registry.fallback_models(primary, vision, 10);
                assert!(chain.iter().all(|m| m.id != primary));
            }
        }
    }

    #[test]
    fn from_config_uses_default_catalogue() {
        let config = PrismConfig::default();
        let registry = ModelRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.get("claude-sonnet-4-20250514").is_some());
    }
}
