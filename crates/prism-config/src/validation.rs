// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: catalogue integrity, timeout bounds, and cross-field
//! consistency. Collects all errors instead of failing fast.

use std::collections::HashSet;

use prism_core::types::TaskCategory;

use crate::diagnostic::ConfigError;
use crate::model::PrismConfig;

/// Upper bound on `routing.max_fallbacks`; chains longer than this only add
/// latency after the outcome is already decided.
const MAX_FALLBACK_CAP: usize = 10;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors.
pub fn validate_config(config: &PrismConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.models.is_empty() {
        errors.push(ConfigError::Validation {
            message: "[[models]] catalogue must not be empty".to_string(),
        });
    }

    // Unique model ids: the fallback chain invariant depends on this.
    let mut seen_ids = HashSet::new();
    for model in &config.models {
        if !seen_ids.insert(&model.id) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate model id `{}` in [[models]] array", model.id),
            });
        }
    }

    for (i, model) in config.models.iter().enumerate() {
        if model.id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("models[{i}].id must not be empty"),
            });
        }
        if model.task_categories.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("models[{i}].task_categories must not be empty"),
            });
        }
        if model.serves(TaskCategory::Vision) && !model.supports_vision {
            errors.push(ConfigError::Validation {
                message: format!(
                    "models[{i}] (`{}`) serves `vision` but has supports_vision = false",
                    model.id
                ),
            });
        }
        if model.call_timeout_secs == 0 {
            errors.push(ConfigError::Validation {
                message: format!("models[{i}].call_timeout_secs must be positive"),
            });
        }
        if !(0.0..=2.0).contains(&model.temperature) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "models[{i}].temperature must be within 0.0..=2.0, got {}",
                    model.temperature
                ),
            });
        }
    }

    // The registry anchors category misses on a general-text model.
    if !config.models.is_empty()
        && !config
            .models
            .iter()
            .any(|m| m.serves(TaskCategory::GeneralText))
    {
        errors.push(ConfigError::Validation {
            message: "[[models]] must include at least one `general_text`-capable model"
                .to_string(),
        });
    }

    if config.routing.max_fallbacks > MAX_FALLBACK_CAP {
        errors.push(ConfigError::Validation {
            message: format!(
                "routing.max_fallbacks must be at most {MAX_FALLBACK_CAP}, got {}",
                config.routing.max_fallbacks
            ),
        });
    }

    if let Some(ref forced) = config.routing.force_model
        && !config.models.iter().any(|m| &m.id == forced)
    {
        errors.push(ConfigError::Validation {
            message: format!("routing.force_model `{forced}` is not in the [[models]] catalogue"),
        });
    }

    if config.classifier.verification_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "classifier.verification_timeout_secs must be positive".to_string(),
        });
    }

    if config.stream.idle_grace_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "stream.idle_grace_secs must be positive".to_string(),
        });
    }

    if config.agent.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.timeout_secs must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
