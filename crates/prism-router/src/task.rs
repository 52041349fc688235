// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fast-path task categorization.
//!
//! Chooses which model family should answer a request that already cleared
//! the complexity axis. Unlike that axis, failure here is benign: anything
//! that goes wrong resolves to the general-text category, not an error and
//! not a costlier path.

use std::sync::Arc;

use prism_config::ClassifierConfig;
use prism_core::types::{ChatRequest, TaskCategory};
use prism_core::DecisionClient;
use tracing::{debug, warn};

/// Vocabulary that disqualifies the simple-text shortcut. Overlaps the
/// complexity axis tables on purpose; the two axes evolve independently.
const COMPLEX_VOCAB: &[&str] = &[
    "write", "implement", "prove", "solve", "story", "analyze", "code",
    "function", "poem", "essay", "derive", "optimize", "debug", "algorithm",
    "equation", "integral", "theorem",
];

/// Confidence attached to the simple-text heuristic.
const SIMPLE_CONFIDENCE: f32 = 0.8;

/// Confidence attached to the general-text failure default.
const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Result of task categorization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskClassification {
    pub category: TaskCategory,
    /// Confidence in the categorization (0.0-1.0).
    pub confidence: f32,
}

/// Picks the model category for fast-path requests.
pub struct TaskClassifier {
    client: Arc<dyn DecisionClient>,
    config: ClassifierConfig,
}

impl TaskClassifier {
    pub fn new(client: Arc<dyn DecisionClient>, config: ClassifierConfig) -> Self {
        Self { client, config }
    }

    /// Categorize a request. Never fails; the fallback is `general_text`.
    pub async fn classify(&self, request: &ChatRequest) -> TaskClassification {
        // Images anywhere decide the category outright.
        if request.has_images() {
            return TaskClassification {
                category: TaskCategory::Vision,
                confidence: 1.0,
            };
        }

        let text = request.full_text();
        let lower = text.to_lowercase();
        let word_count = lower.split_whitespace().count();
        if word_count <= self.config.simple_max_words
            && !COMPLEX_VOCAB
                .iter()
                .any(|v| lower.split(|c: char| !c.is_alphanumeric()).any(|w| &w == v))
        {
            return TaskClassification {
                category: TaskCategory::SimpleText,
                confidence: SIMPLE_CONFIDENCE,
            };
        }

        let verdict = tokio::time::timeout(
            self.config.verification_timeout(),
            self.client.decide_category(&text),
        )
        .await;

        match verdict {
            Ok(Ok(decision)) => {
                // The auxiliary model never gets to pick Unknown.
                let category = if decision.category == TaskCategory::Unknown {
                    TaskCategory::GeneralText
                } else {
                    decision.category
                };
                debug!(%category, confidence = decision.confidence, "task categorized");
                TaskClassification {
                    category,
                    confidence: decision.confidence.clamp(0.0, 1.0),
                }
            }
            Ok(Err(err)) => {
                warn!(error = %err, "task categorization failed, defaulting to general_text");
                TaskClassification {
                    category: TaskCategory::GeneralText,
                    confidence: DEFAULT_CONFIDENCE,
                }
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.verification_timeout_secs,
                    "task categorization timed out, defaulting to general_text"
                );
                TaskClassification {
                    category: TaskCategory::GeneralText,
                    confidence: DEFAULT_CONFIDENCE,
                }
            }
        }
    }
}
