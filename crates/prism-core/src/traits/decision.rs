// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured classification call interface.
//!
//! Both classifiers consult a fast auxiliary model through this trait.
//! Implementations are expected to use a constrained (tool-call style)
//! response format so the decision arrives already structured; free-form
//! text parsing does not belong behind this boundary.

use async_trait::async_trait;

use crate::error::PrismError;
use crate::types::TaskCategory;

/// Verdict on whether a request needs sandboxed agent execution.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDecision {
    pub needs_agent: bool,
    /// The model's stated justification.
    pub reason: String,
}

/// Verdict on which model category should answer a fast-path request.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDecision {
    pub category: TaskCategory,
    /// Confidence in the categorization (0.0-1.0).
    pub confidence: f32,
}

/// Client for structured classification calls against a fast auxiliary model.
///
/// Callers impose their own deadline around these calls; implementations
/// should surface missing API keys as [`PrismError::MissingCredentials`] so
/// the conservative default can name the cause.
#[async_trait]
pub trait DecisionClient: Send + Sync + 'static {
    /// Decide whether the request requires agent/sandbox execution.
    async fn decide_agent(&self, prompt: &str) -> Result<AgentDecision, PrismError>;

    /// Decide which task category best serves the request.
    async fn decide_category(&self, prompt: &str) -> Result<CategoryDecision, PrismError>;
}
