// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock decision client for deterministic classifier testing.
//!
//! Returns pre-configured verdicts, scripted failures, or hangs forever
//! (for timeout paths under paused virtual time). Counts calls per axis so
//! tests can assert the zero-call guarantees of the heuristic paths.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use prism_core::traits::{AgentDecision, CategoryDecision, DecisionClient};
use prism_core::types::TaskCategory;
use prism_core::PrismError;

type ErrorFactory = Arc<dyn Fn() -> PrismError + Send + Sync>;

enum Behavior {
    AgentVerdict { needs_agent: bool, reason: String },
    CategoryVerdict { category: TaskCategory, confidence: f32 },
    Failing(ErrorFactory),
    Hanging,
}

/// A decision client with scripted behavior and per-axis call counters.
pub struct MockDecisionClient {
    behavior: Behavior,
    agent_calls: AtomicU64,
    category_calls: AtomicU64,
}

impl MockDecisionClient {
    /// Always answer the agent axis with the given verdict. The category
    /// axis answers general-text at middling confidence.
    pub fn deciding_agent(needs_agent: bool, reason: &str) -> Self {
        Self::with_behavior(Behavior::AgentVerdict {
            needs_agent,
            reason: reason.to_string(),
        })
    }

    /// Always answer the category axis with the given verdict. The agent
    /// axis answers "no agent needed".
    pub fn deciding_category(category: TaskCategory, confidence: f32) -> Self {
        Self::with_behavior(Behavior::CategoryVerdict {
            category,
            confidence,
        })
    }

    /// Fail every call with a fresh error from the factory.
    pub fn failing(factory: impl Fn() -> PrismError + Send + Sync + 'static) -> Self {
        Self::with_behavior(Behavior::Failing(Arc::new(factory)))
    }

    /// Never resolve. Combine with paused virtual time to exercise caller
    /// timeouts instantly.
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hanging)
    }

    /// Number of agent-axis calls observed.
    pub fn agent_calls(&self) -> u64 {
        self.agent_calls.load(Ordering::Relaxed)
    }

    /// Number of category-axis calls observed.
    pub fn category_calls(&self) -> u64 {
        self.category_calls.load(Ordering::Relaxed)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            agent_calls: AtomicU64::new(0),
            category_calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl DecisionClient for MockDecisionClient {
    async fn decide_agent(&self, _prompt: &str) -> Result<AgentDecision, PrismError> {
        self.agent_calls.fetch_add(1, Ordering::Relaxed);
        match &self.behavior {
            Behavior::AgentVerdict { needs_agent, reason } => Ok(AgentDecision {
                needs_agent: *needs_agent,
                reason: reason.clone(),
            }),
            Behavior::CategoryVerdict { .. } => Ok(AgentDecision {
                needs_agent: false,
                reason: "direct".to_string(),
            }),
            Behavior::Failing(factory) => Err(factory()),
            Behavior::Hanging => std::future::pending().await,
        }
    }

    async fn decide_category(&self, _prompt: &str) -> Result<CategoryDecision, PrismError> {
        self.category_calls.fetch_add(1, Ordering::Relaxed);
        match &self.behavior {
            Behavior::CategoryVerdict { category, confidence } => Ok(CategoryDecision {
                category: *category,
                confidence: *confidence,
            }),
            Behavior::AgentVerdict { .. } => Ok(CategoryDecision {
                category: TaskCategory::GeneralText,
                confidence: 0.5,
            }),
            Behavior::Failing(factory) => Err(factory()),
            Behavior::Hanging => std::future::pending().await,
        }
    }
}
