// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback-chain execution.
//!
//! Builds an ordered candidate chain from the registry and runs it until a
//! candidate yields an event source. Transient failures advance the chain;
//! non-transient failures advance it too (a backend-specific bug must not
//! abort the whole request) but log louder. Each candidate gets a fresh
//! deadline from its own spec.

use std::sync::Arc;

use prism_config::RoutingConfig;
use prism_core::traits::{Backend, EventSource};
use prism_core::types::{
    AttemptOutcome, AttemptRecord, ChatRequest, ModelSpec, TaskCategory,
};
use prism_core::PrismError;
use tracing::{error, info, warn};

use crate::metrics::RouterMetrics;
use crate::registry::ModelRegistry;
use crate::task::TaskClassification;

/// The plan and outcome log for one request's routing.
///
/// Attempts are appended as candidates run; the record stops changing once a
/// candidate succeeds or the chain is exhausted.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub primary: ModelSpec,
    /// Ordered candidates after the primary; vision-filtered, capped,
    /// primary excluded.
    pub fallback_chain: Vec<ModelSpec>,
    pub attempts: Vec<AttemptRecord>,
}

impl RoutingDecision {
    /// All candidate ids in attempt order.
    pub fn candidate_ids(&self) -> Vec<&str> {
        std::iter::once(self.primary.id.as_str())
            .chain(self.fallback_chain.iter().map(|m| m.id.as_str()))
            .collect()
    }
}

/// Executes routing decisions against a backend.
pub struct RoutingEngine {
    registry: Arc<ModelRegistry>,
    backend: Arc<dyn Backend>,
    config: RoutingConfig,
    metrics: Arc<RouterMetrics>,
}

impl RoutingEngine {
    pub fn new(
        registry: Arc<ModelRegistry>,
        backend: Arc<dyn Backend>,
        config: RoutingConfig,
        metrics: Arc<RouterMetrics>,
    ) -> Self {
        Self {
            registry,
            backend,
            config,
            metrics,
        }
    }

    /// Build the candidate chain for a classified request.
    ///
    /// The `force_model` pin replaces the primary only; the chain is still
    /// planned around it. Candidate ids never repeat: the registry holds
    /// unique ids and excludes the primary from fallbacks.
    pub fn plan(
        &self,
        classification: &TaskClassification,
        requires_vision: bool,
    ) -> RoutingDecision {
        let primary = self
            .config
            .force_model
            .as_deref()
            .and_then(|id| self.registry.get(id))
            .unwrap_or_else(|| self.registry.model_for_task(classification.category))
            .clone();

        let fallback_chain = self.registry.fallback_models(
            &primary.id,
            requires_vision,
            self.config.max_fallbacks,
        );

        RoutingDecision {
            primary,
            fallback_chain,
            attempts: Vec::new(),
        }
    }

    /// Run the chain until a candidate produces an event source.
    ///
    /// Returns the source together with the finalized decision record, or
    /// [`PrismError::ChainExhausted`] carrying the full attempt log.
    pub async fn dispatch(
        &self,
        request: &ChatRequest,
        classification: &TaskClassification,
    ) -> Result<(EventSource, RoutingDecision), PrismError> {
        self.metrics.record_request(classification.category);

        let requires_vision =
            request.has_images() || classification.category == TaskCategory::Vision;
        let mut decision = self.plan(classification, requires_vision);

        let candidates: Vec<ModelSpec> = std::iter::once(decision.primary.clone())
            .chain(decision.fallback_chain.iter().cloned())
            .collect();
        let total = candidates.len();
        let mut last_error: Option<PrismError> = None;

        for (index, spec) in candidates.iter().enumerate() {
            // Fresh deadline per candidate: a slow predecessor must not eat
            // into this attempt's budget.
            let attempt =
                tokio::time::timeout(spec.call_timeout(), self.backend.invoke(spec, request))
                    .await;

            let err = match attempt {
                Ok(Ok(source)) => {
                    decision.attempts.push(AttemptRecord {
                        model_id: spec.id.clone(),
                        outcome: AttemptOutcome::Success,
                    });
                    self.metrics.record_model_use(&spec.id);
                    info!(
                        model = %spec.id,
                        category = %classification.category,
                        attempt = index + 1,
                        "candidate accepted request"
                    );
                    return Ok((source, decision));
                }
                Ok(Err(err)) => err,
                Err(_) => PrismError::Timeout {
                    duration: spec.call_timeout(),
                },
            };

            let outcome = if err.is_transient() {
                warn!(model = %spec.id, error = %err, "candidate failed, advancing chain");
                AttemptOutcome::TransientFailure
            } else {
                error!(
                    model = %spec.id,
                    error = %err,
                    "candidate failed non-transiently, advancing chain anyway"
                );
                AttemptOutcome::Failure
            };
            decision.attempts.push(AttemptRecord {
                model_id: spec.id.clone(),
                outcome,
            });
            self.metrics.record_error(&spec.id);
            if index + 1 < total {
                self.metrics.record_fallback();
            }
            last_error = Some(err);
        }

        error!(
            candidates = total,
            "fallback chain exhausted without a successful candidate"
        );
        Err(PrismError::ChainExhausted {
            attempts: decision.attempts,
            source: Box::new(
                last_error.unwrap_or_else(|| PrismError::Internal("empty candidate chain".into())),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use prism_core::types::FinishReason;
    use prism_test_utils::{MockBackend, ScriptedCall};
    use serde_json::json;

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

    fn registry() -> Arc<ModelRegistry> {
        Arc::new(
            ModelRegistry::new(vec![
                spec("general", vec![TaskCategory::GeneralText], 10, false),
                spec("backup", vec![TaskCategory::GeneralText], 20, false),
                spec("looker", vec![TaskCategory::Vision], 12, true),
            ])
            .unwrap(),
        )
    }

    fn engine(backend: MockBackend) -> (RoutingEngine, Arc<RouterMetrics>) {
        let metrics = Arc::new(RouterMetrics::new());
        (
            RoutingEngine::new(
                registry(),
                Arc::new(backend),
                RoutingConfig::default(),
                metrics.clone(),
            ),
            metrics,
        )
    }

    fn general_classification() -> TaskClassification {
        TaskClassification {
            category: TaskCategory::GeneralText,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn primary_success_returns_source_and_counts() {
        let backend = MockBackend::scripted(vec![ScriptedCall::events(vec![
            json!({"content": "4"}),
            json!({"result": "4", "stop_reason": "stop"}),
        ])]);
        let (engine, metrics) = engine(backend);

        let (mut source, decision) = engine
            .dispatch(&ChatRequest::text("hello"), &general_classification())
            .await
            .unwrap();

        assert_eq!(decision.primary.id, "general");
        assert_eq!(decision.attempts.len(), 1);
        assert_eq!(decision.attempts[0].outcome, AttemptOutcome::Success);
        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.model_count("general"), 1);
        assert_eq!(metrics.fallback_count(), 0);

        let first = source.next().await.unwrap().unwrap();
        assert_eq!(first["content"], "4");
    }

    #[tokio::test]
    async fn transient_failure_advances_to_fallback() {
        let backend = MockBackend::scripted(vec![
            ScriptedCall::error(|| PrismError::UpstreamServer {
                status: 503,
                message: "overloaded".into(),
            }),
            ScriptedCall::events(vec![json!({"content": "ok"})]),
        ]);
        let (engine, metrics) = engine(backend);

        let (_, decision) = engine
            .dispatch(&ChatRequest::text("hello"), &general_classification())
            .await
            .unwrap();

        assert_eq!(decision.attempts.len(), 2);
        assert_eq!(decision.attempts[0].model_id, "general");
        assert_eq!(decision.attempts[0].outcome, AttemptOutcome::TransientFailure);
        assert_eq!(decision.attempts[1].model_id, "backup");
        assert_eq!(decision.attempts[1].outcome, AttemptOutcome::Success);
        assert_eq!(metrics.fallback_count(), 1);
        assert_eq!(metrics.error_count("general"), 1);
        assert_eq!(metrics.model_count("backup"), 1);
    }

    #[tokio::test]
    async fn non_transient_failure_still_advances() {
        let backend = MockBackend::scripted(vec![
            ScriptedCall::error(|| PrismError::Internal("malformed request".into())),
            ScriptedCall::events(vec![json!({"content": "ok"})]),
        ]);
        let (engine, _metrics) = engine(backend);

        let (_, decision) = engine
            .dispatch(&ChatRequest::text("hello"), &general_classification())
            .await
            .unwrap();

        assert_eq!(decision.attempts[0].outcome, AttemptOutcome::Failure);
        assert_eq!(decision.attempts[1].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn exhausted_chain_reports_attempt_log() {
        let backend = MockBackend::scripted(vec![
            ScriptedCall::error(|| PrismError::RateLimited { message: "429".into() }),
            ScriptedCall::error(|| PrismError::UpstreamServer {
                status: 500,
                message: "boom".into(),
            }),
        ]);
        let (engine, metrics) = engine(backend);

        let err = engine
            .dispatch(&ChatRequest::text("hello"), &general_classification())
            .await
            .err()
            .unwrap();

        match err {
            PrismError::ChainExhausted { attempts, source } => {
                assert_eq!(attempts.len(), 2);
                assert!(attempts
                    .iter()
                    .all(|a| a.outcome == AttemptOutcome::TransientFailure));
                assert!(matches!(*source, PrismError::UpstreamServer { status: 500, .. }));
            }
            other => panic!("expected ChainExhausted, got {other:?}"),
        }
        // general -> backup is one advancement; exhaustion after the last
        // candidate is not another.
        assert_eq!(metrics.fallback_count(), 1);
        assert_eq!(metrics.error_count("general"), 1);
        assert_eq!(metrics.error_count("backup"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_candidate_times_out_with_fresh_budget_for_fallback() {
        let backend = MockBackend::scripted(vec![
            ScriptedCall::hanging(),
            ScriptedCall::events(vec![json!({"content": "ok"})]),
        ]);
        let (engine, _metrics) = engine(backend);

        let (_, decision) = engine
            .dispatch(&ChatRequest::text("hello"), &general_classification())
            .await
            .unwrap();

        assert_eq!(decision.attempts[0].outcome, AttemptOutcome::TransientFailure);
        assert_eq!(decision.attempts[1].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn vision_chain_is_vision_isolated() {
        let backend = MockBackend::scripted(vec![ScriptedCall::events(vec![
            json!({"content": "a cat"}),
        ])]);
        let (engine, _metrics) = engine(backend);

        let classification = TaskClassification {
            category: TaskCategory::Vision,
            confidence: 1.0,
        };
        let decision = engine.plan(&classification, true);
        assert!(decision.primary.supports_vision);
        assert!(decision.fallback_chain.iter().all(|m| m.supports_vision));

        let text_decision = engine.plan(&general_classification(), false);
        assert!(!text_decision.primary.supports_vision);
        assert!(text_decision.fallback_chain.iter().all(|m| !m.supports_vision));
    }

    #[tokio::test]
    async fn candidate_ids_never_repeat() {
        let backend = MockBackend::scripted(vec![]);
        let (engine, _metrics) = engine(backend);

        for category in [
            TaskCategory::SimpleText,
            TaskCategory::GeneralText,
            TaskCategory::Programming,
            TaskCategory::Vision,
        ] {
            let classification = TaskClassification { category, confidence: 1.0 };
            let decision =
                engine.plan(&classification, category == TaskCategory::Vision);
            let ids = decision.candidate_ids();
            let mut unique = ids.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(ids.len(), unique.len(), "duplicate candidate for {category}");
        }
    }

    #[tokio::test]
    async fn force_model_pins_primary_but_keeps_chain() {
        let backend = MockBackend::scripted(vec![]);
        let metrics = Arc::new(RouterMetrics::new());
        let full_registry = Arc::new(
            ModelRegistry::new(vec![
                spec("general", vec![TaskCategory::GeneralText], 10, false),
                spec("backup", vec![TaskCategory::GeneralText], 20, false),
                spec("coder", vec![TaskCategory::Programming], 15, false),
            ])
            .unwrap(),
        );
        let engine = RoutingEngine::new(
            full_registry,
            Arc::new(backend),
            RoutingConfig {
                max_fallbacks: 3,
                force_model: Some("coder".into()),
            },
            metrics,
        );

        let decision = engine.plan(&general_classification(), false);
        assert_eq!(decision.primary.id, "coder");
        assert!(decision.fallback_chain.iter().all(|m| m.id != "coder"));
        assert_eq!(decision.fallback_chain.len(), 2);
    }

    #[tokio::test]
    async fn sources_pass_through_untouched() {
        // Terminal parsing belongs to the normalizer; the engine must hand
        // the raw feed through as-is.
        let backend = MockBackend::scripted(vec![ScriptedCall::events(vec![
            json!({"result": "done", "stop_reason": FinishReason::Stop.to_string()}),
        ])]);
        let (engine, _metrics) = engine(backend);
        let (mut source, _) = engine
            .dispatch(&ChatRequest::text("hello"), &general_classification())
            .await
            .unwrap();
        let event = source.next().await.unwrap().unwrap();
        assert_eq!(event["stop_reason"], "stop");
        assert_eq!(event["result"], "done");
    }
}
