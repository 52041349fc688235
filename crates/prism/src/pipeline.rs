// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-request pipeline: complexity classification, then either the
//! sandboxed agent path or task classification plus fallback-chain routing,
//! with the chosen backend's event feed normalized into one chunk sequence.
//!
//! Every failure the caller can see arrives as a single terminal `Error`
//! chunk at the end of the stream; `handle` itself never fails.

use std::sync::Arc;

use futures::stream;
use prism_config::PrismConfig;
use prism_core::traits::{Backend, DecisionClient, EventSource};
use prism_core::types::{ChatRequest, ModelSpec, ResponseEvent};
use prism_core::PrismError;
use prism_router::{
    ComplexityClassifier, ModelRegistry, RouterMetrics, RoutingEngine, TaskClassifier,
};
use prism_stream::{Normalizer, ResponseStream};
use tracing::{error, info};

/// Wires the classifiers, registry, engine, and normalizer into one
/// request-serving component. Constructed once at startup; cheap to share.
pub struct Pipeline {
    complexity: ComplexityClassifier,
    tasks: TaskClassifier,
    engine: RoutingEngine,
    agent_backend: Arc<dyn Backend>,
    agent_profile: ModelSpec,
    normalizer: Normalizer,
    metrics: Arc<RouterMetrics>,
}

impl Pipeline {
    /// Build a pipeline from loaded configuration and the two backend kinds:
    /// `model_backend` serves direct calls for the routing engine,
    /// `agent_backend` runs the sandboxed agent.
    pub fn new(
        config: &PrismConfig,
        decisions: Arc<dyn DecisionClient>,
        model_backend: Arc<dyn Backend>,
        agent_backend: Arc<dyn Backend>,
    ) -> Result<Self, PrismError> {
        let registry = Arc::new(ModelRegistry::from_config(config)?);
        let metrics = Arc::new(RouterMetrics::new());

        Ok(Self {
            complexity: ComplexityClassifier::new(
                decisions.clone(),
                config.classifier.clone(),
            ),
            tasks: TaskClassifier::new(decisions, config.classifier.clone()),
            engine: RoutingEngine::new(
                registry,
                model_backend,
                config.routing.clone(),
                metrics.clone(),
            ),
            agent_backend,
            agent_profile: config.agent.profile(),
            normalizer: Normalizer::new(config.stream.idle_grace()),
            metrics,
        })
    }

    /// Process-wide routing counters.
    pub fn metrics(&self) -> Arc<RouterMetrics> {
        self.metrics.clone()
    }

    /// Serve one request.
    ///
    /// The returned stream yields chunks in order and terminates with
    /// exactly one `Done` or `Error`. Dropping it tears down whatever is
    /// in flight upstream.
    pub async fn handle(&self, request: ChatRequest) -> ResponseStream {
        let request_id = uuid::Uuid::new_v4().to_string();

        let analysis = self.complexity.classify(&request).await;
        info!(
            request_id = %request_id,
            needs_agent = analysis.needs_agent,
            reason = %analysis.reason,
            images = analysis.image_count,
            preview = %analysis.text_preview,
            "complexity classified"
        );

        let source = if analysis.needs_agent {
            self.invoke_agent(&request).await
        } else {
            self.dispatch_model(&request_id, &request).await
        };

        match source {
            Ok(source) => self.normalizer.normalize(source),
            Err(err) => {
                error!(request_id = %request_id, error = %err, "request failed before streaming");
                let chunk = ResponseEvent::Error {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                };
                Box::pin(stream::iter(vec![chunk]))
            }
        }
    }

    async fn invoke_agent(&self, request: &ChatRequest) -> Result<EventSource, PrismError> {
        tokio::time::timeout(
            self.agent_profile.call_timeout(),
            self.agent_backend.invoke(&self.agent_profile, request),
        )
        .await
        .unwrap_or(Err(PrismError::Timeout {
            duration: self.agent_profile.call_timeout(),
        }))
    }

    async fn dispatch_model(
        &self,
        request_id: &str,
        request: &ChatRequest,
    ) -> Result<EventSource, PrismError> {
        let classification = self.tasks.classify(request).await;
        info!(
            request_id = %request_id,
            category = %classification.category,
            confidence = classification.confidence,
            "task classified"
        );

        let (source, decision) = self.engine.dispatch(request, &classification).await?;
        info!(
            request_id = %request_id,
            model = %decision.attempts.last().map(|a| a.model_id.as_str()).unwrap_or(""),
            attempts = decision.attempts.len(),
            "model selected"
        );
        Ok(source)
    }
}
