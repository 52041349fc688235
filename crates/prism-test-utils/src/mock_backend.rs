// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend with a scripted per-invocation outcome queue.
//!
//! Each `invoke` pops the next [`ScriptedCall`]: a canned event feed, a
//! constructed error, or a hang (for deadline tests under paused time).
//! Invoked model ids are recorded for assertions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use prism_core::traits::{Backend, EventSource};
use prism_core::types::{ChatRequest, ModelSpec};
use prism_core::PrismError;
use tokio::sync::Mutex;

type ErrorFactory = Box<dyn Fn() -> PrismError + Send + Sync>;

enum CallKind {
    Events(Vec<serde_json::Value>),
    Error(ErrorFactory),
    Hanging,
}

/// One scripted invocation outcome.
pub struct ScriptedCall(CallKind);

impl ScriptedCall {
    /// Succeed with the given upstream event feed.
    pub fn events(events: Vec<serde_json::Value>) -> Self {
        Self(CallKind::Events(events))
    }

    /// Fail immediately with a fresh error from the factory.
    pub fn error(factory: impl Fn() -> PrismError + Send + Sync + 'static) -> Self {
        Self(CallKind::Error(Box::new(factory)))
    }

    /// Never resolve; the caller's deadline decides the outcome.
    pub fn hanging() -> Self {
        Self(CallKind::Hanging)
    }
}

/// A backend that replays a scripted outcome queue.
pub struct MockBackend {
    script: Mutex<VecDeque<ScriptedCall>>,
    invocations: Arc<Mutex<Vec<String>>>,
    vision: bool,
    reasoning: bool,
}

impl MockBackend {
    /// Build a backend replaying the given outcomes in order. An exhausted
    /// script fails invocations so over-calling surfaces as a test failure.
    pub fn scripted(calls: Vec<ScriptedCall>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(calls)),
            invocations: Arc::new(Mutex::new(Vec::new())),
            vision: true,
            reasoning: false,
        }
    }

    pub fn with_vision(mut self, vision: bool) -> Self {
        self.vision = vision;
        self
    }

    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    /// Model ids passed to `invoke`, in call order.
    pub async fn invoked_models(&self) -> Vec<String> {
        self.invocations.lock().await.clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn supports_vision(&self) -> bool {
        self.vision
    }

    fn emits_reasoning(&self) -> bool {
        self.reasoning
    }

    async fn invoke(
        &self,
        spec: &ModelSpec,
        _request: &ChatRequest,
    ) -> Result<EventSource, PrismError> {
        self.invocations.lock().await.push(spec.id.clone());

        let next = self.script.lock().await.pop_front();
        match next {
            Some(ScriptedCall(CallKind::Events(events))) => {
                Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
            }
            Some(ScriptedCall(CallKind::Error(factory))) => Err(factory()),
            Some(ScriptedCall(CallKind::Hanging)) => std::future::pending().await,
            None => Err(PrismError::Internal("mock backend script exhausted".into())),
        }
    }
}
