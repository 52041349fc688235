// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend invocation trait for direct-model and sandboxed-agent backends.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::PrismError;
use crate::types::{ChatRequest, ModelSpec};

/// Raw event feed produced by a backend invocation.
///
/// Events are opaque JSON records; each backend kind emits its own shapes
/// (token deltas, nested agent envelopes, terminal result payloads). The
/// stream normalizer is the only consumer that interprets them. `Err` items
/// are transport-level failures; a graceful close is the end of the stream.
pub type EventSource =
    Pin<Box<dyn Stream<Item = Result<serde_json::Value, PrismError>> + Send>>;

/// A backend capable of serving a request: a direct model API, a sandboxed
/// tool-using agent, or anything else that yields an event feed.
///
/// One implementation per backend kind. Callers route on capabilities, never
/// on backend identity.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Human-readable name of this backend kind.
    fn name(&self) -> &str;

    /// Whether invocations may carry image content.
    fn supports_vision(&self) -> bool {
        false
    }

    /// Whether the event feed may include separate reasoning text.
    fn emits_reasoning(&self) -> bool {
        false
    }

    /// Start serving a request against the given model profile.
    ///
    /// Returns the raw event feed, or an immediate error classifiable via
    /// [`PrismError::is_transient`] for fallback decisions.
    async fn invoke(
        &self,
        spec: &ModelSpec,
        request: &ChatRequest,
    ) -> Result<EventSource, PrismError>;
}
