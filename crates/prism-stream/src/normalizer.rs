// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request stream normalization.
//!
//! Converts whatever event feed the selected backend produced into one
//! ordered chunk sequence: deltas in emission order, then exactly one
//! terminal chunk. A fresh normalizer is created per request and discarded
//! with it; nothing here is shared across requests.
//!
//! Pull-based: one upstream event is consumed per downstream poll (plus
//! skipped noise), so the upstream response is never buffered ahead of the
//! consumer.

use std::pin::Pin;
use std::time::{Duration, Instant};

use futures::stream::{self, Stream, StreamExt};
use prism_core::traits::EventSource;
use prism_core::types::{FinishReason, ResponseEvent};
use prism_core::PrismError;
use tracing::{debug, error, warn};

use crate::event::{interpret, map_stop_reason, UpstreamSignal};

/// Ordered canonical chunk sequence for one request.
pub type ResponseStream = Pin<Box<dyn Stream<Item = ResponseEvent> + Send>>;

/// Normalization lifecycle for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, nothing parsed yet.
    Started,
    /// At least one upstream event parsed.
    Streaming,
    /// Terminal signal seen or synthesized. Final.
    Completed,
    /// Unrecoverable upstream failure. Final.
    Failed,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::Started => write!(f, "started"),
            Lifecycle::Streaming => write!(f, "streaming"),
            Lifecycle::Completed => write!(f, "completed"),
            Lifecycle::Failed => write!(f, "failed"),
        }
    }
}

/// Builds per-request normalization streams.
#[derive(Debug, Clone)]
pub struct Normalizer {
    idle_grace: Duration,
}

impl Normalizer {
    /// `idle_grace` bounds how long a silent upstream can stall the caller
    /// before a degraded terminal chunk is synthesized.
    pub fn new(idle_grace: Duration) -> Self {
        Self { idle_grace }
    }

    /// Normalize one upstream feed into the canonical chunk sequence.
    ///
    /// The returned stream yields deltas in upstream order and always ends
    /// with exactly one `Done` or `Error`. Not restartable; the source is
    /// consumed.
    pub fn normalize(&self, source: EventSource) -> ResponseStream {
        let state = NormalizerState {
            source,
            lifecycle: Lifecycle::Started,
            emitted_content: false,
            pending: None,
            started_at: Instant::now(),
            idle_grace: self.idle_grace,
        };
        Box::pin(stream::unfold(state, |mut state| async move {
            state.next_chunk().await.map(|chunk| (chunk, state))
        }))
    }
}

/// Mutable per-request state, owned by exactly one normalization stream.
struct NormalizerState {
    source: EventSource,
    lifecycle: Lifecycle,
    /// Dedup flag: set once visible content has streamed, so a terminal
    /// result payload is never re-emitted as a delta.
    emitted_content: bool,
    /// Terminal chunk queued behind a flushed result text -- the one-event
    /// lookahead this design needs.
    pending: Option<ResponseEvent>,
    started_at: Instant,
    idle_grace: Duration,
}

impl NormalizerState {
    /// Produce the next downstream chunk, or `None` once terminated.
    async fn next_chunk(&mut self) -> Option<ResponseEvent> {
        if let Some(chunk) = self.pending.take() {
            return Some(chunk);
        }
        if matches!(self.lifecycle, Lifecycle::Completed | Lifecycle::Failed) {
            // Terminal states are final: trailing upstream events are not
            // consumed, and no further chunk is ever produced.
            return None;
        }

        loop {
            let pulled = tokio::time::timeout(self.idle_grace, self.source.next()).await;
            match pulled {
                Err(_) => {
                    warn!(
                        elapsed = ?self.started_at.elapsed(),
                        grace = ?self.idle_grace,
                        "upstream silent past grace period, synthesizing terminal chunk"
                    );
                    self.lifecycle = Lifecycle::Completed;
                    return Some(ResponseEvent::Done {
                        finish_reason: FinishReason::Incomplete,
                    });
                }
                Ok(None) => {
                    debug!("upstream closed without terminal signal");
                    self.lifecycle = Lifecycle::Completed;
                    return Some(ResponseEvent::Done {
                        finish_reason: FinishReason::Incomplete,
                    });
                }
                Ok(Some(Err(err))) => {
                    if matches!(err, PrismError::Protocol { .. }) {
                        warn!(error = %err, "malformed upstream event skipped");
                        continue;
                    }
                    error!(error = %err, "upstream transport failure, terminating stream");
                    self.lifecycle = Lifecycle::Failed;
                    return Some(ResponseEvent::Error {
                        kind: err.kind().to_string(),
                        message: err.to_string(),
                    });
                }
                Ok(Some(Ok(event))) => {
                    if let Some(chunk) = self.translate(&event) {
                        return Some(chunk);
                    }
                }
            }
        }
    }

    /// Translate one parsed upstream event; `None` means it produced no
    /// downstream chunk (noise, unknown, empty delta).
    fn translate(&mut self, event: &serde_json::Value) -> Option<ResponseEvent> {
        match interpret(event) {
            UpstreamSignal::Content(text) => {
                if text.is_empty() {
                    return None;
                }
                self.lifecycle = Lifecycle::Streaming;
                self.emitted_content = true;
                Some(ResponseEvent::ContentDelta { text })
            }
            UpstreamSignal::Reasoning(text) => {
                if text.is_empty() {
                    return None;
                }
                self.lifecycle = Lifecycle::Streaming;
                Some(ResponseEvent::ReasoningDelta { text })
            }
            UpstreamSignal::Result { text, stop_reason } => {
                let done = ResponseEvent::Done {
                    finish_reason: map_stop_reason(stop_reason.as_deref()),
                };
                self.lifecycle = Lifecycle::Completed;
                if !self.emitted_content && !text.is_empty() {
                    // Nothing streamed yet: the result text is the only
                    // visible content. Flush it, then terminate.
                    self.emitted_content = true;
                    self.pending = Some(done);
                    return Some(ResponseEvent::ContentDelta { text });
                }
                // Already streamed: the client has this text from deltas.
                // The payload only decides the finish reason.
                Some(done)
            }
            UpstreamSignal::Noise => {
                debug!("noise line dropped");
                None
            }
            UpstreamSignal::Unknown => {
                warn!(event = %event, "unrecognized upstream event skipped");
                None
            }
        }
    }
}
