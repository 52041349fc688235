// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for building upstream event sources in tests.

use futures::stream;
use futures::StreamExt;
use prism_core::traits::EventSource;
use prism_core::PrismError;

/// An event source replaying the given events, then closing.
pub fn event_source(events: Vec<serde_json::Value>) -> EventSource {
    Box::pin(stream::iter(events.into_iter().map(Ok)))
}

/// An event source replaying mixed ok/error items, then closing.
pub fn event_source_with_errors(
    items: Vec<Result<serde_json::Value, PrismError>>,
) -> EventSource {
    Box::pin(stream::iter(items))
}

/// An event source replaying the given events, then going silent forever
/// instead of closing. For idle-grace tests under paused time.
pub fn silent_after(events: Vec<serde_json::Value>) -> EventSource {
    Box::pin(stream::iter(events.into_iter().map(Ok)).chain(stream::pending()))
}
