// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upstream event interpretation.
//!
//! Backends emit opaque JSON records in bespoke shapes: direct token deltas,
//! nested agent-stream envelopes, terminal result payloads, and assorted
//! diagnostic noise. [`interpret`] is a pure function mapping one record to
//! one signal, so the hard state (dedup flag, lifecycle) stays in the
//! normalizer where it is testable.

use prism_core::types::FinishReason;
use serde_json::Value;

/// How deep to search an envelope for a `delta.text` payload. Agent streams
/// wrap deltas in at most a couple of envelope layers; anything deeper is
/// not a delta.
const NESTED_SEARCH_DEPTH: usize = 8;

/// Diagnostic line prefixes dropped without surfacing as content.
const NOISE_PREFIXES: &[&str] = &[
    "[sandbox]",
    "[startup]",
    "preflight:",
    "warning:",
    "booting",
    "container image",
    "pulling layer",
];

/// Record `type` tags that are keep-alive or startup chatter.
const NOISE_TYPES: &[&str] = &["ping", "system", "banner", "preflight"];

/// The interpreted meaning of one upstream record.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamSignal {
    /// Visible answer text from a token or agent delta.
    Content(String),
    /// Intermediate reasoning text.
    Reasoning(String),
    /// Terminal payload carrying the full accumulated text.
    Result {
        text: String,
        stop_reason: Option<String>,
    },
    /// Known non-content chatter; dropped silently.
    Noise,
    /// No known shape matched; logged and skipped by the caller.
    Unknown,
}

/// Interpret one upstream record against the known shapes, in priority
/// order: direct delta fields, nested `delta.text`, terminal result, noise.
pub fn interpret(event: &Value) -> UpstreamSignal {
    match event {
        Value::Object(obj) => {
            // Direct token delta: no envelope, text sits in a top-level field.
            if let Some(text) = obj.get("content").and_then(Value::as_str) {
                return UpstreamSignal::Content(text.to_string());
            }
            if let Some(text) = obj.get("reasoning_content").and_then(Value::as_str) {
                return UpstreamSignal::Reasoning(text.to_string());
            }

            // Agent-stream delta: `delta.text`, however deeply enveloped.
            if let Some(text) = find_delta_text(event, NESTED_SEARCH_DEPTH) {
                return UpstreamSignal::Content(text.to_string());
            }

            // Terminal result payload.
            if let Some(text) = obj.get("result").and_then(Value::as_str) {
                let stop_reason = obj
                    .get("stop_reason")
                    .or_else(|| obj.get("finish_reason"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                return UpstreamSignal::Result {
                    text: text.to_string(),
                    stop_reason,
                };
            }

            if let Some(tag) = obj.get("type").and_then(Value::as_str)
                && NOISE_TYPES.contains(&tag)
            {
                return UpstreamSignal::Noise;
            }

            UpstreamSignal::Unknown
        }
        Value::String(line) => {
            let lower = line.trim_start().to_lowercase();
            if NOISE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
                UpstreamSignal::Noise
            } else {
                UpstreamSignal::Unknown
            }
        }
        _ => UpstreamSignal::Unknown,
    }
}

/// Map an upstream stop reason string onto a finish reason. Unknown reasons
/// read as a normal stop; `None` does too.
pub fn map_stop_reason(stop_reason: Option<&str>) -> FinishReason {
    match stop_reason {
        Some("max_tokens") | Some("length") => FinishReason::Length,
        _ => FinishReason::Stop,
    }
}

/// Depth-bounded search for a `delta` object carrying a string `text`.
fn find_delta_text(value: &Value, depth: usize) -> Option<&str> {
    if depth == 0 {
        return None;
    }
    let obj = value.as_object()?;
    if let Some(delta) = obj.get("delta")
        && let Some(text) = delta.get("text").and_then(Value::as_str)
    {
        return Some(text);
    }
    obj.values()
        .find_map(|child| find_delta_text(child, depth - 1))
}
