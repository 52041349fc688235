// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Prism routing layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Task categories a model can be eligible for.
///
/// Exactly one category is produced per task classification. `Unknown` is
/// only ever an input to registry lookups (it resolves to the general-text
/// anchor); the classifiers never emit it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    SimpleText,
    GeneralText,
    MathReasoning,
    Programming,
    Creative,
    Vision,
    Unknown,
}

/// Why a response stream ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished its answer.
    Stop,
    /// Output was cut off at the token limit.
    Length,
    /// The upstream source ended without a terminal signal.
    Incomplete,
}

/// Canonical output unit delivered to the downstream sink.
///
/// `ContentDelta`/`ReasoningDelta` repeat in emission order; exactly one
/// `Done` or `Error` terminates each request's stream, always last.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseEvent {
    /// Visible answer text.
    ContentDelta { text: String },
    /// Intermediate "thinking" text, surfaced separately from content.
    ReasoningDelta { text: String },
    /// Normal termination.
    Done { finish_reason: FinishReason },
    /// Failed termination, reported once at the end of the stream.
    Error { kind: String, message: String },
}

impl ResponseEvent {
    /// Whether this chunk terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResponseEvent::Done { .. } | ResponseEvent::Error { .. })
    }
}

/// Role of a message author.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One part of a message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    /// Inline base64 image.
    Image { media_type: String, data: String },
}

/// A single message in the inbound conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

/// An inbound chat-completion request, as handed to the routing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Build a single-turn text request. Convenient for callers and tests.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![ContentPart::Text { text: text.into() }],
            }],
        }
    }

    /// All text parts across all messages, joined in order with newlines.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            for part in &message.content {
                if let ContentPart::Text { text } = part {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
            }
        }
        out
    }

    /// Number of image parts anywhere in the request.
    pub fn image_count(&self) -> u32 {
        self.messages
            .iter()
            .flat_map(|m| m.content.iter())
            .filter(|p| matches!(p, ContentPart::Image { .. }))
            .count() as u32
    }

    /// Whether the request carries any image content.
    pub fn has_images(&self) -> bool {
        self.image_count() > 0
    }
}

/// Immutable descriptor of a backend model.
///
/// Loaded once into the registry at startup; never mutated at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    /// Opaque backend identifier.
    pub id: String,

    /// Human-readable display name.
    #[serde(default)]
    pub display_name: String,

    /// Task categories this model is eligible for.
    #[serde(default = "default_task_categories")]
    pub task_categories: Vec<TaskCategory>,

    /// Selection priority; lower is preferred.
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Maximum tokens the model may generate per response.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Whether the model accepts image inputs.
    #[serde(default)]
    pub supports_vision: bool,

    /// Per-call deadline in seconds, reset for every fallback attempt.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Sampling temperature passed through to the backend.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ModelSpec {
    /// The per-call deadline as a [`Duration`].
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Whether this model can serve the given task category.
    pub fn serves(&self, category: TaskCategory) -> bool {
        self.task_categories.contains(&category)
    }
}

fn default_task_categories() -> Vec<TaskCategory> {
    vec![TaskCategory::GeneralText]
}

fn default_priority() -> u32 {
    100
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_call_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

/// Outcome of one routing attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    TransientFailure,
    Failure,
}

/// One entry in a routing decision's attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub model_id: String,
    pub outcome: AttemptOutcome,
}
