// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prism: a routing and normalizing front for a chat-completion endpoint.
//!
//! For every inbound request the pipeline decides fast path vs agent path,
//! picks the backend model with a fallback chain on the fast path, and
//! normalizes whatever event feed the chosen backend emits into one ordered,
//! non-duplicated chunk stream.
//!
//! Transport, persistence, authentication, and sandbox provisioning live in
//! the surrounding gateway; this crate only consumes their trait boundaries.

pub mod pipeline;

pub use pipeline::Pipeline;

// Re-export the member crates' surfaces so the gateway can depend on one
// crate.
pub use prism_config::{load_config, validate_config, PrismConfig};
pub use prism_core::{
    Backend, ChatRequest, DecisionClient, FinishReason, ModelSpec, PrismError,
    ResponseEvent, TaskCategory,
};
pub use prism_router::{register_metrics, RouterMetrics};
pub use prism_stream::ResponseStream;
