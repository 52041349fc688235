// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Prism routing layer.
//!
//! This crate provides the foundational trait definitions, error type, and
//! common types used throughout the Prism workspace: the request/response
//! data model, the backend invocation boundary, and the structured
//! classification call boundary.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PrismError;
pub use types::{
    AttemptOutcome, AttemptRecord, ChatMessage, ChatRequest, ContentPart, FinishReason,
    ModelSpec, ResponseEvent, Role, TaskCategory,
};

pub use traits::{AgentDecision, Backend, CategoryDecision, DecisionClient, EventSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = PrismError::Config("bad".into());
        let _classifier = PrismError::Classifier { message: "parse".into(), source: None };
        let _timeout = PrismError::ClassifierTimeout {
            duration: std::time::Duration::from_secs(3),
        };
        let _creds = PrismError::MissingCredentials { provider: "verifier".into() };
        let _rate = PrismError::RateLimited { message: "429".into() };
        let _server = PrismError::UpstreamServer { status: 503, message: "down".into() };
        let _transport = PrismError::Transport { message: "reset".into(), source: None };
        let _protocol = PrismError::Protocol { message: "garbage".into() };
        let _deadline = PrismError::Timeout { duration: std::time::Duration::from_secs(60) };
        let _exhausted = PrismError::ChainExhausted {
            attempts: vec![],
            source: Box::new(PrismError::Internal("last".into())),
        };
        let _internal = PrismError::Internal("oops".into());
    }

    #[test]
    fn trait_objects_are_constructible() {
        fn _assert_backend<T: Backend>() {}
        fn _assert_decision_client<T: DecisionClient>() {}
    }
}
