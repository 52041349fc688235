// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Prism routing layer.

use thiserror::Error;

use crate::types::AttemptRecord;

/// The primary error type used across Prism boundary traits and core operations.
#[derive(Debug, Error)]
pub enum PrismError {
    /// Configuration errors (invalid TOML, missing required fields, bad catalogue entries).
    #[error("configuration error: {0}")]
    Config(String),

    /// Classification call failed at the transport or parse layer.
    ///
    /// Recovered locally by the complexity classifier (conservative default)
    /// and the task classifier (general-text default); never user-visible.
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Classification call exceeded its verification timeout.
    #[error("classifier timed out after {duration:?}")]
    ClassifierTimeout { duration: std::time::Duration },

    /// Classification call could not authenticate (no API key configured).
    #[error("missing credentials for {provider}")]
    MissingCredentials { provider: String },

    /// Upstream backend rejected the request with a rate limit (HTTP 429 equivalent).
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Upstream backend failed server-side (HTTP 5xx equivalent).
    #[error("upstream server error ({status}): {message}")]
    UpstreamServer { status: u16, message: String },

    /// Transport-level failure reaching an upstream backend (connect, reset, timeout).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single upstream event failed to parse against any known shape.
    ///
    /// Logged and skipped by the normalizer; never aborts a healthy stream.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// An operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Every candidate in the fallback chain failed.
    ///
    /// Carries the full attempt log and the last underlying error for diagnostics.
    #[error("all {} candidate backends failed: {}", .attempts.len(), .source)]
    ChainExhausted {
        attempts: Vec<AttemptRecord>,
        source: Box<PrismError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PrismError {
    /// Whether this failure should advance the fallback chain rather than
    /// abort the request. Rate limits, server errors, and transport failures
    /// (including per-call timeouts) are retryable against another candidate.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PrismError::RateLimited { .. }
                | PrismError::UpstreamServer { .. }
                | PrismError::Transport { .. }
                | PrismError::Timeout { .. }
        )
    }

    /// Short machine-readable kind tag, used for terminal error chunks.
    pub fn kind(&self) -> &'static str {
        match self {
            PrismError::Config(_) => "config",
            PrismError::Classifier { .. } => "classifier",
            PrismError::ClassifierTimeout { .. } => "classifier_timeout",
            PrismError::MissingCredentials { .. } => "missing_credentials",
            PrismError::RateLimited { .. } => "rate_limited",
            PrismError::UpstreamServer { .. } => "upstream_server",
            PrismError::Transport { .. } => "transport",
            PrismError::Protocol { .. } => "protocol",
            PrismError::Timeout { .. } => "timeout",
            PrismError::ChainExhausted { .. } => "chain_exhausted",
            PrismError::Internal(_) => "internal",
        }
    }
}
