// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics.
//!
//! Miette-renderable errors for the load and validation phases, so startup
//! failures print actionable messages instead of raw serde traces.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A semantic validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(prism::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Loading or deserialization failed.
    #[error("configuration load error: {message}")]
    #[diagnostic(
        code(prism::config::load),
        help("check prism.toml against the documented keys; unknown keys are rejected")
    )]
    Load {
        /// The underlying loader message.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(prism::config::other))]
    Other(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load {
            message: err.to_string(),
        }
    }
}
