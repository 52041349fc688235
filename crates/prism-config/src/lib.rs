// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Prism routing layer.
//!
//! Layered TOML loading with environment overrides, a typed config model
//! with unknown-key rejection, and collected semantic validation.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::ConfigError;
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AgentConfig, ClassifierConfig, PrismConfig, RoutingConfig, StreamConfig,
};
pub use validation::validate_config;
