// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request classification and model routing for the Prism routing layer.
//!
//! This crate provides:
//! - [`ComplexityClassifier`]: agent-or-direct decision, fail-closed toward
//!   the agent path
//! - [`TaskClassifier`]: model-category decision for fast-path requests,
//!   fail-neutral toward general text
//! - [`ModelRegistry`]: immutable priority-ordered model catalogue
//! - [`RoutingEngine`]: fallback-chain execution with per-candidate deadlines
//! - [`RouterMetrics`]: process-wide routing counters
//!
//! The two classifiers are deliberately independent axes with separate,
//! partially-overlapping vocabularies; the complexity axis alone decides
//! whether sandboxed execution is needed.

pub mod complexity;
pub mod engine;
pub mod metrics;
pub mod registry;
pub mod task;

pub use complexity::{ComplexityAnalysis, ComplexityClassifier};
pub use engine::{RoutingDecision, RoutingEngine};
pub use metrics::{register_metrics, RouterMetrics};
pub use registry::ModelRegistry;
pub use task::{TaskClassification, TaskClassifier};
