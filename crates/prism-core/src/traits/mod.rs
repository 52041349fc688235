// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary traits for the Prism routing layer.

pub mod backend;
pub mod decision;

pub use backend::{Backend, EventSource};
pub use decision::{AgentDecision, CategoryDecision, DecisionClient};
