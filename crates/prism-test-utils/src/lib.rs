// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Prism workspace.
//!
//! Scripted, CI-runnable mock implementations of the boundary traits: no
//! network, no external processes, deterministic outcomes.

pub mod mock_backend;
pub mod mock_decision;
pub mod sources;

pub use mock_backend::{MockBackend, ScriptedCall};
pub use mock_decision::MockDecisionClient;
pub use sources::{event_source, event_source_with_errors, silent_after};
