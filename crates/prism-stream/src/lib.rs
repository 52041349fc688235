// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming event normalization for the Prism routing layer.
//!
//! Whatever backend served a request -- a direct model stream or a sandboxed
//! agent run -- its raw event feed goes through one [`Normalizer`] and comes
//! out as a single ordered, non-duplicated chunk sequence ending in exactly
//! one terminal chunk.

pub mod event;
pub mod normalizer;

pub use event::{interpret, map_stop_reason, UpstreamSignal};
pub use normalizer::{Lifecycle, Normalizer, ResponseStream};
