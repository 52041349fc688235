// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent-or-direct complexity classification.
//!
//! Decides whether a request can be answered by a direct model call or needs
//! a tool-using agent in a sandbox. The decision is fail-closed: any
//! ambiguity or verification failure resolves toward the agent path, never
//! the cheaper direct path.

use std::sync::Arc;

use prism_config::ClassifierConfig;
use prism_core::types::ChatRequest;
use prism_core::{DecisionClient, PrismError};
use tracing::{debug, warn};

/// Phrases that authoritatively indicate agent/sandbox work: tool and code
/// execution, media generation, web/browser/API interaction, file
/// operations. A match short-circuits classification with no outbound call.
const AGENT_KEYWORDS: &[&str] = &[
    // tool / code execution
    "run code", "execute code", "run this code", "run a script", "run the script",
    "execute this", "run the command", "run a command", "in a sandbox",
    // media generation
    "generate an image", "generate a video", "create an image", "create a video",
    "make an image", "draw a picture", "render a chart", "generate audio",
    // web / browser / API interaction
    "search the web", "browse the web", "look it up online", "open the browser",
    "use the browser", "call the api", "make an api call", "http request",
    "scrape", "crawl", "download", "upload",
    // file operations
    "create a file", "write a file", "write to a file", "read the file",
    "save to disk", "edit the file", "delete the file", "list the files",
    "take a screenshot",
];

/// Interaction verbs that, combined with a URL, force the agent path even
/// when the request reads as conversational.
const INTERACTION_VERBS: &[&str] = &[
    "visit", "open", "test", "click", "submit", "fetch", "screenshot",
    "navigate", "browse", "check", "load", "fill", "log",
];

/// Verbs that block the trivial short-circuit: short messages carrying one
/// of these still go through verification.
const COMPLEXITY_VERBS: &[&str] = &[
    "write", "implement", "prove", "solve", "analyze", "debug", "build",
    "create", "design", "explain", "generate", "calculate", "translate",
    "summarize", "refactor", "optimize",
];

/// Result of classifying a request's complexity. Created once per request;
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityAnalysis {
    /// Whether the request needs agent/sandbox execution.
    pub needs_agent: bool,
    /// Why: `keyword_match`, `url_interaction`, `trivial`, the verifier's
    /// stated reason, or `conservative_default: <cause>`.
    pub reason: String,
    /// Agent keywords found in the text, in table order.
    pub matched_keywords: Vec<String>,
    /// Whether the request carries image content.
    pub has_images: bool,
    /// Number of image parts in the request.
    pub image_count: u32,
    /// Truncated text, for logging only. Never used for routing decisions.
    pub text_preview: String,
}

/// Fail-closed complexity classifier.
///
/// Heuristic passes run synchronously with no I/O; only the residue goes to
/// a bounded structured verification call.
pub struct ComplexityClassifier {
    client: Arc<dyn DecisionClient>,
    config: ClassifierConfig,
}

impl ComplexityClassifier {
    pub fn new(client: Arc<dyn DecisionClient>, config: ClassifierConfig) -> Self {
        Self { client, config }
    }

    /// Classify a request.
    ///
    /// Never blocks longer than the configured verification timeout, and
    /// never fails: verification errors resolve to `needs_agent = true`.
    pub async fn classify(&self, request: &ChatRequest) -> ComplexityAnalysis {
        let text = request.full_text();
        let lower = text.to_lowercase();
        let preview = truncate_chars(&text, self.config.preview_chars);
        let has_images = request.has_images();
        let image_count = request.image_count();

        // 1. Keyword pass: deterministic and authoritative.
        let matched = scan_keywords(&lower);
        if !matched.is_empty() {
            debug!(keywords = ?matched, "agent keyword match");
            return ComplexityAnalysis {
                needs_agent: true,
                reason: "keyword_match".to_string(),
                matched_keywords: matched,
                has_images,
                image_count,
                text_preview: preview,
            };
        }

        // 2. URL + interaction verb: overrides any verification verdict, so
        // it runs before the call and saves it.
        if contains_url(&lower) && INTERACTION_VERBS.iter().any(|v| contains_word(&lower, v)) {
            debug!("url interaction heuristic");
            return ComplexityAnalysis {
                needs_agent: true,
                reason: "url_interaction".to_string(),
                matched_keywords: Vec::new(),
                has_images,
                image_count,
                text_preview: preview,
            };
        }

        // 3. Trivial short-circuit: latency optimization only.
        let word_count = lower.split_whitespace().count();
        if word_count <= self.config.trivial_max_words
            && !COMPLEXITY_VERBS.iter().any(|v| contains_word(&lower, v))
        {
            return ComplexityAnalysis {
                needs_agent: false,
                reason: "trivial".to_string(),
                matched_keywords: Vec::new(),
                has_images,
                image_count,
                text_preview: preview,
            };
        }

        // 4. Mandatory verification, bounded and fail-closed.
        let verdict = tokio::time::timeout(
            self.config.verification_timeout(),
            self.client.decide_agent(&text),
        )
        .await;

        let (needs_agent, reason) = match verdict {
            Ok(Ok(decision)) => (decision.needs_agent, decision.reason),
            Ok(Err(err)) => {
                warn!(error = %err, "verification call failed, defaulting to agent path");
                (true, format!("conservative_default: {}", conservative_cause(&err)))
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.verification_timeout_secs,
                    "verification call timed out, defaulting to agent path"
                );
                (true, "conservative_default: timeout".to_string())
            }
        };

        ComplexityAnalysis {
            needs_agent,
            reason,
            matched_keywords: Vec::new(),
            has_images,
            image_count,
            text_preview: preview,
        }
    }
}

/// Map a verification failure onto its conservative-default cause tag.
fn conservative_cause(err: &PrismError) -> &'static str {
    match err {
        PrismError::MissingCredentials { .. } => "missing_credentials",
        PrismError::ClassifierTimeout { .. } | PrismError::Timeout { .. } => "timeout",
        _ => "classifier_error",
    }
}

/// Collect agent keywords present in the lowercased text, in table order.
fn scan_keywords(lower: &str) -> Vec<String> {
    AGENT_KEYWORDS
        .iter()
        .filter(|k| lower.contains(**k))
        .map(|k| k.to_string())
        .collect()
}

/// Whether the text contains something URL-shaped.
fn contains_url(lower: &str) -> bool {
    lower.contains("http://") || lower.contains("https://") || lower.contains("www.")
}

/// Word-boundary match, so `test` does not fire inside `latest`.
fn contains_word(lower: &str, word: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}

/// Truncate to a character budget without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
