// SPDX-FileCopyrightText: 2026 Prism Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide routing counters.
//!
//! The only mutable state shared across concurrent requests. Scalar counters
//! are atomics; labeled breakdowns sit behind mutexes. Every increment is
//! also emitted through the metrics-rs facade so any installed recorder
//! (Prometheus, statsd, etc.) can collect them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use metrics::describe_counter;
use prism_core::types::TaskCategory;

/// Register all Prism metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("prism_requests_total", "Total requests routed");
    describe_counter!("prism_fallbacks_total", "Fallback-chain advancements");
    describe_counter!("prism_model_calls_total", "Successful model selections");
    describe_counter!("prism_model_errors_total", "Failed model attempts");
}

/// Atomic routing counters with in-process snapshots.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    total_requests: AtomicU64,
    fallback_count: AtomicU64,
    by_category: Mutex<HashMap<TaskCategory, u64>>,
    by_model: Mutex<HashMap<String, u64>>,
    errors: Mutex<HashMap<String, u64>>,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an inbound fast-path request against its classified category.
    pub fn record_request(&self, category: TaskCategory) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        *lock_map(&self.by_category).entry(category).or_insert(0) += 1;
        metrics::counter!("prism_requests_total", "category" => category.to_string())
            .increment(1);
    }

    /// Count one advancement past a failed candidate.
    pub fn record_fallback(&self) {
        self.fallback_count.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("prism_fallbacks_total").increment(1);
    }

    /// Count a successful selection of the given model.
    pub fn record_model_use(&self, model_id: &str) {
        *lock_map(&self.by_model)
            .entry(model_id.to_string())
            .or_insert(0) += 1;
        metrics::counter!("prism_model_calls_total", "model" => model_id.to_string())
            .increment(1);
    }

    /// Count a failed attempt against the given model.
    pub fn record_error(&self, model_id: &str) {
        *lock_map(&self.errors)
            .entry(model_id.to_string())
            .or_insert(0) += 1;
        metrics::counter!("prism_model_errors_total", "model" => model_id.to_string())
            .increment(1);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn fallback_count(&self) -> u64 {
        self.fallback_count.load(Ordering::Relaxed)
    }

    pub fn category_count(&self, category: TaskCategory) -> u64 {
        lock_map(&self.by_category).get(&category).copied().unwrap_or(0)
    }

    pub fn model_count(&self, model_id: &str) -> u64 {
        lock_map(&self.by_model).get(model_id).copied().unwrap_or(0)
    }

    pub fn error_count(&self, model_id: &str) -> u64 {
        lock_map(&self.errors).get(model_id).copied().unwrap_or(0)
    }
}

/// Lock a counter map, recovering from poisoning: a panicked incrementer
/// cannot leave a counter map in a torn state.
fn lock_map<'a, K, V>(map: &'a Mutex<HashMap<K, V>>) -> std::sync::MutexGuard<'a, HashMap<K, V>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counters_start_at_zero() {
        let m = RouterMetrics::new();
        assert_eq!(m.total_requests(), 0);
        assert_eq!(m.fallback_count(), 0);
        assert_eq!(m.category_count(TaskCategory::GeneralText), 0);
        assert_eq!(m.model_count("claude-sonnet-4-20250514"), 0);
        assert_eq!(m.error_count("claude-sonnet-4-20250514"), 0);
    }

    #[test]
    fn increments_are_observable() {
        let m = RouterMetrics::new();
        m.record_request(TaskCategory::Programming);
        m.record_request(TaskCategory::Programming);
        m.record_request(TaskCategory::Vision);
        m.record_fallback();
        m.record_model_use("m1");
        m.record_error("m1");
        m.record_error("m2");

        assert_eq!(m.total_requests(), 3);
        assert_eq!(m.fallback_count(), 1);
        assert_eq!(m.category_count(TaskCategory::Programming), 2);
        assert_eq!(m.category_count(TaskCategory::Vision), 1);
        assert_eq!(m.model_count("m1"), 1);
        assert_eq!(m.error_count("m1"), 1);
        assert_eq!(m.error_count("m2"), 1);
    }

    #[test]
    fn concurrent_increments_do_not_lose_updates() {
        let m = Arc::new(RouterMetrics::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let m = Arc::clone(&m);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_request(TaskCategory::GeneralText);
                    m.record_fallback();
                    m.record_model_use("shared");
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(m.total_requests(), 8000);
        assert_eq!(m.fallback_count(), 8000);
        assert_eq!(m.category_count(TaskCategory::GeneralText), 8000);
        assert_eq!(m.model_count("shared"), 8000);
    }
}
