//! Metrics hooks for tree operations
//!
//! Counts insertions, filter unions and the work done by searches, so
//! pruning effectiveness can be observed from outside the tree.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use sbt_index::{Metrics, Nodegraph, SequenceBloomTree};
//!
//! let metrics = Arc::new(Metrics::new());
//! let mut tree: SequenceBloomTree<Nodegraph> = SequenceBloomTree::with_seed(7);
//! tree.set_metrics_recorder(metrics.clone());
//!
//! let _ = tree.find(|_| true);
//! assert_eq!(metrics.snapshot().searches_performed, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for tree operations
///
/// Atomic counters, so read-only searches can record through `&self`.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Leaves inserted
    pub leaves_inserted: AtomicU64,
    /// Filter unions performed by insertions
    pub filter_unions: AtomicU64,
    /// Searches performed
    pub searches_performed: AtomicU64,
    /// Nodes on which a search predicate was evaluated
    pub nodes_visited: AtomicU64,
    /// Nodes whose predicate rejected them (subtree skipped)
    pub nodes_pruned: AtomicU64,
    /// Leaves returned by searches
    pub leaves_matched: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
    /// Cumulative search time in nanoseconds
    pub search_time_ns: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one leaf insertion
    ///
    /// # Arguments
    /// * `duration` - Time taken for the insertion
    /// * `unions` - Filter unions it performed
    pub fn record_insert(&self, duration: Duration, unions: u64) {
        self.leaves_inserted.fetch_add(1, Ordering::Relaxed);
        self.filter_unions.fetch_add(unions, Ordering::Relaxed);
        self.insert_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record one search
    ///
    /// # Arguments
    /// * `duration` - Time taken for the search
    /// * `visited` - Nodes the predicate was evaluated on
    /// * `pruned` - Nodes the predicate rejected
    /// * `matched` - Leaves returned
    pub fn record_search(&self, duration: Duration, visited: u64, pruned: u64, matched: u64) {
        self.searches_performed.fetch_add(1, Ordering::Relaxed);
        self.nodes_visited.fetch_add(visited, Ordering::Relaxed);
        self.nodes_pruned.fetch_add(pruned, Ordering::Relaxed);
        self.leaves_matched.fetch_add(matched, Ordering::Relaxed);
        self.search_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            leaves_inserted: self.leaves_inserted.load(Ordering::Relaxed),
            filter_unions: self.filter_unions.load(Ordering::Relaxed),
            searches_performed: self.searches_performed.load(Ordering::Relaxed),
            nodes_visited: self.nodes_visited.load(Ordering::Relaxed),
            nodes_pruned: self.nodes_pruned.load(Ordering::Relaxed),
            leaves_matched: self.leaves_matched.load(Ordering::Relaxed),
            avg_insert_ns: average(&self.insert_time_ns, &self.leaves_inserted),
            avg_search_ns: average(&self.search_time_ns, &self.searches_performed),
        }
    }

    /// Fraction of visited nodes that were pruned
    pub fn pruning_rate(&self) -> f64 {
        let visited = self.nodes_visited.load(Ordering::Relaxed);
        let pruned = self.nodes_pruned.load(Ordering::Relaxed);
        if visited > 0 {
            pruned as f64 / visited as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.leaves_inserted.store(0, Ordering::Relaxed);
        self.filter_unions.store(0, Ordering::Relaxed);
        self.searches_performed.store(0, Ordering::Relaxed);
        self.nodes_visited.store(0, Ordering::Relaxed);
        self.nodes_pruned.store(0, Ordering::Relaxed);
        self.leaves_matched.store(0, Ordering::Relaxed);
        self.insert_time_ns.store(0, Ordering::Relaxed);
        self.search_time_ns.store(0, Ordering::Relaxed);
    }
}

fn average(total: &AtomicU64, count: &AtomicU64) -> u64 {
    let count = count.load(Ordering::Relaxed);
    if count > 0 {
        total.load(Ordering::Relaxed) / count
    } else {
        0
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub leaves_inserted: u64,
    pub filter_unions: u64,
    pub searches_performed: u64,
    pub nodes_visited: u64,
    pub nodes_pruned: u64,
    pub leaves_matched: u64,
    pub avg_insert_ns: u64,
    pub avg_search_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to forward tree activity to an external metrics
/// system.
pub trait MetricsRecorder: Send + Sync {
    /// Record one leaf insertion
    fn record_insert(&self, duration: Duration, unions: u64);

    /// Record one search
    fn record_search(&self, duration: Duration, visited: u64, pruned: u64, matched: u64);
}

/// No-op metrics recorder, the tree default
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_insert(&self, _: Duration, _: u64) {}
    fn record_search(&self, _: Duration, _: u64, _: u64, _: u64) {}
}

impl MetricsRecorder for Metrics {
    fn record_insert(&self, duration: Duration, unions: u64) {
        Metrics::record_insert(self, duration, unions);
    }

    fn record_search(&self, duration: Duration, visited: u64, pruned: u64, matched: u64) {
        Metrics::record_search(self, duration, visited, pruned, matched);
    }
}
