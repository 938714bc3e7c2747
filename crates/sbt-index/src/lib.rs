//! # SBT Index
//!
//! Sequence Bloom Tree: a binary tree of membership filters for finding
//! which of many sequence datasets contain a query.
//!
//! Every leaf holds one dataset's filter; every internal node holds the
//! union of its two children. A search evaluates its predicate top-down and
//! skips any subtree whose root rejects it, so most of the tree is never
//! touched when few datasets match.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Tree logic, generic over the filter
//!   - `SequenceBloomTree`: insertion, search, rendering
//!   - `Node` / `Leaf` / `Internal`: tree nodes
//!   - `KmerSearch` / `ThresholdSearch`: ready-made search predicates
//!   - `estimate_distance`: sampled bit distance between filters
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `MembershipFilter`: the filter stored in each node
//!
//! - **Adapters Layer** (`adapters/`): Concrete implementations
//!   - `Nodegraph`: k-mer Bloom filter with prime-sized tables
//!   - `manifest`: tree save/load
//!
//! ## Invariants
//!
//! - **Union monotonicity**: an element any leaf reports is reported by
//!   every ancestor of that leaf
//! - **Shape**: internal nodes have exactly two children; a one-leaf tree
//!   is that leaf
//! - **Compatibility**: every filter in a tree shares one parameter set
//!
//! ## Threshold searches
//!
//! `ThresholdSearch` applies its threshold to internal nodes' union
//! filters as well as to leaves. That is an approximation: a subtree can be
//! pruned even though one of its leaves would have passed. Point searches
//! (`KmerSearch`) prune exactly.
//!
//! ## Usage Example
//!
//! ```
//! use sbt_index::{Leaf, NodegraphConfigBuilder, SequenceBloomTree, ThresholdSearch};
//!
//! let config = NodegraphConfigBuilder::new()
//!     .ksize(5)
//!     .starting_size(10_000)
//!     .n_tables(3)
//!     .build()
//!     .unwrap();
//!
//! let mut tree = SequenceBloomTree::with_seed(42);
//! for (name, seq) in [("a", "AAAAAT"), ("b", "CCCCCG")] {
//!     let mut graph = config.create_nodegraph().unwrap();
//!     graph.consume_sequence(seq.as_bytes());
//!     tree.insert(Leaf::new(name, graph)).unwrap();
//! }
//!
//! let query = ThresholdSearch::new("AAAAAT", 1.0).unwrap();
//! let hits: Vec<&str> = tree.search(&query).iter().map(|leaf| leaf.identity()).collect();
//! assert_eq!(hits, vec!["a"]);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;


// Re-exports for convenience
pub use adapters::manifest::{load, load_with_config, save};
pub use adapters::nodegraph::{Nodegraph, NodegraphConfig, NodegraphConfigBuilder, NodegraphParams};
pub use domain::{
    estimate_distance, exact_distance, kmers, Internal, KmerSearch, Leaf, Node, NodePredicate,
    NodeSummary, SequenceBloomTree, ThresholdSearch, TreeConfig,
};
pub use error::{SbtError, SbtResult};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::MembershipFilter;
