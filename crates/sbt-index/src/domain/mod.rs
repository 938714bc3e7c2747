//! Domain Layer - Tree logic
//!
//! This layer contains:
//! - Tree nodes and the balanced insertion algorithm
//! - Pruned search and the point / threshold predicates
//! - Sampled filter distance
//! - Tree configuration
//!
//! RULES:
//! - Generic over `MembershipFilter`, never tied to one filter type
//! - No I/O operations (persistence lives in `adapters::manifest`)

pub mod config;
pub mod distance;
pub mod kmer;
pub mod node;
pub mod search;
pub mod tree;

pub use config::TreeConfig;
pub use distance::{estimate_distance, exact_distance};
pub use kmer::{kmer_count, kmers};
pub use node::{Internal, Leaf, Node, NodeSummary};
pub use search::{KmerSearch, NodePredicate, ThresholdSearch};
pub use tree::SequenceBloomTree;
