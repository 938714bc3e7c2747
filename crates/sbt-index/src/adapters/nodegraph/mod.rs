//! Nodegraph adapter
//!
//! Concrete k-mer Bloom filter implementing the `MembershipFilter` port.
//!
//! - `Nodegraph`: prime-sized bit tables, one hash per canonical k-mer
//! - `NodegraphConfig`: validated construction parameters
//! - `hash_functions`: MurmurHash3 over canonical k-mers
//! - `parameters`: table sizing and false positive estimate

pub mod config;
pub mod hash_functions;
pub mod nodegraph;
pub mod parameters;

pub use config::{NodegraphConfig, NodegraphConfigBuilder, MAX_KSIZE, MAX_TABLES};
pub use nodegraph::{Nodegraph, NodegraphParams, MAGIC};
