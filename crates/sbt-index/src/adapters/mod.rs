//! Adapters Layer (Driven Adapters)
//!
//! Concrete implementations behind the ports, plus persistence.
//!
//! ## Adapters
//!
//! - `nodegraph` - k-mer Bloom filter implementing `MembershipFilter`
//! - `manifest` - saves and reloads a whole tree (JSON manifest + filter files)

pub mod manifest;
pub mod nodegraph;

pub use manifest::{load, load_with_config, save, Manifest, NodeRecord};
pub use nodegraph::{Nodegraph, NodegraphConfig, NodegraphConfigBuilder, NodegraphParams};
