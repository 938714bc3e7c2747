//! Nodegraph configuration and validation
//!
//! # Example
//!
//! ```
//! use sbt_index::NodegraphConfigBuilder;
//!
//! let config = NodegraphConfigBuilder::new()
//!     .ksize(21)
//!     .starting_size(100_000)
//!     .n_tables(4)
//!     .build()
//!     .expect("Valid config");
//! let graph = config.create_nodegraph().expect("Valid params");
//! assert_eq!(graph.table_sizes().len(), 4);
//! ```

use serde::{Deserialize, Serialize};

use super::nodegraph::{Nodegraph, NodegraphParams};
use super::parameters::primes_at_or_below;
use crate::error::{SbtError, SbtResult};

/// Longest supported k-mer
pub const MAX_KSIZE: usize = 32;

/// Upper bound on the number of tables per nodegraph
pub const MAX_TABLES: usize = 16;

/// Nodegraph configuration
///
/// Every filter of a tree must be created from the same configuration;
/// filters built from different configurations cannot be unioned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodegraphConfig {
    /// k-mer length
    pub ksize: usize,
    /// Upper bound for the table sizes (tables use the primes below it)
    pub starting_size: u64,
    /// Number of tables
    pub n_tables: usize,
}

impl Default for NodegraphConfig {
    fn default() -> Self {
        Self {
            ksize: 31,
            starting_size: 1_000_000, // ~122 KB per table
            n_tables: 4,
        }
    }
}

impl NodegraphConfig {
    /// Create a new configuration with validation
    pub fn new(ksize: usize, starting_size: u64, n_tables: usize) -> SbtResult<Self> {
        let config = Self {
            ksize,
            starting_size,
            n_tables,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> SbtResult<()> {
        if self.ksize == 0 || self.ksize > MAX_KSIZE {
            return Err(SbtError::InvalidParameters(format!(
                "ksize must be between 1 and {}, got {}",
                MAX_KSIZE, self.ksize
            )));
        }

        if self.n_tables == 0 || self.n_tables > MAX_TABLES {
            return Err(SbtError::InvalidParameters(format!(
                "n_tables must be between 1 and {}, got {}",
                MAX_TABLES, self.n_tables
            )));
        }

        let available = primes_at_or_below(self.starting_size, self.n_tables).len();
        if available < self.n_tables {
            return Err(SbtError::InvalidParameters(format!(
                "starting_size {} leaves only {} prime table sizes, {} needed",
                self.starting_size, available, self.n_tables
            )));
        }

        Ok(())
    }

    /// Resolve the concrete table layout
    pub fn params(&self) -> SbtResult<NodegraphParams> {
        self.validate()?;
        Ok(NodegraphParams {
            ksize: self.ksize,
            table_sizes: primes_at_or_below(self.starting_size, self.n_tables),
        })
    }

    /// Create an empty nodegraph with this configuration
    pub fn create_nodegraph(&self) -> SbtResult<Nodegraph> {
        Nodegraph::new(self.params()?)
    }

    /// Builder-style method to set the k-mer length
    pub fn with_ksize(mut self, ksize: usize) -> Self {
        self.ksize = ksize;
        self
    }

    /// Builder-style method to set the table size bound
    pub fn with_starting_size(mut self, starting_size: u64) -> Self {
        self.starting_size = starting_size;
        self
    }

    /// Builder-style method to set the number of tables
    pub fn with_n_tables(mut self, n_tables: usize) -> Self {
        self.n_tables = n_tables;
        self
    }
}

/// Builder for NodegraphConfig with validation
#[derive(Default)]
pub struct NodegraphConfigBuilder {
    ksize: Option<usize>,
    starting_size: Option<u64>,
    n_tables: Option<usize>,
}

impl NodegraphConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the k-mer length (1 to 32)
    pub fn ksize(mut self, ksize: usize) -> Self {
        self.ksize = Some(ksize);
        self
    }

    /// Set the table size bound
    pub fn starting_size(mut self, starting_size: u64) -> Self {
        self.starting_size = Some(starting_size);
        self
    }

    /// Set the number of tables (1 to 16)
    pub fn n_tables(mut self, n_tables: usize) -> Self {
        self.n_tables = Some(n_tables);
        self
    }

    /// Build the NodegraphConfig, validating all parameters
    pub fn build(self) -> SbtResult<NodegraphConfig> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> NodegraphConfig {
        let defaults = NodegraphConfig::default();

        NodegraphConfig {
            ksize: self.ksize.unwrap_or(defaults.ksize),
            starting_size: self.starting_size.unwrap_or(defaults.starting_size),
            n_tables: self.n_tables.unwrap_or(defaults.n_tables),
        }
    }
}
