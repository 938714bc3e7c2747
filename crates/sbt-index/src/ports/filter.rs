//! Membership filter port (Driven Port)
//!
//! The tree never looks inside a filter. Everything it needs from the
//! probabilistic set stored in each node goes through this trait, so any
//! filter with union semantics can back a tree.
//!
//! INVARIANTS required from implementors:
//! - No false negatives: after `insert(e)`, `contains(e)` MUST return true
//! - Union is a superset: after `a.union(&b)`, every element reported by
//!   `a` or `b` before the call is reported by `a`

use std::fmt::Debug;
use std::path::Path;

use crate::error::{SbtError, SbtResult};

/// Probabilistic set with fixed construction parameters
pub trait MembershipFilter: Sized {
    /// Construction parameters (element size, table sizing)
    ///
    /// Two filters are compatible only if their parameters compare equal.
    type Params: Clone + Debug + PartialEq;

    /// Create a fresh, empty filter
    fn create(params: &Self::Params) -> Self;

    /// Parameters this filter was created with
    fn params(&self) -> &Self::Params;

    /// Length of the elements (k-mers) this filter stores
    fn ksize(&self) -> usize;

    /// Add an element. Idempotent.
    fn insert(&mut self, element: &[u8]);

    /// Test membership. May return false positives, never false negatives.
    fn contains(&self, element: &[u8]) -> bool;

    /// Merge `other` into `self`
    ///
    /// # Panics
    /// Implementations may panic if the filters are not compatible.
    /// Use [`MembershipFilter::try_union`] when compatibility is not known.
    fn union(&mut self, other: &Self);

    /// Approximate number of distinct elements inserted
    fn occupancy(&self) -> u64;

    /// Expected false positive rate at the current occupancy
    fn expected_false_positive_rate(&self) -> f64;

    /// Raw bit storage, one byte slice per table
    fn raw_tables(&self) -> Vec<&[u8]>;

    /// Persist the filter to `path`
    fn save(&self, path: &Path) -> SbtResult<()>;

    /// Load a filter previously written by [`MembershipFilter::save`]
    fn load(path: &Path) -> SbtResult<Self>;

    /// Read the construction parameters of a persisted filter without
    /// loading its tables
    fn extract_params(path: &Path) -> SbtResult<Self::Params>;

    /// Whether `self` and `other` can be unioned or compared
    fn is_compatible(&self, other: &Self) -> bool {
        self.params() == other.params()
    }

    /// Checked union: fails with `IncompatibleFilter` instead of panicking
    fn try_union(&mut self, other: &Self) -> SbtResult<()> {
        if !self.is_compatible(other) {
            return Err(SbtError::incompatible(self.params(), other.params()));
        }
        self.union(other);
        Ok(())
    }
}
