//! Search predicates
//!
//! A predicate decides, node by node, whether a search continues below that
//! node. It is evaluated on leaves and on internal nodes alike, the latter
//! holding the union of their subtree.
//!
//! ## Point queries
//!
//! [`KmerSearch`] asks "is this k-mer present?". Because an internal
//! node's filter is a superset of its descendants', a rejection at an
//! internal node proves no leaf below can match (up to the filter's own
//! false positives), so pruning is exact.
//!
//! ## Threshold queries
//!
//! [`ThresholdSearch`] asks "are at least a fraction τ of this sequence's
//! k-mers present?". Evaluating that on a union filter is an approximation:
//! a union can test positive on a different number of windows than any
//! single descendant, so a subtree holding a true match can in principle be
//! pruned. The search trades that completeness for speed.

use super::kmer::{kmer_count, kmers};
use super::node::Node;
use crate::error::{SbtError, SbtResult};
use crate::ports::MembershipFilter;

/// Reusable node predicate for [`crate::SequenceBloomTree::search`]
pub trait NodePredicate<F> {
    /// Whether the search should accept this node (match a leaf, descend
    /// into an internal node)
    fn accepts(&self, node: &Node<F>) -> bool;
}

/// Single k-mer presence query
#[derive(Clone, Debug)]
pub struct KmerSearch {
    kmer: Vec<u8>,
}

impl KmerSearch {
    pub fn new(kmer: impl AsRef<[u8]>) -> Self {
        Self {
            kmer: kmer.as_ref().to_vec(),
        }
    }
}

impl<F: MembershipFilter> NodePredicate<F> for KmerSearch {
    fn accepts(&self, node: &Node<F>) -> bool {
        node.filter().contains(&self.kmer)
    }
}

/// Slack added before flooring `threshold * windows`
pub const THRESHOLD_EPSILON: f64 = 1e-9;

/// Windowed threshold query over a whole sequence
///
/// Accepts a node iff `present >= floor(threshold * windows)`, where
/// `windows` is the number of k-length windows of the sequence and
/// `present` how many of them the node's filter reports. A sequence shorter
/// than k has no windows and is accepted everywhere.
#[derive(Clone, Debug)]
pub struct ThresholdSearch {
    sequence: Vec<u8>,
    threshold: f64,
}

impl ThresholdSearch {
    /// Create a threshold query; `threshold` must lie in `[0, 1]`
    pub fn new(sequence: impl AsRef<[u8]>, threshold: f64) -> SbtResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SbtError::InvalidParameters(format!(
                "threshold must be between 0 and 1, got {threshold}"
            )));
        }
        Ok(Self {
            sequence: sequence.as_ref().to_vec(),
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Windows that must test positive for a filter of element size `ksize`
    ///
    /// `floor(threshold * windows)`, with the product nudged up by
    /// [`THRESHOLD_EPSILON`] first so binary rounding of the threshold
    /// (0.29 * 100 = 28.999...) cannot drop a required window.
    pub fn required_matches(&self, ksize: usize) -> usize {
        let windows = kmer_count(self.sequence.len(), ksize);
        let required = (self.threshold * windows as f64 + THRESHOLD_EPSILON).floor() as usize;
        required.min(windows)
    }

    /// Windows of the sequence that `filter` reports present
    pub fn present_kmers<F: MembershipFilter>(&self, filter: &F) -> usize {
        kmers(&self.sequence, filter.ksize())
            .filter(|kmer| filter.contains(kmer))
            .count()
    }

    /// Threshold test against a single filter
    pub fn matches<F: MembershipFilter>(&self, filter: &F) -> bool {
        let required = self.required_matches(filter.ksize());
        if required == 0 {
            return true;
        }
        // Stop as soon as the threshold is reached
        let mut present = 0;
        for kmer in kmers(&self.sequence, filter.ksize()) {
            if filter.contains(kmer) {
                present += 1;
                if present >= required {
                    return true;
                }
            }
        }
        false
    }
}

impl<F: MembershipFilter> NodePredicate<F> for ThresholdSearch {
    fn accepts(&self, node: &Node<F>) -> bool {
        self.matches(node.filter())
    }
}
