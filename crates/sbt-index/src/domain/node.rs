//! Tree nodes
//!
//! A node is either a `Leaf` (one dataset's filter) or an `Internal` node
//! whose filter is the union of everything below it.
//!
//! INVARIANTS:
//! - Union monotonicity: an element reported by any leaf below an internal
//!   node is reported by that node's filter
//! - Shape: an internal node always has exactly two children

use std::fmt;

use crate::ports::MembershipFilter;

/// One dataset: a populated filter plus the caller's identity for it
#[derive(Clone, Debug)]
pub struct Leaf<F> {
    /// Stable join key back to the original dataset
    identity: String,
    /// Human-readable label
    display_name: String,
    filter: F,
}

impl<F> Leaf<F> {
    /// Create a leaf whose display name equals its identity
    pub fn new(identity: impl Into<String>, filter: F) -> Self {
        let identity = identity.into();
        Self {
            display_name: identity.clone(),
            identity,
            filter,
        }
    }

    /// Create a leaf with a separate display name
    pub fn with_name(identity: impl Into<String>, display_name: impl Into<String>, filter: F) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            filter,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.display_name
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Give up the leaf, returning its filter
    pub fn into_filter(self) -> F {
        self.filter
    }
}

/// Aggregate node: the union of exactly two subtrees
#[derive(Clone, Debug)]
pub struct Internal<F> {
    pub(crate) filter: F,
    pub(crate) left: Box<Node<F>>,
    pub(crate) right: Box<Node<F>>,
    /// Leaves below this node, used by the balance heuristic
    pub(crate) leaf_count: usize,
}

impl<F> Internal<F> {
    /// Join two subtrees under `filter`, which must already cover both
    pub(crate) fn join(filter: F, left: Node<F>, right: Node<F>) -> Self {
        let leaf_count = left.leaf_count() + right.leaf_count();
        Self {
            filter,
            left: Box::new(left),
            right: Box::new(right),
            leaf_count,
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn left(&self) -> &Node<F> {
        &self.left
    }

    pub fn right(&self) -> &Node<F> {
        &self.right
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }
}

/// A position in the tree
#[derive(Clone, Debug)]
pub enum Node<F> {
    Leaf(Leaf<F>),
    Internal(Internal<F>),
}

impl<F> Node<F> {
    /// Filter stored at this node (aggregate for internal nodes)
    pub fn filter(&self) -> &F {
        match self {
            Node::Leaf(leaf) => leaf.filter(),
            Node::Internal(internal) => internal.filter(),
        }
    }

    /// Number of leaves in this subtree
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Internal(internal) => internal.leaf_count,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf<F>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }

    /// Left and right child, `None` for leaves
    pub fn children(&self) -> Option<(&Node<F>, &Node<F>)> {
        match self {
            Node::Leaf(_) => None,
            Node::Internal(internal) => Some((&*internal.left, &*internal.right)),
        }
    }

    /// Number of nodes on the longest path from here down to a leaf
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Internal(internal) => 1 + internal.left.depth().max(internal.right.depth()),
        }
    }
}

/// One-line summary of a node, labelled with `name`
///
/// Internal nodes have no stored name; callers label them by position.
pub struct NodeSummary<'a, F> {
    node: &'a Node<F>,
    name: &'a str,
}

impl<'a, F> NodeSummary<'a, F> {
    pub fn new(node: &'a Node<F>, name: &'a str) -> Self {
        Self { node, name }
    }
}

impl<F: MembershipFilter> fmt::Display for NodeSummary<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Node::Leaf(leaf) => write!(f, "{leaf}"),
            Node::Internal(internal) => write!(
                f,
                "*Node:{} [occupied: {}, fpr: {:.2}]",
                self.name,
                internal.filter.occupancy(),
                internal.filter.expected_false_positive_rate()
            ),
        }
    }
}

impl<F: MembershipFilter> fmt::Display for Leaf<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**Leaf:{} [occupied: {}, fpr: {:.2}] -> {}",
            self.display_name,
            self.filter.occupancy(),
            self.filter.expected_false_positive_rate(),
            self.identity
        )
    }
}
