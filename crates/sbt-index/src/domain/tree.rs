//! Sequence Bloom Tree: builder and query engine
//!
//! Leaves are inserted one at a time. Each insertion walks down from the
//! root towards the lighter subtree, unioning the new leaf's filter into
//! every internal node it passes, and finally splits the leaf it reaches
//! into an internal node holding both leaves.
//!
//! INVARIANTS:
//! - Union monotonicity holds after every insertion, not just at save time
//! - Every internal node has exactly two children
//! - An empty tree has no root; a one-leaf tree has that leaf as its root
//! - Sibling subtrees differ by at most one leaf (lighter-subtree descent)

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, trace, warn};

use super::config::TreeConfig;
use super::node::{Internal, Leaf, Node, NodeSummary};
use super::search::NodePredicate;
use crate::error::{SbtError, SbtResult};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::MembershipFilter;

/// Label of the `index`-th internal node in pre-order
pub fn internal_name(index: usize) -> String {
    format!("internal.{index}")
}

/// Hierarchical index over per-dataset membership filters
pub struct SequenceBloomTree<F: MembershipFilter> {
    root: Option<Node<F>>,
    /// Shared by every filter in the tree, fixed by the first insertion
    params: Option<F::Params>,
    /// Tie-breaker between equally heavy subtrees
    rng: StdRng,
    metrics: Arc<dyn MetricsRecorder>,
}

#[derive(Default)]
struct SearchStats {
    visited: u64,
    pruned: u64,
}

impl<F: MembershipFilter> SequenceBloomTree<F> {
    /// Create an empty tree with an entropy-seeded tie-breaker
    pub fn new() -> Self {
        Self::with_config(&TreeConfig::default())
    }

    /// Create an empty tree whose shape is reproducible for a given
    /// insertion order
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(&TreeConfig::seeded(seed))
    }

    pub fn with_config(config: &TreeConfig) -> Self {
        Self {
            root: None,
            params: None,
            rng: config.rng(),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Wrap an already assembled root (used when reloading)
    pub(crate) fn from_root(root: Node<F>, params: F::Params, config: &TreeConfig) -> Self {
        Self {
            root: Some(root),
            params: Some(params),
            rng: config.rng(),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Route insert/search counters to `recorder`
    pub fn set_metrics_recorder(&mut self, recorder: Arc<dyn MetricsRecorder>) {
        self.metrics = recorder;
    }

    pub fn root(&self) -> Option<&Node<F>> {
        self.root.as_ref()
    }

    /// Filter parameters shared by every node, `None` while empty
    pub fn params(&self) -> Option<&F::Params> {
        self.params.as_ref()
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, Node::leaf_count)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Nodes on the longest root-to-leaf path (0 when empty)
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    /// All leaves in pre-order, left before right
    pub fn leaves(&self) -> Vec<&Leaf<F>> {
        let mut leaves = Vec::with_capacity(self.len());
        let mut stack: Vec<&Node<F>> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(leaf) => leaves.push(leaf),
                Node::Internal(internal) => {
                    stack.push(&internal.right);
                    stack.push(&internal.left);
                }
            }
        }
        leaves
    }

    /// Add a leaf whose filter is already populated
    ///
    /// The first leaf fixes the tree's filter parameters. A leaf whose filter
    /// was built with different parameters is rejected with
    /// `IncompatibleFilter` and the tree is left untouched; any compatible
    /// leaf is always accepted.
    pub fn insert(&mut self, leaf: Leaf<F>) -> SbtResult<()> {
        let start = Instant::now();

        let params = match &self.params {
            Some(params) if params != leaf.filter().params() => {
                warn!(
                    identity = %leaf.identity(),
                    "rejecting leaf built with incompatible filter parameters"
                );
                return Err(SbtError::incompatible(params, leaf.filter().params()));
            }
            Some(params) => params.clone(),
            None => {
                let params = leaf.filter().params().clone();
                self.params = Some(params.clone());
                params
            }
        };

        debug!(identity = %leaf.identity(), leaves = self.len() + 1, "inserting leaf");

        let mut unions = 0;
        let root = match self.root.take() {
            None => Node::Leaf(leaf),
            Some(root) => self.insert_at(root, leaf, &params, &mut unions),
        };
        self.root = Some(root);

        self.metrics.record_insert(start.elapsed(), unions);
        Ok(())
    }

    fn insert_at(&mut self, cur: Node<F>, leaf: Leaf<F>, params: &F::Params, unions: &mut u64) -> Node<F> {
        match cur {
            Node::Leaf(existing) => {
                trace!(
                    existing = %existing.identity(),
                    added = %leaf.identity(),
                    "splitting leaf into internal node"
                );
                let mut filter = F::create(params);
                filter.union(existing.filter());
                filter.union(leaf.filter());
                *unions += 2;
                Node::Internal(Internal::join(filter, Node::Leaf(existing), Node::Leaf(leaf)))
            }
            Node::Internal(Internal {
                mut filter,
                left,
                right,
                leaf_count,
            }) => {
                filter.union(leaf.filter());
                *unions += 1;

                let (left, right) = if self.descend_left(left.leaf_count(), right.leaf_count()) {
                    (self.insert_at(*left, leaf, params, unions), *right)
                } else {
                    (*left, self.insert_at(*right, leaf, params, unions))
                };

                Node::Internal(Internal {
                    filter,
                    left: Box::new(left),
                    right: Box::new(right),
                    leaf_count: leaf_count + 1,
                })
            }
        }
    }

    /// Lighter subtree wins; equal weights are a coin flip
    fn descend_left(&mut self, left_leaves: usize, right_leaves: usize) -> bool {
        let left = match left_leaves.cmp(&right_leaves) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.rng.gen_bool(0.5),
        };
        trace!(left_leaves, right_leaves, left, "choosing subtree");
        left
    }

    /// Leaves accepted by `predicate`, pruning every subtree whose root it
    /// rejects
    ///
    /// Nodes are visited in pre-order, left before right, so the result
    /// order is deterministic for a given tree. The predicate is evaluated
    /// on internal nodes too, against their aggregate filter; it must accept
    /// an internal node whenever it would accept one of its leaves, or
    /// matching leaves below a rejected node are missed.
    pub fn find<P>(&self, mut predicate: P) -> Vec<&Leaf<F>>
    where
        P: FnMut(&Node<F>) -> bool,
    {
        let start = Instant::now();
        let mut matches = Vec::new();
        let mut stats = SearchStats::default();

        if let Some(root) = &self.root {
            Self::collect(root, &mut predicate, &mut matches, &mut stats);
        }

        debug!(
            visited = stats.visited,
            pruned = stats.pruned,
            matches = matches.len(),
            "search finished"
        );
        self.metrics.record_search(
            start.elapsed(),
            stats.visited,
            stats.pruned,
            matches.len() as u64,
        );
        matches
    }

    /// [`SequenceBloomTree::find`] with a reusable predicate
    pub fn search<P: NodePredicate<F>>(&self, predicate: &P) -> Vec<&Leaf<F>> {
        self.find(|node| predicate.accepts(node))
    }

    fn collect<'a, P>(
        node: &'a Node<F>,
        predicate: &mut P,
        matches: &mut Vec<&'a Leaf<F>>,
        stats: &mut SearchStats,
    ) where
        P: FnMut(&Node<F>) -> bool,
    {
        stats.visited += 1;
        if !predicate(node) {
            stats.pruned += 1;
            return;
        }

        match node {
            Node::Leaf(leaf) => matches.push(leaf),
            Node::Internal(internal) => {
                Self::collect(&internal.left, predicate, matches, stats);
                Self::collect(&internal.right, predicate, matches, stats);
            }
        }
    }

    /// Indented pre-order listing, one node per line, four spaces per level
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut next_internal = 0;
        if let Some(root) = &self.root {
            Self::render_node(root, 0, &mut next_internal, &mut out);
        }
        out
    }

    fn render_node(node: &Node<F>, depth: usize, next_internal: &mut usize, out: &mut String) {
        let name = match node {
            Node::Leaf(leaf) => leaf.name().to_string(),
            Node::Internal(_) => {
                *next_internal += 1;
                internal_name(*next_internal - 1)
            }
        };
        let _ = writeln!(
            out,
            "{}{}",
            " ".repeat(4 * depth),
            NodeSummary::new(node, &name)
        );
        if let Some((left, right)) = node.children() {
            Self::render_node(left, depth + 1, next_internal, out);
            Self::render_node(right, depth + 1, next_internal, out);
        }
    }

    /// Graphviz description of the tree shape
    ///
    /// Vertices are identified by pre-order position (`n0`, `n1`, ...) and
    /// carry the node name as `label`, so equal display names stay distinct.
    pub fn to_dot(&self) -> String {
        let mut out = String::from(
            "digraph G {\nnodesep=0.3;\nranksep=0.2;\nmargin=0.1;\nnode [shape=circle];\nedge [arrowsize=0.8];\n",
        );
        let mut next_vertex = 0;
        let mut next_internal = 0;
        if let Some(root) = &self.root {
            Self::dot_node(root, &mut next_vertex, &mut next_internal, &mut out);
        }
        out.push_str("}\n");
        out
    }

    /// Emit the vertex for `node` and everything below it; returns its id
    fn dot_node(node: &Node<F>, next_vertex: &mut usize, next_internal: &mut usize, out: &mut String) -> String {
        let id = format!("n{next_vertex}");
        *next_vertex += 1;
        match node {
            Node::Leaf(leaf) => {
                let _ = writeln!(out, "\"{id}\" [label=\"{}\"];", dot_escape(leaf.name()));
            }
            Node::Internal(internal) => {
                let label = internal_name(*next_internal);
                *next_internal += 1;
                let _ = writeln!(out, "\"{id}\" [label=\"{label}\", shape=box];");
                for child in [&*internal.left, &*internal.right] {
                    let child_id = Self::dot_node(child, next_vertex, next_internal, out);
                    let _ = writeln!(out, "\"{id}\" -> \"{child_id}\";");
                }
            }
        }
        id
    }
}

fn dot_escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<F: MembershipFilter> Default for SequenceBloomTree<F> {
    fn default() -> Self {
        Self::new()
    }
}
