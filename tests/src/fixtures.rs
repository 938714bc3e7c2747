//! Shared datasets and tree builders

use sbt_index::{Leaf, Nodegraph, NodegraphConfig, SequenceBloomTree};

/// k=5 with tables large enough that false positives never show up in
/// assertions
pub fn nodegraph_config() -> NodegraphConfig {
    NodegraphConfig::new(5, 100_000, 3).expect("Valid nodegraph config")
}

/// The five datasets of the reference scenario, as (identity, k-mers)
pub const REFERENCE_DATASETS: [(&str, [&str; 3]); 5] = [
    ("a", ["AAAAA", "AAAAT", "AAAAC"]),
    ("b", ["AAAAA", "AAAAT", "AAAAG"]),
    ("c", ["AAAAA", "AAAAT", "CAAAA"]),
    ("d", ["AAAAA", "CAAAA", "GAAAA"]),
    ("e", ["AAAAA", "AAAAT", "GAAAA"]),
];

/// Nodegraph holding every window of every sequence
pub fn nodegraph_from(config: &NodegraphConfig, sequences: &[&str]) -> Nodegraph {
    let mut graph = config.create_nodegraph().expect("Valid nodegraph params");
    for sequence in sequences {
        graph.consume_sequence(sequence.as_bytes());
    }
    graph
}

pub fn reference_leaves() -> Vec<Leaf<Nodegraph>> {
    let config = nodegraph_config();
    REFERENCE_DATASETS
        .iter()
        .map(|(identity, kmers)| Leaf::new(*identity, nodegraph_from(&config, kmers)))
        .collect()
}

pub fn reference_tree(seed: u64) -> SequenceBloomTree<Nodegraph> {
    let mut tree = SequenceBloomTree::with_seed(seed);
    for leaf in reference_leaves() {
        tree.insert(leaf).expect("Compatible leaf");
    }
    tree
}

/// Sorted identities of `leaves`
pub fn identities(leaves: &[&Leaf<Nodegraph>]) -> Vec<String> {
    let mut ids: Vec<String> = leaves.iter().map(|leaf| leaf.identity().to_string()).collect();
    ids.sort();
    ids
}

/// Log to the test writer when `RUST_LOG` is set
pub fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_some() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
