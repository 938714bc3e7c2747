//! # Reference Query Scenario
//!
//! Five k=5 datasets sharing most of their content:
//!
//! | leaf | k-mers |
//! |------|--------|
//! | a | AAAAA AAAAT AAAAC |
//! | b | AAAAA AAAAT AAAAG |
//! | c | AAAAA AAAAT CAAAA |
//! | d | AAAAA CAAAA GAAAA |
//! | e | AAAAA AAAAT GAAAA |
//!
//! Results must not depend on the tree's shape, so every query runs
//! against trees built with several seeds.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sbt_index::{KmerSearch, Metrics, ThresholdSearch};

    use crate::fixtures::{identities, init_tracing, reference_tree};

    const SEEDS: [u64; 4] = [0, 1, 42, 1337];

    fn threshold_query(sequence: &str, threshold: f64) -> Vec<Vec<String>> {
        SEEDS
            .iter()
            .map(|&seed| {
                let tree = reference_tree(seed);
                let search = ThresholdSearch::new(sequence, threshold).unwrap();
                identities(&tree.search(&search))
            })
            .collect()
    }

    #[test]
    fn test_full_threshold_excludes_d() {
        init_tracing();
        for found in threshold_query("AAAAT", 1.0) {
            assert_eq!(found, vec!["a", "b", "c", "e"]);
        }
    }

    #[test]
    fn test_partial_threshold_returns_everything() {
        for found in threshold_query("GAAAAAT", 0.6) {
            assert_eq!(found, vec!["a", "b", "c", "d", "e"]);
        }
    }

    #[test]
    fn test_gaaaa_returns_d_and_e() {
        for found in threshold_query("GAAAA", 1.0) {
            assert_eq!(found, vec!["d", "e"]);
        }
    }

    #[test]
    fn test_absent_kmer_prunes_at_root() {
        let metrics = Arc::new(Metrics::new());
        let mut tree = reference_tree(7);
        tree.set_metrics_recorder(metrics.clone());

        assert!(tree.search(&KmerSearch::new("TTTGC")).is_empty());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.searches_performed, 1);
        assert_eq!(snapshot.nodes_visited, 1);
        assert_eq!(snapshot.nodes_pruned, 1);
    }

    #[test]
    fn test_custom_predicate_with_find() {
        let tree = reference_tree(3);
        // Accept everything, then keep leaves whose display name sorts after "b"
        let found = tree.find(|node| node.as_leaf().map_or(true, |leaf| leaf.name() > "b"));
        assert_eq!(identities(&found), vec!["c", "d", "e"]);
    }

    #[test]
    fn test_reverse_complement_query_matches() {
        // ATTTT is the reverse complement of AAAAT
        let tree = reference_tree(11);
        let search = ThresholdSearch::new("ATTTT", 1.0).unwrap();
        assert_eq!(identities(&tree.search(&search)), vec!["a", "b", "c", "e"]);
    }

    #[test]
    fn test_render_shows_every_leaf() {
        let rendered = reference_tree(5).render();
        for identity in ["a", "b", "c", "d", "e"] {
            assert!(
                rendered.contains(&format!("**Leaf:{identity} ")),
                "missing leaf {identity} in\n{rendered}"
            );
        }
    }
}
