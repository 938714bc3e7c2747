//! # Persistence
//!
//! Save / load round trips through `sbt_index::save` and `sbt_index::load`,
//! plus the failure modes a damaged manifest or filter directory produces.

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::Value;

    use sbt_index::{
        load, load_with_config, save, Leaf, Nodegraph, SbtError, SbtResult, SequenceBloomTree,
        ThresholdSearch, TreeConfig,
    };

    use crate::fixtures::{identities, init_tracing, nodegraph_config, nodegraph_from, reference_tree};

    fn read_json(path: &Path) -> Value {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    fn write_json(path: &Path, value: &Value) {
        std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    }

    fn load_graph(path: &Path) -> SbtResult<SequenceBloomTree<Nodegraph>> {
        load(path)
    }

    #[test]
    fn test_round_trip_preserves_queries() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let tree = reference_tree(17);

        let manifest = save(&tree, dir.path().join("reference")).unwrap();
        let restored = load_graph(&manifest).unwrap();

        let original: Vec<&str> = tree.leaves().iter().map(|l| l.identity()).collect();
        let reloaded: Vec<&str> = restored.leaves().iter().map(|l| l.identity()).collect();
        assert_eq!(original, reloaded, "leaf order must survive");
        assert_eq!(restored.render(), tree.render());

        for (query, threshold) in [("AAAAT", 1.0), ("GAAAAAT", 0.6), ("GAAAA", 1.0)] {
            let search = ThresholdSearch::new(query, threshold).unwrap();
            assert_eq!(
                identities(&restored.search(&search)),
                identities(&tree.search(&search)),
                "query {query}"
            );
        }
    }

    #[test]
    fn test_saved_tree_is_relocatable() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("original");
        let moved = dir.path().join("moved");
        std::fs::create_dir(&original).unwrap();

        save(&reference_tree(2), original.join("ref")).unwrap();
        std::fs::rename(&original, &moved).unwrap();

        let restored = load_graph(&moved.join("ref.sbt.json")).unwrap();
        assert_eq!(restored.len(), 5);
    }

    #[test]
    fn test_manifest_paths_are_relative() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save(&reference_tree(2), dir.path().join("ref")).unwrap();

        let json = read_json(&manifest);
        let filter_file = json["root"]["filter_file"].as_str().unwrap();
        assert!(Path::new(filter_file).is_relative());
        assert!(filter_file.starts_with(".sbt.ref"));
    }

    #[test]
    fn test_reloaded_tree_keeps_growing() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save(&reference_tree(4), dir.path().join("ref")).unwrap();

        let mut restored: SequenceBloomTree<Nodegraph> =
            load_with_config(&manifest, &TreeConfig::seeded(4)).unwrap();
        let config = nodegraph_config();
        restored
            .insert(Leaf::new("f", nodegraph_from(&config, &["TTTGCA"])))
            .unwrap();

        let search = ThresholdSearch::new("TTTGCA", 1.0).unwrap();
        assert_eq!(identities(&restored.search(&search)), vec!["f"]);
        assert_eq!(restored.len(), 6);
    }

    #[test]
    fn test_missing_field_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save(&reference_tree(6), dir.path().join("ref")).unwrap();

        let mut json = read_json(&manifest);
        json["root"]["left"].as_object_mut().unwrap().remove("filter_file");
        write_json(&manifest, &json);

        assert!(matches!(load_graph(&manifest), Err(SbtError::Format(_))));
    }

    #[test]
    fn test_unary_internal_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save(&reference_tree(6), dir.path().join("ref")).unwrap();

        let mut json = read_json(&manifest);
        json["root"].as_object_mut().unwrap().remove("left");
        write_json(&manifest, &json);

        assert!(matches!(load_graph(&manifest), Err(SbtError::Format(_))));
    }

    #[test]
    fn test_missing_filter_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save(&reference_tree(6), dir.path().join("ref")).unwrap();

        std::fs::remove_file(dir.path().join(".sbt.ref/ref.leaf.e.sbt")).unwrap();

        assert!(matches!(load_graph(&manifest), Err(SbtError::Io { .. })));
    }

    #[test]
    fn test_corrupt_filter_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save(&reference_tree(6), dir.path().join("ref")).unwrap();

        std::fs::write(dir.path().join(".sbt.ref/ref.leaf.a.sbt"), b"not a nodegraph").unwrap();

        assert!(matches!(load_graph(&manifest), Err(SbtError::Format(_))));
    }

    #[test]
    fn test_mixed_parameters_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save(&reference_tree(6), dir.path().join("ref")).unwrap();

        // Swap one leaf's filter for a k=7 nodegraph
        let other = sbt_index::NodegraphConfig::new(7, 100_000, 3).unwrap();
        let foreign = nodegraph_from(&other, &["ACGTACGT"]);
        sbt_index::MembershipFilter::save(&foreign, &dir.path().join(".sbt.ref/ref.leaf.b.sbt")).unwrap();

        assert!(matches!(
            load_graph(&manifest),
            Err(SbtError::IncompatibleFilter { .. })
        ));
    }

    #[test]
    fn test_null_root_is_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("empty.sbt.json");
        std::fs::write(&manifest, r#"{"version": 1, "root": null}"#).unwrap();

        assert!(matches!(load_graph(&manifest), Err(SbtError::EmptyTree { .. })));
    }

    #[test]
    fn test_not_json_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("junk.sbt.json");
        std::fs::write(&manifest, "definitely not json").unwrap();

        assert!(matches!(load_graph(&manifest), Err(SbtError::Format(_))));
    }
}
