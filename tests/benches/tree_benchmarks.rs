//! # SBT Benchmarks
//!
//! | Operation | Expectation |
//! |-----------|-------------|
//! | Insert | O(depth) unions per leaf |
//! | Point search | Prunes whole subtrees for absent k-mers |
//! | Threshold search | Bounded by matching subtrees |
//! | Distance estimate | Linear in sample count |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sbt_index::{
    estimate_distance, KmerSearch, Leaf, Nodegraph, NodegraphConfig, SequenceBloomTree,
    ThresholdSearch,
};

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

fn random_sequence(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

fn config() -> NodegraphConfig {
    NodegraphConfig::new(21, 20_000, 3).unwrap()
}

fn datasets(count: usize, rng: &mut StdRng) -> Vec<(String, Vec<u8>)> {
    (0..count)
        .map(|i| (format!("dataset{i}"), random_sequence(rng, 500)))
        .collect()
}

fn leaf(config: &NodegraphConfig, name: &str, sequence: &[u8]) -> Leaf<Nodegraph> {
    let mut graph = config.create_nodegraph().unwrap();
    graph.consume_sequence(sequence);
    Leaf::new(name, graph)
}

fn build_tree(config: &NodegraphConfig, data: &[(String, Vec<u8>)]) -> SequenceBloomTree<Nodegraph> {
    let mut tree = SequenceBloomTree::with_seed(1);
    for (name, sequence) in data {
        tree.insert(leaf(config, name, sequence)).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sbt-insert");
    let config = config();
    let mut rng = StdRng::seed_from_u64(42);

    for size in [16, 64, 256] {
        let data = datasets(size, &mut rng);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build", size), &data, |b, data| {
            b.iter(|| black_box(build_tree(&config, data)))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("sbt-search");
    let config = config();
    let mut rng = StdRng::seed_from_u64(43);

    for size in [64, 256] {
        let data = datasets(size, &mut rng);
        let tree = build_tree(&config, &data);

        let present = data[size / 2].1[..21].to_vec();
        let absent = random_sequence(&mut rng, 21);
        let threshold = ThresholdSearch::new(&data[size / 3].1[..100], 0.8).unwrap();

        group.bench_with_input(BenchmarkId::new("kmer_present", size), &present, |b, kmer| {
            let search = KmerSearch::new(kmer);
            b.iter(|| black_box(tree.search(&search).len()))
        });
        group.bench_with_input(BenchmarkId::new("kmer_absent", size), &absent, |b, kmer| {
            let search = KmerSearch::new(kmer);
            b.iter(|| black_box(tree.search(&search).len()))
        });
        group.bench_function(BenchmarkId::new("threshold", size), |b| {
            b.iter(|| black_box(tree.search(&threshold).len()))
        });
    }

    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("sbt-distance");
    let config = config();
    let mut rng = StdRng::seed_from_u64(44);
    let a = leaf(&config, "a", &random_sequence(&mut rng, 2_000)).into_filter();
    let b = leaf(&config, "b", &random_sequence(&mut rng, 2_000)).into_filter();

    for samples in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(samples as u64));
        group.bench_with_input(BenchmarkId::new("estimate", samples), &samples, |bench, &samples| {
            let mut sample_rng = StdRng::seed_from_u64(45);
            bench.iter(|| black_box(estimate_distance(&a, &b, samples, &mut sample_rng).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_search, bench_distance);
criterion_main!(benches);
