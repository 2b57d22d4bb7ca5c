use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use trunkline::test_util::StubCache;
use trunkline::{compile, Path, ResolutionTree, SharedRng, Status};

type Tree = ResolutionTree<String>;

fn populated_cache(fanout: usize) -> Arc<StubCache> {
    let cache = StubCache::new();
    for i in 0..fanout {
        cache.insert(format!("e{i}"), Status::Available);
    }
    Arc::new(cache)
}

fn bench_dispatch(c: &mut Criterion) {
    let rng = SharedRng::seeded(123);

    let mut group = c.benchmark_group("dispatch");
    for &fanout in &[2usize, 8usize, 32usize] {
        let cache = populated_cache(fanout);

        let union = Tree::union((0..fanout).map(|i| (1.0 + i as f64, Tree::Leaf(format!("e{i}")))));
        let path: Path = "/bench/weighted".parse().unwrap();
        let weighted = compile(&path, &union, &cache, &rng).unwrap();

        group.bench_with_input(BenchmarkId::new("weighted", fanout), &fanout, |b, &_n| {
            b.iter(|| {
                let resp = weighted.dispatch(black_box("req".to_string()));
                black_box(resp).unwrap();
            })
        });

        let alt = Tree::alt((0..fanout).map(|i| Tree::Leaf(format!("e{i}"))));
        let path: Path = "/bench/failover".parse().unwrap();
        let failover = compile(&path, &alt, &cache, &rng).unwrap();

        group.bench_with_input(BenchmarkId::new("failover", fanout), &fanout, |b, &_n| {
            b.iter(|| {
                let resp = failover.dispatch(black_box("req".to_string()));
                black_box(resp).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let rng = SharedRng::seeded(123);

    let mut group = c.benchmark_group("compile");
    for &fanout in &[2usize, 8usize, 32usize] {
        let cache = populated_cache(fanout);

        // A two-level tree: a weighted split across failover pairs.
        let tree = Tree::union((0..fanout).map(|i| {
            let pair = Tree::alt([
                Tree::Leaf(format!("e{i}")),
                Tree::Leaf(format!("e{}", (i + 1) % fanout)),
            ]);
            (1.0 + i as f64, pair)
        }));
        let path: Path = "/bench/compile".parse().unwrap();

        group.bench_with_input(BenchmarkId::new("two_level", fanout), &fanout, |b, &_n| {
            b.iter(|| {
                let d = compile(&path, black_box(&tree), &cache, &rng).unwrap();
                black_box(d);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_compile);
criterion_main!(benches);
