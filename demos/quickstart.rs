//! Dispatcher quickstart: the complete compile-and-dispatch lifecycle.
//!
//! Shows:
//! 1. Describing a service as a weighted split across a failover pair.
//! 2. Compiling the tree against an endpoint cache.
//! 3. Steady-state traffic following the weights, ties pinned to the leader.
//! 4. Per-call failover when the leader goes dark, and instant recovery.
//! 5. Refusals that name the path they were compiled for.
//! 6. close() as a structural no-op.
//!
//! Run with:
//!   cargo run --example quickstart
//!
//! Set RUST_LOG=trunkline=debug to watch the per-call health snapshots.

use std::sync::Arc;

use trunkline::test_util::StubCache;
use trunkline::{compile, Path, ResolutionTree, SharedRng, Status};

type Tree = ResolutionTree<String>;

fn leaf(key: &str) -> Tree {
    Tree::Leaf(key.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // -----------------------------------------------------------------------
    // 1. Describe the service
    // -----------------------------------------------------------------------
    println!("=== 1. Describe the service ===");

    // A 3:1 split between an east-coast failover pair and a west-coast solo.
    let tree = Tree::union([
        (3.0, Tree::alt([leaf("east-1"), leaf("east-2")])),
        (1.0, leaf("west-1")),
    ]);
    println!("  tree: {tree:?}");

    let cache = Arc::new(
        StubCache::new()
            .with("east-1", Status::Available)
            .with("east-2", Status::Available)
            .with("west-1", Status::Available),
    );

    // -----------------------------------------------------------------------
    // 2. Compile it
    // -----------------------------------------------------------------------
    println!("\n=== 2. Compile it ===");

    let path: Path = "/svc/search".parse().unwrap();
    let dispatcher = compile(&path, &tree, &cache, &SharedRng::seeded(7)).unwrap();
    println!("  root: {:?}", dispatcher.kind());
    println!("  endpoints: {:?}", dispatcher.endpoint_keys());
    println!("  health: {}", dispatcher.health());

    // -----------------------------------------------------------------------
    // 3. Steady-state traffic
    // -----------------------------------------------------------------------
    println!("\n=== 3. Steady-state traffic ===");

    for i in 0..2_000 {
        dispatcher.dispatch(format!("q{i}")).unwrap();
    }
    let east = cache.hits("east-1") + cache.hits("east-2");
    let west = cache.hits("west-1");
    println!("  east served {east} calls, west served {west} (weights 3:1)");
    assert!(east > west, "the heavier branch should see more traffic");
    assert_eq!(
        cache.hits("east-2"),
        0,
        "health ties inside the pair should pin its first member"
    );

    // -----------------------------------------------------------------------
    // 4. Failover and recovery
    // -----------------------------------------------------------------------
    println!("\n=== 4. Failover and recovery ===");

    cache.set_health("east-1", Status::Unavailable);
    println!("  east-1 goes dark; graph health: {}", dispatcher.health());
    assert_eq!(
        dispatcher.health(),
        Status::Available,
        "the pair still has a healthy member"
    );

    let idle = cache.hits("east-1");
    for i in 0..400 {
        dispatcher.dispatch(format!("f{i}")).unwrap();
    }
    println!(
        "  east-2 absorbed {} calls while east-1 sat out",
        cache.hits("east-2")
    );
    assert_eq!(cache.hits("east-1"), idle, "a dark endpoint gets no traffic");
    assert!(cache.hits("east-2") > 0, "its sibling should take over");

    cache.set_health("east-1", Status::Available);
    let restored = cache.hits("east-1");
    for i in 0..400 {
        dispatcher.dispatch(format!("g{i}")).unwrap();
    }
    assert!(
        cache.hits("east-1") > restored,
        "recovery is per-call, no cool-down"
    );
    println!("  east-1 restored: it serves again on the very next draw");

    // -----------------------------------------------------------------------
    // 5. Refusals name the path
    // -----------------------------------------------------------------------
    println!("\n=== 5. Refusals name the path ===");

    let retired: Path = "/svc/retired".parse().unwrap();
    let refusal = compile(&retired, &Tree::Negative, &cache, &SharedRng::seeded(7)).unwrap();
    let err = refusal.dispatch("q".to_string()).unwrap_err();
    println!("  dispatch error: {err}");
    assert_eq!(err.to_string(), "no endpoint available for /svc/retired");
    assert_eq!(refusal.health(), Status::Unavailable);

    // -----------------------------------------------------------------------
    // 6. close() is a no-op
    // -----------------------------------------------------------------------
    println!("\n=== 6. close() is a no-op ===");

    dispatcher.close();
    let resp = dispatcher.dispatch("after-close".to_string()).unwrap();
    println!("  still serving after close: {resp}");

    println!("\nAll assertions passed.");
}
