//! The dispatcher graph: the immutable runtime object calls route through.
//!
//! A [`Dispatcher`] is what [`compile`](crate::compile()) produces from a
//! resolution tree. Routing state lives entirely in the graph's shape plus
//! the endpoint cache's live health answers:
//!
//! - [`FailoverDispatcher`] re-reads child health on every call and forwards
//!   to the healthiest child, earliest-listed on ties. Nothing is remembered
//!   between calls, so a recovered child wins back traffic immediately.
//! - [`WeightedDispatcher`] draws one child per call in proportion to the
//!   compiled weights, independently of every other call.
//! - [`LeafDispatcher`] hands the call to the endpoint cache.
//! - [`TerminalFailure`] refuses every call, naming the path that resolved
//!   to nothing.
//!
//! No dispatcher retries a sibling after a failed call: one call, one
//! endpoint attempt. Failure handling is the caller's policy.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::cache::EndpointCache;
use crate::draw::{SharedRng, WeightedDraw};
use crate::error::DispatchError;
use crate::status::Status;

/// Which variant a [`Dispatcher`] node is, for logs and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherKind {
    /// A [`TerminalFailure`].
    Terminal,
    /// A [`LeafDispatcher`].
    Leaf,
    /// A [`FailoverDispatcher`].
    Failover,
    /// A [`WeightedDispatcher`].
    Weighted,
}

/// A compiled, immutable dispatcher graph node.
///
/// Graphs are safe to share: all state is read-only after compilation except
/// the injected [`SharedRng`], which synchronizes internally. Wrap the root
/// in an [`Arc`] to dispatch from many threads at once.
pub enum Dispatcher<C: EndpointCache> {
    /// Refuses every call.
    Terminal(TerminalFailure),
    /// Delegates to one endpoint.
    Leaf(LeafDispatcher<C>),
    /// Ordered failover across children.
    Failover(FailoverDispatcher<C>),
    /// Weighted split across children.
    Weighted(WeightedDispatcher<C>),
}

impl<C: EndpointCache> Dispatcher<C> {
    /// Route one request to one endpoint.
    ///
    /// Exactly one endpoint is attempted per call; an endpoint failure is
    /// returned as-is, never retried against a sibling.
    pub fn dispatch(&self, req: C::Req) -> Result<C::Resp, DispatchError<C::Error>> {
        match self {
            Dispatcher::Terminal(t) => Err(t.refuse()),
            Dispatcher::Leaf(leaf) => leaf.dispatch(req),
            Dispatcher::Failover(failover) => failover.dispatch(req),
            Dispatcher::Weighted(weighted) => weighted.dispatch(req),
        }
    }

    /// Current health of this subtree, recomputed from the cache on every
    /// call.
    pub fn health(&self) -> Status {
        match self {
            Dispatcher::Terminal(_) => Status::Unavailable,
            Dispatcher::Leaf(leaf) => leaf.health(),
            Dispatcher::Failover(failover) => failover.health(),
            Dispatcher::Weighted(weighted) => weighted.health(),
        }
    }

    /// Release this dispatcher's interest in its endpoints.
    ///
    /// Endpoint lifecycle belongs to the cache, so there is nothing to tear
    /// down here; closing can never fail and has no effect on any other
    /// dispatcher sharing the same cache. The dispatcher remains usable.
    pub fn close(&self) {}

    /// This node's variant.
    pub fn kind(&self) -> DispatcherKind {
        match self {
            Dispatcher::Terminal(_) => DispatcherKind::Terminal,
            Dispatcher::Leaf(_) => DispatcherKind::Leaf,
            Dispatcher::Failover(_) => DispatcherKind::Failover,
            Dispatcher::Weighted(_) => DispatcherKind::Weighted,
        }
    }

    /// Every endpoint key reachable from this node, depth first.
    ///
    /// Keys under several branches appear once per occurrence; useful for
    /// cache warm-up.
    pub fn endpoint_keys(&self) -> Vec<&C::Key> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, out: &mut Vec<&'a C::Key>) {
        match self {
            Dispatcher::Terminal(_) => {}
            Dispatcher::Leaf(leaf) => out.push(&leaf.key),
            Dispatcher::Failover(failover) => {
                for child in &failover.children {
                    child.collect_keys(out);
                }
            }
            Dispatcher::Weighted(weighted) => {
                for child in &weighted.children {
                    child.collect_keys(out);
                }
            }
        }
    }
}

/// A node whose path resolved to no endpoints; every call fails.
pub struct TerminalFailure {
    path: Arc<str>,
}

impl TerminalFailure {
    pub(crate) fn new(path: Arc<str>) -> Self {
        Self { path }
    }

    /// The rendered path this node refuses on behalf of.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn refuse<E>(&self) -> DispatchError<E> {
        DispatchError::NoEndpoint {
            path: Arc::clone(&self.path),
        }
    }
}

/// Delegates every call and health query to one endpoint in the cache.
pub struct LeafDispatcher<C: EndpointCache> {
    key: C::Key,
    cache: Arc<C>,
}

impl<C: EndpointCache> LeafDispatcher<C> {
    pub(crate) fn new(key: C::Key, cache: Arc<C>) -> Self {
        Self { key, cache }
    }

    /// The endpoint key this leaf dispatches to.
    pub fn key(&self) -> &C::Key {
        &self.key
    }

    fn dispatch(&self, req: C::Req) -> Result<C::Resp, DispatchError<C::Error>> {
        self.cache
            .dispatch(&self.key, req)
            .map_err(DispatchError::Endpoint)
    }

    fn health(&self) -> Status {
        self.cache.health(&self.key)
    }
}

/// Ordered failover: forwards each call to the healthiest child, preferring
/// the earliest listed on ties.
pub struct FailoverDispatcher<C: EndpointCache> {
    path: Arc<str>,
    children: Vec<Dispatcher<C>>,
}

impl<C: EndpointCache> FailoverDispatcher<C> {
    pub(crate) fn new(path: Arc<str>, children: Vec<Dispatcher<C>>) -> Self {
        Self { path, children }
    }

    /// The rendered path this group was compiled for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Children in preference order.
    pub fn children(&self) -> &[Dispatcher<C>] {
        &self.children
    }

    fn dispatch(&self, req: C::Req) -> Result<C::Resp, DispatchError<C::Error>> {
        // Health is re-read on every call, so selection tracks recovery and
        // degradation without any memory of earlier picks.
        let healths: Vec<Status> = self.children.iter().map(Dispatcher::health).collect();

        // Single pass, strictly-greater-wins: the earliest child at the best
        // health level is kept on ties.
        let mut chosen: Option<(usize, Status)> = None;
        for (i, &health) in healths.iter().enumerate() {
            match chosen {
                Some((_, best)) if health <= best => {}
                _ => chosen = Some((i, health)),
            }
        }

        debug!(
            path = %self.path,
            healths = ?healths,
            chosen = chosen.map(|(i, _)| i),
            "failover health snapshot"
        );

        match chosen {
            Some((i, _)) => self.children[i].dispatch(req),
            None => Err(DispatchError::NoEndpoint {
                path: Arc::clone(&self.path),
            }),
        }
    }

    // One healthy alternative is enough to serve.
    fn health(&self) -> Status {
        Status::best(self.children.iter().map(Dispatcher::health))
    }
}

/// Weighted split: each call lands on one child drawn in proportion to the
/// compiled weights.
pub struct WeightedDispatcher<C: EndpointCache> {
    path: Arc<str>,
    draw: WeightedDraw,
    rng: SharedRng,
    children: Vec<Dispatcher<C>>,
}

impl<C: EndpointCache> WeightedDispatcher<C> {
    // `draw` and `children` are index-aligned: the table was built from
    // exactly these children's weights, in order.
    pub(crate) fn new(
        path: Arc<str>,
        draw: WeightedDraw,
        rng: SharedRng,
        children: Vec<Dispatcher<C>>,
    ) -> Self {
        Self {
            path,
            draw,
            rng,
            children,
        }
    }

    /// The rendered path this group was compiled for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Children in weight-table order.
    pub fn children(&self) -> &[Dispatcher<C>] {
        &self.children
    }

    fn dispatch(&self, req: C::Req) -> Result<C::Resp, DispatchError<C::Error>> {
        // Compilation never produces a childless split, but a broken table
        // must refuse like a terminal rather than draw out of range.
        if self.children.is_empty() {
            return Err(DispatchError::NoEndpoint {
                path: Arc::clone(&self.path),
            });
        }
        let i = self.rng.with(|rng| self.draw.sample(rng));
        self.children[i].dispatch(req)
    }

    // Every branch takes traffic, so one sick branch drags the whole split.
    fn health(&self) -> Status {
        Status::worst(self.children.iter().map(Dispatcher::health))
    }
}

// ---------------------------------------------------------------------------
// Debug: derived impls would demand C: Debug; only the key needs it.
// ---------------------------------------------------------------------------

impl fmt::Debug for TerminalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalFailure")
            .field("path", &self.path)
            .finish()
    }
}

impl<C: EndpointCache> fmt::Debug for LeafDispatcher<C>
where
    C::Key: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafDispatcher")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<C: EndpointCache> fmt::Debug for FailoverDispatcher<C>
where
    C::Key: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailoverDispatcher")
            .field("path", &self.path)
            .field("children", &self.children)
            .finish()
    }
}

impl<C: EndpointCache> fmt::Debug for WeightedDispatcher<C>
where
    C::Key: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedDispatcher")
            .field("path", &self.path)
            .field("draw", &self.draw)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl<C: EndpointCache> fmt::Debug for Dispatcher<C>
where
    C::Key: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatcher::Terminal(t) => t.fmt(f),
            Dispatcher::Leaf(leaf) => leaf.fmt(f),
            Dispatcher::Failover(failover) => failover.fmt(f),
            Dispatcher::Weighted(weighted) => weighted.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::StubCache;
    use tracing_test::traced_test;

    fn terminal<C: EndpointCache>(path: &str) -> Dispatcher<C> {
        Dispatcher::Terminal(TerminalFailure::new(Arc::from(path)))
    }

    fn leaf(cache: &Arc<StubCache>, key: &str) -> Dispatcher<StubCache> {
        Dispatcher::Leaf(LeafDispatcher::new(key.to_string(), Arc::clone(cache)))
    }

    #[test]
    fn terminal_refuses_and_names_the_path() {
        let d: Dispatcher<StubCache> = terminal("/svc/missing");
        let err = d.dispatch("req".into()).unwrap_err();
        assert_eq!(err.to_string(), "no endpoint available for /svc/missing");
        assert_eq!(d.health(), Status::Unavailable);
        assert_eq!(d.kind(), DispatcherKind::Terminal);
    }

    #[test]
    fn leaf_delegates_to_the_cache() {
        let cache = Arc::new(StubCache::new().with("a", Status::Degraded));
        let d = leaf(&cache, "a");
        assert_eq!(d.dispatch("ping".into()).unwrap(), "a:ping");
        assert_eq!(d.health(), Status::Degraded);
        assert_eq!(cache.hits("a"), 1);
    }

    #[test]
    fn failover_tie_goes_to_the_earliest_child() {
        let cache = Arc::new(
            StubCache::new()
                .with("a", Status::Available)
                .with("b", Status::Available),
        );
        let d = Dispatcher::Failover(FailoverDispatcher::new(
            Arc::from("/svc/pair"),
            vec![leaf(&cache, "a"), leaf(&cache, "b")],
        ));
        for _ in 0..50 {
            assert_eq!(d.dispatch("req".into()).unwrap(), "a:req");
        }
        assert_eq!(cache.hits("a"), 50);
        assert_eq!(cache.hits("b"), 0);
    }

    #[test]
    fn empty_failover_refuses() {
        let d: Dispatcher<StubCache> =
            Dispatcher::Failover(FailoverDispatcher::new(Arc::from("/svc/none"), Vec::new()));
        let err = d.dispatch("req".into()).unwrap_err();
        assert!(err.is_no_endpoint());
        assert_eq!(d.health(), Status::Unavailable);
    }

    #[test]
    fn childless_weighted_refuses_instead_of_drawing() {
        let draw = WeightedDraw::from_weights(vec![1.0]).unwrap();
        let d: Dispatcher<StubCache> = Dispatcher::Weighted(WeightedDispatcher::new(
            Arc::from("/svc/none"),
            draw,
            SharedRng::seeded(0),
            Vec::new(),
        ));
        let err = d.dispatch("req".into()).unwrap_err();
        assert!(err.is_no_endpoint());
        assert_eq!(d.health(), Status::Unavailable);
    }

    #[traced_test]
    #[test]
    fn failover_emits_a_health_snapshot() {
        let cache = Arc::new(
            StubCache::new()
                .with("a", Status::Unavailable)
                .with("b", Status::Available),
        );
        let d = Dispatcher::Failover(FailoverDispatcher::new(
            Arc::from("/svc/traced"),
            vec![leaf(&cache, "a"), leaf(&cache, "b")],
        ));
        d.dispatch("req".into()).unwrap();
        assert!(logs_contain("failover health snapshot"));
        assert!(logs_contain("/svc/traced"));
    }

    #[test]
    fn endpoint_keys_walk_depth_first() {
        let cache = Arc::new(
            StubCache::new()
                .with("a", Status::Available)
                .with("b", Status::Available)
                .with("c", Status::Available),
        );
        let d = Dispatcher::Failover(FailoverDispatcher::new(
            Arc::from("/svc/all"),
            vec![
                leaf(&cache, "a"),
                Dispatcher::Weighted(WeightedDispatcher::new(
                    Arc::from("/svc/all"),
                    WeightedDraw::from_weights(vec![1.0, 1.0]).unwrap(),
                    SharedRng::seeded(0),
                    vec![leaf(&cache, "b"), leaf(&cache, "c")],
                )),
                terminal("/svc/all"),
            ],
        ));
        let keys: Vec<&String> = d.endpoint_keys();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn debug_output_names_variants() {
        let cache = Arc::new(StubCache::new().with("a", Status::Available));
        let d = Dispatcher::Failover(FailoverDispatcher::new(
            Arc::from("/svc/debug"),
            vec![leaf(&cache, "a")],
        ));
        let rendered = format!("{d:?}");
        assert!(rendered.contains("FailoverDispatcher"));
        assert!(rendered.contains("LeafDispatcher"));
    }
}
