//! Recursive compilation from [`ResolutionTree`] to a [`Dispatcher`] graph.
//!
//! Compilation is structure-only: it clones endpoint keys and the cache
//! handle into leaves, builds one draw table per weighted group, and renders
//! the path label at most once. It consumes no randomness and contacts no
//! endpoint; the first draw and the first health read both happen at
//! dispatch time.

use std::cell::OnceCell;
use std::sync::Arc;

use tracing::debug;

use crate::cache::EndpointCache;
use crate::dispatch::{
    Dispatcher, FailoverDispatcher, LeafDispatcher, TerminalFailure, WeightedDispatcher,
};
use crate::draw::{SharedRng, WeightedDraw};
use crate::error::CompileError;
use crate::path::Path;
use crate::tree::ResolutionTree;

/// Knobs for [`compile_with`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompileConfig {
    /// Maximum nesting depth accepted before compilation refuses with
    /// [`CompileError::DepthExceeded`]. Well-formed trees are a handful of
    /// levels deep; the bound exists to refuse runaway input.
    pub max_depth: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Compile `tree` into a dispatcher graph with the default config.
///
/// `path` names what the tree resolves; it is rendered into every refusal
/// the graph can produce. `cache` is where leaves send calls, and `rng`
/// drives every weighted group in the graph.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use trunkline::test_util::StubCache;
/// use trunkline::{compile, Path, ResolutionTree, SharedRng, Status};
///
/// let cache = Arc::new(StubCache::new().with("solo", Status::Available));
/// let tree = ResolutionTree::Leaf("solo".to_string());
/// let path: Path = "/svc/solo".parse()?;
///
/// let dispatcher = compile(&path, &tree, &cache, &SharedRng::seeded(7))?;
/// assert_eq!(dispatcher.dispatch("hi".into())?, "solo:hi");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compile<C>(
    path: &Path,
    tree: &ResolutionTree<C::Key>,
    cache: &Arc<C>,
    rng: &SharedRng,
) -> Result<Dispatcher<C>, CompileError>
where
    C: EndpointCache,
    C::Key: Clone,
{
    compile_with(CompileConfig::default(), path, tree, cache, rng)
}

/// Like [`compile`], with explicit [`CompileConfig`].
pub fn compile_with<C>(
    config: CompileConfig,
    path: &Path,
    tree: &ResolutionTree<C::Key>,
    cache: &Arc<C>,
    rng: &SharedRng,
) -> Result<Dispatcher<C>, CompileError>
where
    C: EndpointCache,
    C::Key: Clone,
{
    let compiler = Compiler {
        cache,
        rng,
        path,
        label: OnceCell::new(),
        max_depth: config.max_depth,
    };
    let dispatcher = compiler.node(tree, 0)?;
    debug!(
        path = %path,
        root = ?dispatcher.kind(),
        endpoints = dispatcher.endpoint_keys().len(),
        "compiled resolution tree"
    );
    Ok(dispatcher)
}

struct Compiler<'a, C: EndpointCache> {
    cache: &'a Arc<C>,
    rng: &'a SharedRng,
    path: &'a Path,
    // Rendered at most once per compile; every node produced by this compile
    // that carries the path shares the one allocation.
    label: OnceCell<Arc<str>>,
    max_depth: usize,
}

impl<C> Compiler<'_, C>
where
    C: EndpointCache,
    C::Key: Clone,
{
    fn label(&self) -> Arc<str> {
        Arc::clone(self.label.get_or_init(|| Arc::from(self.path.to_string())))
    }

    fn node(
        &self,
        tree: &ResolutionTree<C::Key>,
        depth: usize,
    ) -> Result<Dispatcher<C>, CompileError> {
        if depth > self.max_depth {
            return Err(CompileError::DepthExceeded {
                path: self.label(),
                max_depth: self.max_depth,
            });
        }
        match tree {
            // The three markers differ upstream (resolvers cache them
            // differently) but dispatch identically: refuse, naming the path.
            ResolutionTree::Empty | ResolutionTree::Negative | ResolutionTree::Unresolvable => {
                Ok(Dispatcher::Terminal(TerminalFailure::new(self.label())))
            }
            ResolutionTree::Leaf(key) => Ok(Dispatcher::Leaf(LeafDispatcher::new(
                key.clone(),
                Arc::clone(self.cache),
            ))),
            ResolutionTree::Alternatives(children) => {
                let children = children
                    .iter()
                    .map(|child| self.node(child, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Dispatcher::Failover(FailoverDispatcher::new(
                    self.label(),
                    children,
                )))
            }
            // A branchless union has no weights to build a table from; it
            // refuses like a marker instead of reaching the draw primitive.
            ResolutionTree::Union(branches) if branches.is_empty() => {
                Ok(Dispatcher::Terminal(TerminalFailure::new(self.label())))
            }
            ResolutionTree::Union(branches) => {
                let weights: Vec<f64> = branches.iter().map(|branch| branch.weight).collect();
                let draw =
                    WeightedDraw::from_weights(weights).map_err(|source| {
                        CompileError::InvalidWeights {
                            path: self.label(),
                            source,
                        }
                    })?;
                let children = branches
                    .iter()
                    .map(|branch| self.node(&branch.tree, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Dispatcher::Weighted(WeightedDispatcher::new(
                    self.label(),
                    draw,
                    self.rng.clone(),
                    children,
                )))
            }
        }
    }
}
