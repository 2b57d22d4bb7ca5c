//! `trunkline`: compile name-resolution trees into health-aware call
//! dispatchers.
//!
//! A service name rarely resolves to a single address. It resolves to a
//! *shape*: split traffic 3:1 across two clusters and fail over to a
//! standby when a primary is sick, or refuse outright because the name
//! does not exist. That shape is a [`ResolutionTree`], pure data produced
//! by whatever resolution layer you run. [`compile()`] turns the tree into a
//! [`Dispatcher`] graph: an immutable runtime object that routes each call
//! to exactly one endpoint behind an [`EndpointCache`].
//!
//! Two composition operators cover the common topologies, and they nest:
//!
//! - **Weighted split** ([`ResolutionTree::Union`] →
//!   [`WeightedDispatcher`]): each call independently lands on one branch in
//!   proportion to its weight, via a build-once alias table
//!   ([`WeightedDraw`]). Group health is the *worst* of the branches, since
//!   every branch takes traffic.
//! - **Ordered failover** ([`ResolutionTree::Alternatives`] →
//!   [`FailoverDispatcher`]): each call re-reads child health and goes to
//!   the healthiest child, earliest listed on ties. No stickiness, no
//!   memory: a recovered primary wins the very next call. Group health is
//!   the *best* of the children, since one good alternative is enough.
//!
//! Health is the three-level [`Status`] (`Available > Degraded >
//! Unavailable`), read from the cache at call time. The dispatcher layer
//! adds no monitoring of its own; it only aggregates what the cache reports.
//!
//! **Goals:**
//! - **Deterministic by default**: inject a seeded [`SharedRng`] and a
//!   scripted cache, and every routing decision reproduces.
//! - **One call, one endpoint**: no retries across siblings, no hedging.
//!   A failed endpoint call surfaces verbatim; retry policy stays with the
//!   caller.
//! - **Immutable graphs**: all routing state is the graph's shape plus live
//!   health answers. Share a graph across threads freely.
//!
//! **Non-goals:**
//! - Not a resolver: trees come from elsewhere, and a changed tree means a
//!   recompile, not an in-place update.
//! - Not a connection pool: endpoint lifecycle belongs to the cache;
//!   [`Dispatcher::close`] is a no-op by contract.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trunkline::test_util::StubCache;
//! use trunkline::{compile, Path, ResolutionTree, SharedRng, Status};
//!
//! let cache = Arc::new(
//!     StubCache::new()
//!         .with("primary", Status::Available)
//!         .with("standby", Status::Available),
//! );
//!
//! // Prefer `primary`, fall back to `standby`.
//! let tree = ResolutionTree::alt([
//!     ResolutionTree::Leaf("primary".to_string()),
//!     ResolutionTree::Leaf("standby".to_string()),
//! ]);
//!
//! let path: Path = "/svc/search".parse()?;
//! let dispatcher = compile(&path, &tree, &cache, &SharedRng::seeded(7))?;
//!
//! assert_eq!(dispatcher.dispatch("q1".into())?, "primary:q1");
//! assert_eq!(dispatcher.health(), Status::Available);
//!
//! // The primary goes dark; the next call re-evaluates and fails over.
//! cache.set_health("primary", Status::Unavailable);
//! assert_eq!(dispatcher.dispatch("q2".into())?, "standby:q2");
//! assert_eq!(dispatcher.health(), Status::Available);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod status;
pub use status::*;

mod path;
pub use path::*;

mod tree;
pub use tree::*;

mod draw;
pub use draw::*;

mod cache;
pub use cache::*;

mod error;
pub use error::*;

mod dispatch;
pub use dispatch::*;

mod compile;
pub use compile::*;

pub mod test_util;
