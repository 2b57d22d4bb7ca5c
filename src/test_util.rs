//! Scripted in-memory endpoint cache for tests, benches, and examples.
//!
//! [`StubCache`] plays the endpoint-cache role without any transport: each
//! key maps to an endpoint with a settable health, an optional scripted
//! failure, and a hit counter. Endpoints are reconfigured through `&self`,
//! so a test can flip health or inject failures behind the same [`Arc`] the
//! dispatcher graph already holds.
//!
//! [`Arc`]: std::sync::Arc

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::cache::EndpointCache;
use crate::status::Status;

/// Failure produced by a [`StubCache`] endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StubError {
    /// The key was never registered.
    #[error("no such endpoint: {0}")]
    UnknownKey(String),
    /// The endpoint was scripted to fail via [`StubCache::fail_with`].
    #[error("{0}")]
    Scripted(String),
}

#[derive(Debug)]
struct Endpoint {
    health: Status,
    fail_with: Option<String>,
    hits: u64,
}

/// In-memory [`EndpointCache`] with scriptable per-key behavior.
///
/// Dispatching to key `k` with request `r` answers `"k:r"` (or the scripted
/// failure) and counts a hit either way. Health reads answer the scripted
/// [`Status`], or [`Status::Unavailable`] for unknown keys.
///
/// # Example
///
/// ```rust
/// use trunkline::test_util::StubCache;
/// use trunkline::{EndpointCache, Status};
///
/// let cache = StubCache::new().with("a", Status::Available);
/// assert_eq!(cache.dispatch(&"a".to_string(), "req".to_string()).unwrap(), "a:req");
/// assert_eq!(cache.health(&"a".to_string()), Status::Available);
/// assert_eq!(cache.hits("a"), 1);
/// ```
#[derive(Debug, Default)]
pub struct StubCache {
    endpoints: Mutex<BTreeMap<String, Endpoint>>,
}

impl StubCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](StubCache::insert).
    pub fn with(self, key: impl Into<String>, health: Status) -> Self {
        self.insert(key, health);
        self
    }

    /// Register (or replace) an endpoint with the given health.
    pub fn insert(&self, key: impl Into<String>, health: Status) {
        self.lock().insert(
            key.into(),
            Endpoint {
                health,
                fail_with: None,
                hits: 0,
            },
        );
    }

    /// Change a registered endpoint's health. Unknown keys are ignored.
    pub fn set_health(&self, key: &str, health: Status) {
        if let Some(endpoint) = self.lock().get_mut(key) {
            endpoint.health = health;
        }
    }

    /// Script dispatches to `key` to fail with `message`. Unknown keys are
    /// ignored.
    pub fn fail_with(&self, key: &str, message: impl Into<String>) {
        if let Some(endpoint) = self.lock().get_mut(key) {
            endpoint.fail_with = Some(message.into());
        }
    }

    /// Number of dispatches that reached `key` (successes and scripted
    /// failures both count).
    pub fn hits(&self, key: &str) -> u64 {
        self.lock().get(key).map(|e| e.hits).unwrap_or(0)
    }

    /// Total dispatches across all endpoints.
    pub fn total_hits(&self) -> u64 {
        self.lock().values().map(|e| e.hits).sum()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Endpoint>> {
        self.endpoints.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EndpointCache for StubCache {
    type Key = String;
    type Req = String;
    type Resp = String;
    type Error = StubError;

    fn dispatch(&self, key: &String, req: String) -> Result<String, StubError> {
        let mut endpoints = self.lock();
        let Some(endpoint) = endpoints.get_mut(key) else {
            return Err(StubError::UnknownKey(key.clone()));
        };
        endpoint.hits += 1;
        match &endpoint.fail_with {
            Some(message) => Err(StubError::Scripted(message.clone())),
            None => Ok(format!("{key}:{req}")),
        }
    }

    fn health(&self, key: &String) -> Status {
        self.lock()
            .get(key)
            .map(|e| e.health)
            .unwrap_or(Status::Unavailable)
    }
}
