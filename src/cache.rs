//! The endpoint cache seam: where dispatchers hand calls off.

use crate::status::Status;

/// Per-key access to live endpoints.
///
/// The cache owns endpoint lifecycle (construction, pooling, teardown);
/// dispatchers only borrow it. [`dispatch`](EndpointCache::dispatch) serves
/// one call through the endpoint behind `key`, and
/// [`health`](EndpointCache::health) reports that endpoint's current
/// [`Status`] without side effects.
///
/// Health may change between a `health` read and the `dispatch` that acted
/// on it; callers get the endpoint's own failure in that case, not a stale
/// answer.
pub trait EndpointCache {
    /// Names one endpoint in the cache.
    type Key;
    /// Request type accepted by endpoints.
    type Req;
    /// Response type produced by endpoints.
    type Resp;
    /// Endpoint failure type, surfaced unchanged through
    /// [`DispatchError::Endpoint`](crate::DispatchError::Endpoint).
    type Error;

    /// Serve one call through the endpoint behind `key`.
    fn dispatch(&self, key: &Self::Key, req: Self::Req) -> Result<Self::Resp, Self::Error>;

    /// The current health of the endpoint behind `key`.
    fn health(&self, key: &Self::Key) -> Status;
}
