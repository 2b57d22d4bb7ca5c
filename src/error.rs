//! Error types for tree compilation and call dispatch.
//!
//! The split mirrors when things can go wrong:
//! - [`CompileError`]: the tree itself is unusable (malformed weights,
//!   runaway depth). Surfaces once, at compile time.
//! - [`DispatchError`]: a call could not be served. Either the path had no
//!   endpoint to offer, or the endpoint itself failed; endpoint failures are
//!   passed through without rewriting.

use std::sync::Arc;

use thiserror::Error;

use crate::draw::DrawError;

/// A call through a [`Dispatcher`](crate::Dispatcher) failed.
#[derive(Debug, Error)]
pub enum DispatchError<E> {
    /// The path resolved to no endpoint (a no-endpoint marker, or a group
    /// with no members). Retrying through the same dispatcher will fail the
    /// same way until the tree is recompiled.
    #[error("no endpoint available for {path}")]
    NoEndpoint {
        /// Rendered path whose resolution came up empty.
        path: Arc<str>,
    },
    /// The selected endpoint failed. The inner error is the endpoint cache's
    /// own error, untouched: `Display` and `source` both forward to it.
    #[error(transparent)]
    Endpoint(E),
}

impl<E> DispatchError<E> {
    /// True when the failure came from the path itself rather than from an
    /// endpoint.
    pub fn is_no_endpoint(&self) -> bool {
        matches!(self, DispatchError::NoEndpoint { .. })
    }
}

/// A resolution tree could not be compiled into a dispatcher graph.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A weighted group's weights were rejected by the draw table (negative,
    /// non-finite, all zero, or too many entries).
    #[error("invalid weights under {path}")]
    InvalidWeights {
        /// Rendered path being compiled.
        path: Arc<str>,
        /// The draw table's build error.
        #[source]
        source: DrawError,
    },
    /// The tree nests deeper than the configured bound. Well-formed trees
    /// never get close; this guards against cyclic or adversarial input.
    #[error("resolution tree under {path} nests deeper than {max_depth}")]
    DepthExceeded {
        /// Rendered path being compiled.
        path: Arc<str>,
        /// The bound that was exceeded.
        max_depth: usize,
    },
}

/// A string did not parse as a rooted [`Path`](crate::Path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathParseError {
    /// The string did not start with `/`.
    #[error("path must start with '/'")]
    NotRooted,
    /// The string contained an empty segment (`//` or a trailing `/`).
    #[error("path contains an empty segment")]
    EmptySegment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("backend exploded: {0}")]
    struct BackendError(String);

    #[test]
    fn endpoint_errors_display_verbatim() {
        let inner = BackendError("socket reset".to_string());
        let wrapped: DispatchError<BackendError> = DispatchError::Endpoint(inner);
        assert_eq!(wrapped.to_string(), "backend exploded: socket reset");
        assert!(!wrapped.is_no_endpoint());
    }

    #[test]
    fn no_endpoint_names_the_path() {
        let err: DispatchError<BackendError> = DispatchError::NoEndpoint {
            path: Arc::from("/svc/search"),
        };
        assert_eq!(err.to_string(), "no endpoint available for /svc/search");
        assert!(err.is_no_endpoint());
    }

    #[test]
    fn invalid_weights_keeps_the_draw_error_as_source() {
        use std::error::Error as _;

        let source = crate::WeightedDraw::from_weights(vec![1.0, -2.0])
            .expect_err("negative weight must be rejected");
        let err = CompileError::InvalidWeights {
            path: Arc::from("/svc/split"),
            source,
        };
        assert_eq!(err.to_string(), "invalid weights under /svc/split");
        assert!(err.source().is_some());
    }
}
