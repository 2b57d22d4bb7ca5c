//! Weighted index drawing and the shared random source behind it.
//!
//! [`WeightedDraw`] is the crate's boundary to `rand_distr`'s alias-method
//! table: built once per weighted group at compile time, O(1) per draw, and
//! strict about its input (empty tables, negative or non-finite weights, and
//! all-zero tables are build errors, never runtime surprises).
//!
//! [`SharedRng`] is the injected random source every weighted dispatcher in
//! a graph draws from. It is seedable so traffic splits can be reproduced
//! exactly in tests, and cheap to clone (clones share the same underlying
//! generator).

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::weighted::WeightedAliasIndex;
use rand_distr::Distribution;

/// Error building a [`WeightedDraw`] from a weight table.
pub use rand::distr::weighted::Error as DrawError;

/// A build-once weighted index draw over `0..len`.
///
/// Wraps an alias table, so drawing costs the same regardless of how many
/// weights there are. Each draw is independent: there is no memory of
/// previous draws and no spreading guarantee beyond the weights themselves.
///
/// # Example
///
/// ```rust
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use trunkline::WeightedDraw;
///
/// let draw = WeightedDraw::from_weights(vec![3.0, 1.0])?;
/// let mut rng = StdRng::seed_from_u64(7);
/// let i = draw.sample(&mut rng);
/// assert!(i < draw.len());
/// # Ok::<(), trunkline::DrawError>(())
/// ```
#[derive(Debug, Clone)]
pub struct WeightedDraw {
    dist: WeightedAliasIndex<f64>,
    len: usize,
}

impl WeightedDraw {
    /// Build a draw table from relative weights.
    ///
    /// Weights must be non-negative and finite, at least one must be
    /// positive, and the table must be non-empty; anything else is a
    /// [`DrawError`]. Zero weights are legal and are simply never drawn.
    pub fn from_weights(weights: Vec<f64>) -> Result<Self, DrawError> {
        let len = weights.len();
        let dist = WeightedAliasIndex::new(weights)?;
        Ok(Self { dist, len })
    }

    /// Number of indices this table draws over.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: empty weight tables do not build.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Draw one index in `0..len`, in proportion to the weights.
    pub fn sample<R>(&self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        self.dist.sample(rng)
    }
}

/// A clonable, internally synchronized random source.
///
/// All clones share one underlying generator, so a dispatcher graph holding
/// many clones still consumes a single random stream. Lock scope is one draw;
/// the weighted split's correctness is per-draw, so cross-thread interleaving
/// of draws is harmless.
///
/// Like the rest of the crate, deterministic by default: [`Default`] seeds
/// with 0. Use [`SharedRng::from_os_rng`] for an entropy-seeded source.
#[derive(Debug, Clone)]
pub struct SharedRng {
    inner: Arc<Mutex<StdRng>>,
}

impl SharedRng {
    /// A source with a fixed seed (reproducible).
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// A source seeded from operating-system entropy.
    pub fn from_os_rng() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// Run `f` with exclusive access to the generator.
    ///
    /// A panic while holding the lock poisons the mutex but not the
    /// generator; later calls keep drawing from it.
    pub fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self::seeded(0)
    }
}
