//! Endpoint availability levels and their aggregation rules.
//!
//! [`Status`] is the coarse health signal dispatchers read before routing.
//! Two reductions cover the two composite dispatchers:
//! - [`Status::best`]: an ordered failover group is as healthy as its
//!   healthiest member (one good alternative is enough).
//! - [`Status::worst`]: a weighted split is as healthy as its sickest member
//!   (every branch receives traffic, so any sick branch hurts).
//!
//! Both reductions treat an empty group as [`Status::Unavailable`].

use std::fmt;

/// Coarse availability of an endpoint or of a dispatcher subtree.
///
/// Variants are declared worst-to-best so the derived ordering gives
/// `Available > Degraded > Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The endpoint cannot currently serve calls.
    Unavailable,
    /// The endpoint serves calls but is impaired (shedding, draining, slow).
    Degraded,
    /// The endpoint is fully able to serve calls.
    Available,
}

impl Status {
    /// The most available status in `healths`, or [`Status::Unavailable`]
    /// when `healths` is empty.
    pub fn best<I>(healths: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        healths.into_iter().max().unwrap_or(Status::Unavailable)
    }

    /// The least available status in `healths`, or [`Status::Unavailable`]
    /// when `healths` is empty.
    pub fn worst<I>(healths: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        healths.into_iter().min().unwrap_or(Status::Unavailable)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unavailable => f.write_str("unavailable"),
            Status::Degraded => f.write_str("degraded"),
            Status::Available => f.write_str("available"),
        }
    }
}
