//! Rooted logical names, e.g. `/svc/search`.

use std::fmt;
use std::str::FromStr;

use crate::error::PathParseError;

/// The logical name whose resolution produced a tree.
///
/// A path identifies *what* is being dispatched to, independent of which
/// endpoints currently back it. Dispatch failures carry the rendered form so
/// a refusal can say which name had no endpoints.
///
/// # Example
///
/// ```rust
/// use trunkline::Path;
///
/// let path: Path = "/svc/search".parse()?;
/// assert_eq!(path.to_string(), "/svc/search");
/// assert_eq!(path.segments(), ["svc", "search"]);
/// # Ok::<(), trunkline::PathParseError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The root path, rendered as `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments without validation.
    ///
    /// Segments are taken as-is; parse a string with [`FromStr`] when the
    /// input needs checking.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The path's segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Extend with one more segment.
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathParseError::NotRooted);
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(PathParseError::EmptySegment);
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_rooted_paths() {
        let path: Path = "/svc/search/replica-2".parse().unwrap();
        assert_eq!(path.segments(), ["svc", "search", "replica-2"]);
        assert_eq!(path.to_string(), "/svc/search/replica-2");
    }

    #[test]
    fn root_round_trips() {
        let path: Path = "/".parse().unwrap();
        assert!(path.is_root());
        assert_eq!(path.to_string(), "/");
    }

    #[test]
    fn rejects_unrooted_input() {
        assert_eq!("svc/search".parse::<Path>(), Err(PathParseError::NotRooted));
        assert_eq!("".parse::<Path>(), Err(PathParseError::NotRooted));
    }

    #[test]
    fn rejects_empty_segments() {
        assert_eq!(
            "/svc//search".parse::<Path>(),
            Err(PathParseError::EmptySegment)
        );
        assert_eq!("/svc/".parse::<Path>(), Err(PathParseError::EmptySegment));
    }

    #[test]
    fn child_extends() {
        let path = Path::new(["svc"]).child("search");
        assert_eq!(path.to_string(), "/svc/search");
    }
}
