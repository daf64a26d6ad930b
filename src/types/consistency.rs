//! Consistency strategies and revision tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque revision token returned by write operations.
///
/// Revisions name a point in the service's history. They are never
/// interpreted by the client, only stored and passed back to pin reads
/// at or after that point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Creates a revision from its token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token string.
    #[inline]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Consumes the revision, returning the token string.
    pub fn into_value(self) -> String {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Revision {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Revision {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Revision {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl AsRef<str> for Revision {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How fresh the data answering a read or check must be.
///
/// The default, [`MinimizeLatency`](Consistency::MinimizeLatency), lets
/// the service answer from whatever snapshot is fastest. Read-after-write
/// flows pass the [`Revision`] returned by the write via
/// [`AtLeastAsFresh`](Consistency::AtLeastAsFresh).
///
/// ```rust
/// use relish::{Consistency, Revision};
///
/// let written_at = Revision::new("token-from-write");
/// let consistency = Consistency::AtLeastAsFresh(written_at);
/// assert!(consistency.revision().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Consistency {
    /// Answer from the fastest available snapshot.
    #[default]
    MinimizeLatency,

    /// Answer from the latest state, at full cost.
    FullyConsistent,

    /// Answer from a snapshot no older than the given revision.
    AtLeastAsFresh(Revision),

    /// Answer from exactly the given snapshot. Fails if the service has
    /// already garbage-collected it.
    AtExactSnapshot(Revision),
}

impl Consistency {
    /// Returns the revision this strategy is pinned to, if any.
    pub fn revision(&self) -> Option<&Revision> {
        match self {
            Consistency::MinimizeLatency | Consistency::FullyConsistent => None,
            Consistency::AtLeastAsFresh(rev) | Consistency::AtExactSnapshot(rev) => Some(rev),
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consistency::MinimizeLatency => f.write_str("minimize-latency"),
            Consistency::FullyConsistent => f.write_str("fully-consistent"),
            Consistency::AtLeastAsFresh(rev) => write!(f, "at-least-as-fresh({})", rev),
            Consistency::AtExactSnapshot(rev) => write!(f, "at-exact-snapshot({})", rev),
        }
    }
}
