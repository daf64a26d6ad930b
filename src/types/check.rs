//! Batch builder for bulk permission checks.

use serde::{Deserialize, Serialize};

use super::consistency::Consistency;
use super::relationship::{Relational, Relationship};

/// A batch of permission questions answered in one round trip.
///
/// Each item is phrased as a [`Relationship`](crate::Relationship) whose
/// relation is the permission being asked about: "does this subject hold
/// this permission on this resource?" Answers come back as booleans in
/// item order.
///
/// ```rust
/// use relish::{CheckBatch, Consistency, Relationship};
///
/// let batch = CheckBatch::new()
///     .check(Relationship::from_triple("document:readme", "view", "user:alice")?)
///     .check(Relationship::from_triple("document:readme", "edit", "user:alice")?)
///     .consistency(Consistency::FullyConsistent);
/// assert_eq!(batch.len(), 2);
/// # Ok::<(), relish::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckBatch {
    items: Vec<Relationship>,

    #[serde(default)]
    consistency: Consistency,
}

impl CheckBatch {
    /// Creates an empty batch with default consistency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a permission question.
    #[must_use]
    pub fn check(mut self, item: impl Relational) -> Self {
        self.items.push(item.relationship());
        self
    }

    /// Sets the freshness the whole batch is answered at.
    #[must_use]
    pub fn consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Returns the questions in request order.
    #[inline]
    pub fn items(&self) -> &[Relationship] {
        &self.items
    }

    /// Returns the batch's consistency strategy.
    #[inline]
    pub fn consistency_strategy(&self) -> &Consistency {
        &self.consistency
    }

    /// Returns the number of questions.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the batch carries no questions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
