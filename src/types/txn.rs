//! Transaction builder for atomic relationship writes.

use serde::{Deserialize, Serialize};

use super::filter::{Precondition, RelationshipFilter};
use super::relationship::{Relational, Relationship};

/// How a single mutation changes the relationship store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationOperation {
    /// Insert; the write fails if the relationship already exists.
    Create,

    /// Upsert; succeeds whether or not the relationship exists.
    Touch,

    /// Remove; succeeds whether or not the relationship exists.
    Delete,
}

/// One mutation in a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// What to do with the relationship.
    pub operation: MutationOperation,

    /// The relationship being created, touched, or deleted.
    pub relationship: Relationship,
}

/// A batch of relationship mutations applied atomically, optionally
/// guarded by preconditions.
///
/// Either every mutation applies and every precondition holds, or
/// nothing changes. Mutations apply in the order they were added.
///
/// ```rust
/// use relish::{Relationship, RelationshipFilter, Transaction};
///
/// let promote = Relationship::from_triple("document:readme", "editor", "user:alice")?;
/// let demote = Relationship::from_triple("document:readme", "viewer", "user:alice")?;
///
/// let txn = Transaction::new()
///     .touch(&promote)
///     .delete(&demote)
///     .must_match(RelationshipFilter::new("document").resource_id("readme"));
/// assert_eq!(txn.len(), 2);
/// # Ok::<(), relish::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    mutations: Vec<Mutation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    preconditions: Vec<Precondition>,
}

impl Transaction {
    /// Creates an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, operation: MutationOperation, rel: impl Relational) -> Self {
        self.mutations.push(Mutation {
            operation,
            relationship: rel.relationship(),
        });
        self
    }

    /// Adds an insert. The whole transaction fails with
    /// [`AlreadyExists`](crate::ErrorKind::AlreadyExists) if the
    /// relationship is already present.
    #[must_use]
    pub fn create(self, rel: impl Relational) -> Self {
        self.push(MutationOperation::Create, rel)
    }

    /// Adds an upsert.
    #[must_use]
    pub fn touch(self, rel: impl Relational) -> Self {
        self.push(MutationOperation::Touch, rel)
    }

    /// Adds a removal. Deleting an absent relationship is not an error.
    #[must_use]
    pub fn delete(self, rel: impl Relational) -> Self {
        self.push(MutationOperation::Delete, rel)
    }

    /// Guards the transaction on at least one relationship matching.
    #[must_use]
    pub fn must_match(mut self, filter: RelationshipFilter) -> Self {
        self.preconditions.push(Precondition::must_match(filter));
        self
    }

    /// Guards the transaction on no relationship matching.
    #[must_use]
    pub fn must_not_match(mut self, filter: RelationshipFilter) -> Self {
        self.preconditions.push(Precondition::must_not_match(filter));
        self
    }

    /// Returns the mutations in application order.
    #[inline]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Returns the guards, in the order they were added.
    #[inline]
    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    /// Returns the number of mutations.
    #[inline]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns `true` if the transaction carries no mutations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::filter::PreconditionOperation;

    fn rel(subject: &str) -> Relationship {
        Relationship::from_triple("document:readme", "viewer", subject)
            .expect("valid relationship")
    }

    #[test]
    fn test_mutations_keep_order() {
        let txn = Transaction::new()
            .create(rel("user:alice"))
            .touch(rel("user:bob"))
            .delete(rel("user:carol"));

        let ops: Vec<_> = txn.mutations().iter().map(|m| m.operation).collect();
        assert_eq!(
            ops,
            vec![
                MutationOperation::Create,
                MutationOperation::Touch,
                MutationOperation::Delete,
            ]
        );
        assert_eq!(txn.len(), 3);
        assert!(!txn.is_empty());
    }

    #[test]
    fn test_empty_transaction() {
        let txn = Transaction::new();
        assert!(txn.is_empty());
        assert!(txn.preconditions().is_empty());
    }

    #[test]
    fn test_preconditions() {
        let txn = Transaction::new()
            .touch(rel("user:alice"))
            .must_not_match(RelationshipFilter::new("document").relation("banned"));

        assert_eq!(txn.preconditions().len(), 1);
        assert_eq!(
            txn.preconditions()[0].operation,
            PreconditionOperation::MustNotMatch
        );
    }

    #[test]
    fn test_accepts_references_and_values() {
        let alice = rel("user:alice");
        let txn = Transaction::new().touch(&alice).delete(alice.clone());
        assert_eq!(txn.mutations()[0].relationship, alice);
        assert_eq!(txn.mutations()[1].relationship, alice);
    }
}
