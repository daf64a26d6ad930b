//! Core data model: relationships, filters, consistency, transactions.

mod caveat;
mod check;
mod consistency;
mod filter;
mod relationship;
mod txn;

pub use caveat::{Caveat, CaveatValue};
pub use check::CheckBatch;
pub use consistency::{Consistency, Revision};
pub use filter::{
    Precondition, PreconditionOperation, PreconditionedFilter, RelationshipFilter, SubjectFilter,
};
pub use relationship::{AsObject, ObjectRef, Relational, Relationship};
pub use txn::{Mutation, MutationOperation, Transaction};
