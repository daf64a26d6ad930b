//! Client library for relationship-based authorization services.
//!
//! Authorization data is modeled as relationships: facts of the form
//! "subject S holds relation R on resource O", written compactly as
//! `document:readme#viewer@user:alice`. The service stores these facts
//! and answers permission questions about them; this crate is the
//! client side, mediating every call through policy a well-behaved
//! caller wants:
//!
//! - **Retry with backoff** for transient failures, including
//!   transaction-abort markers surfaced only in message text
//!   ([`RetryConfig`]).
//! - **Bulk checks** that preserve partial results when an item fails
//!   ([`Client::check`], [`BatchCheckError`]).
//! - **Explicit consistency**: every read and check names the freshness
//!   it needs ([`Consistency`]).
//! - **Atomic transactions** of create/touch/delete mutations, guarded
//!   by preconditions ([`Transaction`]).
//! - **Cancellable streaming** for reads, watches, and exports
//!   ([`StopToken`]).
//!
//! # Example
//!
//! ```rust
//! use relish::{Client, Consistency, MockGateway, Relationship, Transaction};
//!
//! # tokio_test::block_on(async {
//! let client = Client::new(MockGateway::new());
//!
//! // Grant alice viewer on the readme.
//! let grant = Relationship::from_triple("document:readme", "viewer", "user:alice")?;
//! let written_at = client.write(Transaction::new().create(&grant)).await?;
//!
//! // Check it back, no staler than our own write.
//! let fresh = Consistency::AtLeastAsFresh(written_at);
//! assert!(client.check_one(&fresh, &grant).await?);
//! # Ok::<(), relish::Error>(())
//! # }).unwrap();
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod transport;
pub mod types;

pub use client::{Client, StopToken, StreamOutcome, UpdateKind, WatchParams};
pub use config::RetryConfig;
pub use error::{BatchCheckError, Error, ErrorKind};
pub use transport::{Gateway, MockGateway, Permissionship, SchemaResponse};
pub use types::{
    AsObject, Caveat, CaveatValue, CheckBatch, Consistency, Mutation, MutationOperation,
    ObjectRef, Precondition, PreconditionOperation, PreconditionedFilter, Relational,
    Relationship, RelationshipFilter, Revision, SubjectFilter, Transaction,
};
