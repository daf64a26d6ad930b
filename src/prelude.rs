//! Convenience re-exports for the common path.
//!
//! ```rust
//! use relish::prelude::*;
//! ```

pub use crate::client::{Client, StopToken, StreamOutcome, UpdateKind, WatchParams};
pub use crate::config::RetryConfig;
pub use crate::error::{BatchCheckError, Error, ErrorKind};
pub use crate::types::{
    CheckBatch, Consistency, PreconditionedFilter, Relational, Relationship, RelationshipFilter,
    Revision, SubjectFilter, Transaction,
};
