//! Error types for the client library.
//!
//! All fallible operations return [`Error`], categorized by [`ErrorKind`].
//! Bulk checks use [`BatchCheckError`] so that results decoded before a
//! failing item are not lost.

mod batch_check;
#[allow(clippy::module_inception)]
mod error;
mod kind;

pub use batch_check::BatchCheckError;
pub use error::Error;
pub use kind::ErrorKind;
