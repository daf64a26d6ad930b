//! Main error type for the client library.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use super::ErrorKind;

/// The primary error type for client operations.
///
/// Every error carries a [`kind()`](Error::kind) for categorization, a
/// human-readable message, and optionally the underlying cause as
/// [`source()`](StdError::source).
///
/// ## Example
///
/// ```rust
/// use relish::{Error, ErrorKind};
///
/// fn handle_error(err: Error) {
///     match err.kind() {
///         ErrorKind::RetriesExhausted => {
///             // the last underlying failure is preserved
///             if let Some(cause) = std::error::Error::source(&err) {
///                 eprintln!("gave up retrying: {}", cause);
///             }
///         }
///         kind if kind.is_retriable() => eprintln!("transient: {}", err),
///         _ => eprintln!("terminal: {}", err),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    /// The error category.
    kind: ErrorKind,

    /// Human-readable error message.
    message: Cow<'static, str>,

    /// The underlying error, if any.
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error from a kind, using the kind's display as message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: Cow::Owned(kind.to_string()),
            source: None,
        }
    }

    /// Returns the error kind for categorization.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if this error is generally safe to retry.
    ///
    /// Convenience for `self.kind().is_retriable()`; the retry policy
    /// additionally matches transient-conflict marker strings.
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.kind.is_retriable()
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors for common error kinds.

    /// Creates an invalid-resource validation error.
    pub fn invalid_resource(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidResource, message)
    }

    /// Creates an invalid-relation validation error.
    pub fn invalid_relation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidRelation, message)
    }

    /// Creates an invalid-subject validation error.
    pub fn invalid_subject(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidSubject, message)
    }

    /// Creates an already-exists error.
    pub fn already_exists(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// Creates a precondition-failed error.
    pub fn precondition_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::PreconditionFailed, message)
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Creates a transient-conflict error.
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates an item-scoped bulk-check failure.
    pub fn item_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ItemFailed, message)
    }

    /// Creates a completeness-violation error for an atomic delete.
    pub fn incomplete_deletion(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::IncompleteDeletion, message)
    }

    /// Creates a retry-exhaustion error wrapping the last underlying
    /// failure.
    pub fn retries_exhausted(last: Error) -> Self {
        Self::new(ErrorKind::RetriesExhausted, "max retries exceeded").with_source(last)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}
