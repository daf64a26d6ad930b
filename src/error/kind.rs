//! Error kind enumeration for categorizing client errors.

/// Categorization of client errors.
///
/// This enum provides a stable interface for matching on error types,
/// enabling different handling strategies for different failure modes.
///
/// ## Retriable vs Non-Retriable
///
/// | ErrorKind            | Retriable | Action                         |
/// |----------------------|-----------|--------------------------------|
/// | `Unavailable`        | Yes       | Retry with backoff             |
/// | `Timeout`            | Yes       | Retry with backoff             |
/// | `Conflict`           | Yes       | Retry with backoff             |
/// | `InvalidResource`    | No        | Fix the triple string          |
/// | `InvalidRelation`    | No        | Fix the triple string          |
/// | `InvalidSubject`     | No        | Fix the triple string          |
/// | `AlreadyExists`      | No        | Use a touch instead of create  |
/// | `PreconditionFailed` | No        | Re-read and rebuild            |
/// | `ItemFailed`         | No        | Inspect the failing item       |
/// | `IncompleteDeletion` | No        | Delete in batches instead      |
/// | `RetriesExhausted`   | No        | Inspect `source()`             |
/// | `Internal`           | No        | May indicate a server bug      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The resource half of a triple string is malformed (missing `:`).
    ///
    /// **Not retriable.** Detected before any network call.
    #[error("invalid resource")]
    InvalidResource,

    /// The resource half of a triple string carries no relation
    /// (missing or empty `#relation` segment).
    ///
    /// **Not retriable.** Detected before any network call.
    #[error("invalid relation")]
    InvalidRelation,

    /// The subject half of a triple string is malformed (missing `:`).
    ///
    /// **Not retriable.** Detected before any network call.
    #[error("invalid subject")]
    InvalidSubject,

    /// A `create` mutation targeted a relationship that already exists.
    ///
    /// gRPC: ALREADY_EXISTS
    ///
    /// **Not retriable.** Use a `touch` mutation for upsert semantics.
    #[error("relationship already exists")]
    AlreadyExists,

    /// A transaction or delete precondition did not hold; no mutation was
    /// applied.
    ///
    /// gRPC: FAILED_PRECONDITION
    ///
    /// **Not retriable** without re-reading the current state.
    #[error("precondition failed")]
    PreconditionFailed,

    /// Service temporarily unavailable.
    ///
    /// gRPC: UNAVAILABLE
    ///
    /// **Retriable.** Retry with exponential backoff.
    #[error("service unavailable")]
    Unavailable,

    /// The request or a single attempt deadline elapsed.
    ///
    /// gRPC: DEADLINE_EXCEEDED
    ///
    /// **Retriable.** Retry with exponential backoff.
    #[error("deadline exceeded")]
    Timeout,

    /// A transient serialization conflict on the server side.
    ///
    /// Some server versions report these only through the error message;
    /// the retry policy additionally matches the known marker strings.
    ///
    /// **Retriable.** Retry with exponential backoff.
    #[error("transient conflict")]
    Conflict,

    /// A single item within a bulk check reported its own failure.
    ///
    /// Interpretation of the batch stops at the failing item; results
    /// decoded before it are preserved (see
    /// [`BatchCheckError`](crate::BatchCheckError)).
    #[error("bulk check item failed")]
    ItemFailed,

    /// A delete that disallows partial deletion reported incomplete
    /// progress.
    ///
    /// **Always terminal.** Use [`Client::delete`](crate::Client::delete)
    /// for batched deletion of large sets.
    #[error("deletion incomplete")]
    IncompleteDeletion,

    /// The retry budget was exhausted without a successful attempt.
    ///
    /// The last underlying failure is attached as the error's `source()`.
    #[error("max retries exceeded")]
    RetriesExhausted,

    /// Internal server error.
    ///
    /// **Not retriable** by default. May indicate a bug on the server.
    #[error("internal error")]
    Internal,

    /// Unknown or unexpected error.
    ///
    /// Used as a catch-all for unrecognized remote failures.
    #[error("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Returns `true` if errors of this kind are generally safe to retry.
    ///
    /// The retry policy also considers transient-conflict marker strings in
    /// the message, so a `false` here does not always mean terminal.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Unavailable | ErrorKind::Timeout | ErrorKind::Conflict
        )
    }

    /// Returns `true` if this kind is produced by local triple validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidResource | ErrorKind::InvalidRelation | ErrorKind::InvalidSubject
        )
    }
}
