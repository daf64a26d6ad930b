//! Error type for bulk checks that fail partway through.

use std::error::Error as StdError;
use std::fmt;

use super::Error;

/// A bulk permission check that failed on one of its items.
///
/// The service answers a bulk check with one result per item, in request
/// order. If an item reports its own failure, interpretation of the batch
/// stops there: the booleans decoded *before* the failing item are
/// preserved in [`partial`](BatchCheckError::partial) and the item's error
/// in [`error`](BatchCheckError::error).
///
/// A failure of the whole call (transport error, retry exhaustion) is
/// represented the same way with an empty `partial`.
///
/// ## Example
///
/// ```rust,ignore
/// match client.check(&consistency, relationships).await {
///     Ok(results) => { /* one boolean per item */ }
///     Err(failure) => {
///         eprintln!(
///             "{} of the items answered before: {:?}",
///             failure.partial.len(),
///             failure.partial,
///         );
///         return Err(failure.into_error());
///     }
/// }
/// ```
#[derive(Debug)]
pub struct BatchCheckError {
    /// Booleans decoded before the failing item, in request order.
    pub partial: Vec<bool>,

    /// The failure that stopped interpretation.
    pub error: Error,
}

impl BatchCheckError {
    /// Creates a batch failure with the results gathered so far.
    pub fn new(partial: Vec<bool>, error: Error) -> Self {
        Self { partial, error }
    }

    /// Discards the partial results and returns the underlying error.
    pub fn into_error(self) -> Error {
        self.error
    }
}

impl fmt::Display for BatchCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bulk check failed after {} result(s): {}",
            self.partial.len(),
            self.error
        )
    }
}

impl StdError for BatchCheckError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

impl From<Error> for BatchCheckError {
    fn from(error: Error) -> Self {
        Self {
            partial: Vec::new(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_partial_results_preserved() {
        let failure = BatchCheckError::new(vec![true, false], Error::item_failed("boom"));
        assert_eq!(failure.partial, vec![true, false]);
        assert_eq!(failure.error.kind(), ErrorKind::ItemFailed);
    }

    #[test]
    fn test_from_whole_call_error() {
        let failure: BatchCheckError = Error::unavailable("down").into();
        assert!(failure.partial.is_empty());
        assert_eq!(failure.error.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_display_and_source() {
        let failure = BatchCheckError::new(vec![true], Error::item_failed("bad item"));
        let display = failure.to_string();
        assert!(display.contains("after 1 result(s)"));
        assert!(display.contains("bad item"));
        assert!(StdError::source(&failure).is_some());
    }

    #[test]
    fn test_into_error() {
        let failure = BatchCheckError::new(vec![true, true], Error::item_failed("x"));
        assert_eq!(failure.into_error().kind(), ErrorKind::ItemFailed);
    }
}
