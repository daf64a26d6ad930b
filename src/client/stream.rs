//! Streaming support: cancellation tokens and the stream drive loop.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;

use crate::error::Error;
use crate::transport::{WatchRequest, WireOperation};
use crate::types::{RelationshipFilter, Revision};

/// Cooperative cancellation handle for streaming operations.
///
/// Clone the token, hand one clone to a streaming call, and call
/// [`stop`](StopToken::stop) from anywhere else. The streaming call
/// winds down promptly and returns
/// [`StreamOutcome::Stopped`](StreamOutcome::Stopped); cancellation is
/// never an error.
///
/// Stopping is level-triggered and idempotent: a token stopped before
/// the call starts stops it immediately, and extra `stop` calls are
/// harmless.
#[derive(Debug, Clone)]
pub struct StopToken {
    inner: Arc<watch::Sender<bool>>,
}

impl Default for StopToken {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(tx),
        }
    }
}

impl StopToken {
    /// Creates a token in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every streaming call holding a clone of this token to
    /// stop.
    pub fn stop(&self) {
        self.inner.send_replace(true);
    }

    /// Returns `true` if [`stop`](StopToken::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        *self.inner.borrow()
    }

    /// Resolves once the token is stopped.
    pub(crate) async fn stopped(&self) {
        let mut rx = self.inner.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // The sender lives in self, so this arm is unreachable;
                // a token that can no longer change never stops.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// How a streaming call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The stream ran to its natural end.
    Completed,

    /// The stream was cancelled via its [`StopToken`].
    Stopped,
}

/// The kind of change a watch notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// A relationship was created.
    Create,

    /// A relationship was touched.
    Touch,

    /// A relationship was deleted.
    Delete,

    /// The service sent an operation this client does not recognize.
    Unknown,
}

impl UpdateKind {
    pub(crate) fn classify(operation: WireOperation) -> Self {
        match operation {
            WireOperation::Create => UpdateKind::Create,
            WireOperation::Touch => UpdateKind::Touch,
            WireOperation::Delete => UpdateKind::Delete,
            WireOperation::Unspecified => UpdateKind::Unknown,
        }
    }
}

/// What a watch subscribes to.
///
/// ```rust
/// use relish::{RelationshipFilter, WatchParams};
///
/// let params = WatchParams::new()
///     .object_type("document")
///     .filter(RelationshipFilter::new("document").relation("viewer"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WatchParams {
    object_types: Vec<String>,
    filters: Vec<RelationshipFilter>,
    from_revision: Option<Revision>,
}

impl WatchParams {
    /// Creates params watching everything from the present.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object type to watch.
    #[must_use]
    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_types.push(object_type.into());
        self
    }

    /// Adds a filter narrowing the watched set.
    #[must_use]
    pub fn filter(mut self, filter: RelationshipFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Resumes the watch from a past revision instead of the present.
    #[must_use]
    pub fn from_revision(mut self, revision: Revision) -> Self {
        self.from_revision = Some(revision);
        self
    }

    pub(crate) fn into_request(self) -> WatchRequest {
        WatchRequest {
            object_types: self.object_types,
            filters: self.filters,
            start_revision: self.from_revision,
        }
    }
}

/// Pulls items from the stream into the handler until the stream ends,
/// the handler fails, or the token stops.
///
/// Cancellation wins races against ready items.
pub(crate) async fn drive<S, T, F>(
    mut stream: S,
    stop: &StopToken,
    mut handler: F,
) -> Result<StreamOutcome, Error>
where
    S: Stream<Item = Result<T, Error>> + Unpin,
    F: FnMut(T) -> Result<(), Error>,
{
    loop {
        tokio::select! {
            biased;
            _ = stop.stopped() => return Ok(StreamOutcome::Stopped),
            next = stream.next() => match next {
                Some(Ok(item)) => handler(item)?,
                Some(Err(error)) => return Err(error),
                None => return Ok(StreamOutcome::Completed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::stream;

    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_drive_to_completion() {
        let items = stream::iter(vec![Ok(1), Ok(2), Ok(3)]);
        let mut seen = Vec::new();

        let outcome = drive(items, &StopToken::new(), |item| {
            seen.push(item);
            Ok(())
        })
        .await
        .expect("drive");

        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pre_stopped_token_stops_immediately() {
        let stop = StopToken::new();
        stop.stop();
        assert!(stop.is_stopped());

        // An endless stream; only the token can end this.
        let items = stream::iter(vec![Ok(1)]).chain(stream::pending());
        let outcome = drive(items, &stop, |_: i32| Ok(())).await.expect("drive");
        assert_eq!(outcome, StreamOutcome::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_mid_stream() {
        let stop = StopToken::new();
        let stopper = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.stop();
        });

        let items = stream::iter(vec![Ok(1), Ok(2)]).chain(stream::pending());
        let mut seen = Vec::new();
        let outcome = drive(items, &stop, |item: i32| {
            seen.push(item);
            Ok(())
        })
        .await
        .expect("drive");

        assert_eq!(outcome, StreamOutcome::Stopped);
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let items = stream::iter(vec![Ok(1), Ok(2)]);
        let err = drive(items, &StopToken::new(), |_| {
            Err(Error::internal("handler refused"))
        })
        .await
        .expect_err("handler error");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let items = stream::iter(vec![Ok(1), Err(Error::unavailable("cut off"))]);
        let mut seen = Vec::new();
        let err = drive(items, &StopToken::new(), |item: i32| {
            seen.push(item);
            Ok(())
        })
        .await
        .expect_err("stream error");

        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(UpdateKind::classify(WireOperation::Create), UpdateKind::Create);
        assert_eq!(UpdateKind::classify(WireOperation::Touch), UpdateKind::Touch);
        assert_eq!(UpdateKind::classify(WireOperation::Delete), UpdateKind::Delete);
        assert_eq!(
            UpdateKind::classify(WireOperation::Unspecified),
            UpdateKind::Unknown
        );
    }

    #[test]
    fn test_watch_params_build_request() {
        let request = WatchParams::new()
            .object_type("document")
            .object_type("folder")
            .from_revision(Revision::new("r9"))
            .into_request();

        assert_eq!(request.object_types, vec!["document", "folder"]);
        assert_eq!(request.start_revision, Some(Revision::new("r9")));
    }
}
