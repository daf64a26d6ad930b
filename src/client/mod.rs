//! The client facade: retry, batching, streaming, cancellation.

mod retry;
mod stream;

use std::fmt;
use std::sync::Arc;

pub use stream::{StopToken, StreamOutcome, UpdateKind, WatchParams};

use crate::config::RetryConfig;
use crate::error::{BatchCheckError, Error};
use crate::transport::{
    BulkCheckRequest, CheckItem, CheckPair, DeleteRequest, DeletionProgress, ExportRequest,
    Gateway, ReadRequest, SchemaResponse, WriteRequest,
};
use crate::types::{
    CheckBatch, Consistency, PreconditionedFilter, Relational, Relationship, RelationshipFilter,
    Revision, Transaction,
};

/// Relationships deleted per page by [`Client::delete`].
const DELETE_PAGE_SIZE: u32 = 10_000;

/// Client for a relationship-based authorization service.
///
/// Wraps a [`Gateway`] with the policy a well-behaved caller wants:
/// transient failures retried with backoff, bulk checks with partial
/// results preserved, paged deletes, and cancellable streaming.
///
/// Cloning is cheap; clones share the gateway.
///
/// ```rust
/// use relish::{Client, Consistency, MockGateway, Relationship, Transaction};
///
/// # tokio_test::block_on(async {
/// let client = Client::new(MockGateway::new());
/// let grant = Relationship::from_triple("document:readme", "viewer", "user:alice")?;
///
/// let written_at = client.write(Transaction::new().create(&grant)).await?;
///
/// // Read-after-write: pin the check to the write's revision.
/// let fresh = Consistency::AtLeastAsFresh(written_at);
/// assert!(client.check_one(&fresh, &grant).await?);
/// # Ok::<(), relish::Error>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct Client {
    gateway: Arc<dyn Gateway>,
    retry: RetryConfig,
}

impl Client {
    /// Creates a client over the given gateway with the default retry
    /// policy.
    pub fn new(gateway: impl Gateway + 'static) -> Self {
        Self {
            gateway: Arc::new(gateway),
            retry: RetryConfig::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Applies a transaction atomically, returning the revision it took
    /// effect at.
    ///
    /// Transient failures are retried per the retry policy.
    pub async fn write(&self, txn: Transaction) -> Result<Revision, Error> {
        let response = retry::with_retries(&self.retry, || {
            self.gateway.write_relationships(WriteRequest {
                mutations: txn.mutations().to_vec(),
                preconditions: txn.preconditions().to_vec(),
            })
        })
        .await?;

        Ok(response.written_at)
    }

    /// Answers a batch of permission questions, one boolean per item in
    /// request order.
    ///
    /// If an item fails, the booleans decoded before it survive in the
    /// returned [`BatchCheckError`].
    pub async fn check<I>(
        &self,
        consistency: &Consistency,
        items: I,
    ) -> Result<Vec<bool>, BatchCheckError>
    where
        I: IntoIterator,
        I::Item: Relational,
    {
        let items: Vec<CheckItem> = items
            .into_iter()
            .map(|item| CheckItem {
                relationship: item.relationship(),
            })
            .collect();
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let expected = items.len();

        let response = retry::with_retries(&self.retry, || {
            self.gateway.bulk_check_permission(BulkCheckRequest {
                consistency: consistency.clone(),
                items: items.clone(),
            })
        })
        .await?;

        let mut results = Vec::with_capacity(expected);
        for pair in response.pairs {
            match pair {
                CheckPair::Item(verdict) => results.push(verdict.allowed()),
                CheckPair::Error(message) => {
                    return Err(BatchCheckError::new(results, Error::item_failed(message)));
                }
            }
        }

        if results.len() != expected {
            return Err(BatchCheckError::new(
                results,
                Error::internal("check response item count mismatch"),
            ));
        }
        Ok(results)
    }

    /// Answers a prepared [`CheckBatch`].
    pub async fn check_batch(&self, batch: CheckBatch) -> Result<Vec<bool>, BatchCheckError> {
        let consistency = batch.consistency_strategy().clone();
        self.check(&consistency, batch.items().iter().cloned()).await
    }

    /// Answers a single permission question.
    pub async fn check_one(
        &self,
        consistency: &Consistency,
        item: impl Relational,
    ) -> Result<bool, Error> {
        let results = self
            .check(consistency, [item.relationship()])
            .await
            .map_err(BatchCheckError::into_error)?;
        Ok(results.first().copied().unwrap_or(false))
    }

    /// Returns `true` if at least one of the questions answers true.
    /// An empty batch answers `false`.
    pub async fn check_any<I>(&self, consistency: &Consistency, items: I) -> Result<bool, Error>
    where
        I: IntoIterator,
        I::Item: Relational,
    {
        let results = self
            .check(consistency, items)
            .await
            .map_err(BatchCheckError::into_error)?;
        Ok(results.into_iter().any(|allowed| allowed))
    }

    /// Returns `true` if every question answers true. An empty batch
    /// answers `true`.
    pub async fn check_all<I>(&self, consistency: &Consistency, items: I) -> Result<bool, Error>
    where
        I: IntoIterator,
        I::Item: Relational,
    {
        let results = self
            .check(consistency, items)
            .await
            .map_err(BatchCheckError::into_error)?;
        Ok(results.into_iter().all(|allowed| allowed))
    }

    /// Streams every relationship matching the filter into the handler.
    ///
    /// Stops early, with `Ok(StreamOutcome::Stopped)`, when the token is
    /// stopped. A handler error ends the stream and propagates.
    pub async fn for_each_relationship<F>(
        &self,
        consistency: &Consistency,
        filter: &RelationshipFilter,
        stop: &StopToken,
        handler: F,
    ) -> Result<StreamOutcome, Error>
    where
        F: FnMut(Relationship) -> Result<(), Error>,
    {
        if stop.is_stopped() {
            return Ok(StreamOutcome::Stopped);
        }

        let relationships = self
            .gateway
            .read_relationships(ReadRequest {
                consistency: consistency.clone(),
                filter: filter.clone(),
            })
            .await?;

        stream::drive(relationships, stop, handler).await
    }

    /// Deletes everything the filter matches, in one atomic call.
    ///
    /// Never retried: a retry after an ambiguous failure could observe
    /// (and silently accept) a half-applied delete. Fails with
    /// [`IncompleteDeletion`](crate::ErrorKind::IncompleteDeletion) if
    /// the service reports matches remaining.
    pub async fn delete_atomic(&self, target: &PreconditionedFilter) -> Result<Revision, Error> {
        let response = self
            .gateway
            .delete_relationships(DeleteRequest {
                filter: target.filter().clone(),
                preconditions: target.preconditions().to_vec(),
                limit: 0,
                allow_partial: false,
            })
            .await?;

        match response.progress {
            DeletionProgress::Complete => Ok(response.deleted_at),
            DeletionProgress::Partial => Err(Error::incomplete_deletion(
                "matches remained after atomic delete",
            )),
        }
    }

    /// Deletes everything the filter matches, page by page, until the
    /// service reports completion.
    ///
    /// Each page is retried per the retry policy. Preconditions are
    /// re-evaluated on every page.
    pub async fn delete(&self, target: &PreconditionedFilter) -> Result<(), Error> {
        let mut pages: u64 = 0;
        loop {
            let response = retry::with_retries(&self.retry, || {
                self.gateway.delete_relationships(DeleteRequest {
                    filter: target.filter().clone(),
                    preconditions: target.preconditions().to_vec(),
                    limit: DELETE_PAGE_SIZE,
                    allow_partial: true,
                })
            })
            .await?;

            pages += 1;
            match response.progress {
                DeletionProgress::Complete => {
                    tracing::debug!(pages, "paged delete complete");
                    return Ok(());
                }
                DeletionProgress::Partial => continue,
            }
        }
    }

    /// Streams change notifications into the handler until the token is
    /// stopped.
    ///
    /// A watch normally never completes on its own; expect
    /// `Ok(StreamOutcome::Stopped)` as the usual return.
    pub async fn for_each_update<F>(
        &self,
        params: WatchParams,
        stop: &StopToken,
        mut handler: F,
    ) -> Result<StreamOutcome, Error>
    where
        F: FnMut(UpdateKind, Relationship) -> Result<(), Error>,
    {
        if stop.is_stopped() {
            return Ok(StreamOutcome::Stopped);
        }

        let updates = self.gateway.watch(params.into_request()).await?;
        stream::drive(updates, stop, |update| {
            handler(UpdateKind::classify(update.operation), update.relationship)
        })
        .await
    }

    /// Streams every relationship at the given snapshot into the
    /// handler.
    pub async fn export_relationships<F>(
        &self,
        snapshot: Revision,
        stop: &StopToken,
        handler: F,
    ) -> Result<StreamOutcome, Error>
    where
        F: FnMut(Relationship) -> Result<(), Error>,
    {
        if stop.is_stopped() {
            return Ok(StreamOutcome::Stopped);
        }

        let relationships = self
            .gateway
            .bulk_export_relationships(ExportRequest { snapshot })
            .await?;

        stream::drive(relationships, stop, handler).await
    }

    /// Reads the current schema.
    pub async fn read_schema(&self) -> Result<SchemaResponse, Error> {
        self.gateway.read_schema().await
    }

    /// Replaces the schema, returning the revision it took effect at.
    pub async fn write_schema(&self, schema: &str) -> Result<Revision, Error> {
        self.gateway.write_schema(schema).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
