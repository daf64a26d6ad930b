//! In-memory gateway for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use parking_lot::RwLock;

use super::traits::{
    BulkCheckRequest, BulkCheckResponse, CheckPair, DeleteRequest, DeleteResponse,
    DeletionProgress, ExportRequest, Gateway, Permissionship, ReadRequest, RelationshipStream,
    SchemaResponse, WatchRequest, WatchStream, WatchUpdate, WriteRequest, WriteResponse,
};
use crate::error::Error;
use crate::types::{
    MutationOperation, Precondition, PreconditionOperation, Relationship, Revision,
};

/// An in-memory [`Gateway`] holding relationships in a plain vector.
///
/// Behaves like a single-node service: writes apply mutations against the
/// store, checks answer by exact-triple lookup, reads and exports stream
/// the store's contents. On top of that, tests can script behavior:
///
/// - [`push_failure`](MockGateway::push_failure) queues errors; each
///   queued error fails the next call, whatever it is. This drives retry
///   tests.
/// - [`script_check_response`](MockGateway::script_check_response) and
///   [`script_delete_progress`](MockGateway::script_delete_progress)
///   queue canned responses that bypass the store.
/// - [`script_watch_update`](MockGateway::script_watch_update) queues the
///   notifications a watch stream will yield;
///   [`hold_watch_open`](MockGateway::hold_watch_open) keeps the stream
///   pending afterwards, as a live watch would.
///
/// Every call bumps [`request_count`](MockGateway::request_count).
#[derive(Default)]
pub struct MockGateway {
    store: RwLock<Vec<Relationship>>,
    schema: RwLock<String>,
    failures: RwLock<VecDeque<Error>>,
    check_responses: RwLock<VecDeque<Vec<CheckPair>>>,
    delete_progress: RwLock<VecDeque<DeletionProgress>>,
    watch_updates: RwLock<Vec<WatchUpdate>>,
    hold_watch_open: RwLock<bool>,
    request_count: AtomicU64,
    revision_counter: AtomicU64,
}

impl MockGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway seeded with relationships.
    pub fn with_relationships(relationships: impl IntoIterator<Item = Relationship>) -> Self {
        let gateway = Self::new();
        *gateway.store.write() = relationships.into_iter().collect();
        gateway
    }

    /// Queues an error; the next call fails with it.
    pub fn push_failure(&self, error: Error) {
        self.failures.write().push_back(error);
    }

    /// Queues a canned bulk-check response.
    pub fn script_check_response(&self, pairs: Vec<CheckPair>) {
        self.check_responses.write().push_back(pairs);
    }

    /// Queues a canned delete progress; the store is left untouched for
    /// that call.
    pub fn script_delete_progress(&self, progress: DeletionProgress) {
        self.delete_progress.write().push_back(progress);
    }

    /// Queues a notification for the next watch stream.
    pub fn script_watch_update(&self, update: WatchUpdate) {
        self.watch_updates.write().push(update);
    }

    /// Keeps watch streams pending after their scripted updates instead
    /// of ending them.
    pub fn hold_watch_open(&self) {
        *self.hold_watch_open.write() = true;
    }

    /// Returns how many calls this gateway has served, including failed
    /// ones.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of the stored relationships.
    pub fn relationships(&self) -> Vec<Relationship> {
        self.store.read().clone()
    }

    fn begin_call(&self) -> Result<(), Error> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        match self.failures.write().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_revision(&self) -> Revision {
        let n = self.revision_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Revision::new(format!("rev-{n}"))
    }

    fn check_preconditions(
        store: &[Relationship],
        preconditions: &[Precondition],
    ) -> Result<(), Error> {
        for precondition in preconditions {
            let any = store.iter().any(|rel| precondition.filter.matches(rel));
            match precondition.operation {
                PreconditionOperation::MustMatch if !any => {
                    return Err(Error::precondition_failed("required match not found"));
                }
                PreconditionOperation::MustNotMatch if any => {
                    return Err(Error::precondition_failed("forbidden match found"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn same_triple(a: &Relationship, b: &Relationship) -> bool {
        a.resource_type() == b.resource_type()
            && a.resource_id() == b.resource_id()
            && a.resource_relation() == b.resource_relation()
            && a.subject_type() == b.subject_type()
            && a.subject_id() == b.subject_id()
            && a.subject_relation() == b.subject_relation()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn write_relationships(&self, request: WriteRequest) -> Result<WriteResponse, Error> {
        self.begin_call()?;

        let mut store = self.store.write();
        Self::check_preconditions(&store, &request.preconditions)?;

        // Atomic: validate creates before applying anything.
        for mutation in &request.mutations {
            if mutation.operation == MutationOperation::Create
                && store
                    .iter()
                    .any(|rel| Self::same_triple(rel, &mutation.relationship))
            {
                return Err(Error::already_exists(mutation.relationship.to_string()));
            }
        }

        for mutation in &request.mutations {
            match mutation.operation {
                MutationOperation::Create => store.push(mutation.relationship.clone()),
                MutationOperation::Touch => {
                    store.retain(|rel| !Self::same_triple(rel, &mutation.relationship));
                    store.push(mutation.relationship.clone());
                }
                MutationOperation::Delete => {
                    store.retain(|rel| !Self::same_triple(rel, &mutation.relationship));
                }
            }
        }

        Ok(WriteResponse {
            written_at: self.next_revision(),
        })
    }

    async fn bulk_check_permission(
        &self,
        request: BulkCheckRequest,
    ) -> Result<BulkCheckResponse, Error> {
        self.begin_call()?;

        if let Some(pairs) = self.check_responses.write().pop_front() {
            return Ok(BulkCheckResponse { pairs });
        }

        let store = self.store.read();
        let pairs = request
            .items
            .iter()
            .map(|item| {
                let held = store
                    .iter()
                    .any(|rel| Self::same_triple(rel, &item.relationship));
                CheckPair::Item(if held {
                    Permissionship::HasPermission
                } else {
                    Permissionship::NoPermission
                })
            })
            .collect();

        Ok(BulkCheckResponse { pairs })
    }

    async fn read_relationships(&self, request: ReadRequest) -> Result<RelationshipStream, Error> {
        self.begin_call()?;

        let matching: Vec<_> = self
            .store
            .read()
            .iter()
            .filter(|rel| request.filter.matches(rel))
            .cloned()
            .map(Ok)
            .collect();

        Ok(stream::iter(matching).boxed())
    }

    async fn delete_relationships(&self, request: DeleteRequest) -> Result<DeleteResponse, Error> {
        self.begin_call()?;

        if let Some(progress) = self.delete_progress.write().pop_front() {
            return Ok(DeleteResponse {
                deleted_at: self.next_revision(),
                progress,
            });
        }

        let mut store = self.store.write();
        Self::check_preconditions(&store, &request.preconditions)?;

        let matching: Vec<usize> = store
            .iter()
            .enumerate()
            .filter(|(_, rel)| request.filter.matches(rel))
            .map(|(i, _)| i)
            .collect();

        let limit = if request.limit == 0 {
            matching.len()
        } else {
            request.limit as usize
        };
        let progress = if matching.len() > limit {
            DeletionProgress::Partial
        } else {
            DeletionProgress::Complete
        };

        for index in matching.into_iter().take(limit).rev() {
            store.remove(index);
        }

        Ok(DeleteResponse {
            deleted_at: self.next_revision(),
            progress,
        })
    }

    async fn watch(&self, request: WatchRequest) -> Result<WatchStream, Error> {
        self.begin_call()?;

        // Empty object types or filters mean no constraint.
        let updates: Vec<_> = self
            .watch_updates
            .read()
            .iter()
            .filter(|update| {
                request.object_types.is_empty()
                    || request
                        .object_types
                        .iter()
                        .any(|t| t == update.relationship.resource_type())
            })
            .filter(|update| {
                request.filters.is_empty()
                    || request
                        .filters
                        .iter()
                        .any(|filter| filter.matches(&update.relationship))
            })
            .cloned()
            .map(Ok)
            .collect();
        let scripted = stream::iter(updates);

        if *self.hold_watch_open.read() {
            Ok(scripted.chain(stream::pending()).boxed())
        } else {
            Ok(scripted.boxed())
        }
    }

    async fn bulk_export_relationships(
        &self,
        _request: ExportRequest,
    ) -> Result<RelationshipStream, Error> {
        self.begin_call()?;

        let all: Vec<_> = self.store.read().iter().cloned().map(Ok).collect();
        Ok(stream::iter(all).boxed())
    }

    async fn read_schema(&self) -> Result<SchemaResponse, Error> {
        self.begin_call()?;

        Ok(SchemaResponse {
            schema: self.schema.read().clone(),
            read_at: self.next_revision(),
        })
    }

    async fn write_schema(&self, schema: &str) -> Result<Revision, Error> {
        self.begin_call()?;

        *self.schema.write() = schema.to_owned();
        Ok(self.next_revision())
    }
}
