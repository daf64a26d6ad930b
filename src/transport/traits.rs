//! Gateway trait and the wire-level request/response types.
//!
//! The [`Gateway`] is the seam between the client's policy layer (retry,
//! batching, streaming, cancellation) and whatever actually carries the
//! calls. Production deployments implement it over their RPC stack; tests
//! use the in-memory [`MockGateway`](super::MockGateway).

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Error;
use crate::types::{
    Consistency, Mutation, Precondition, Relationship, RelationshipFilter, Revision,
};

/// A stream of relationships, as produced by reads and exports.
pub type RelationshipStream = Pin<Box<dyn Stream<Item = Result<Relationship, Error>> + Send>>;

/// A stream of change notifications, as produced by watch.
pub type WatchStream = Pin<Box<dyn Stream<Item = Result<WatchUpdate, Error>> + Send>>;

/// Request to apply a batch of mutations atomically.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    /// Mutations, in application order.
    pub mutations: Vec<Mutation>,

    /// Guards evaluated atomically with the mutations.
    pub preconditions: Vec<Precondition>,
}

/// Response to a successful write.
#[derive(Debug, Clone)]
pub struct WriteResponse {
    /// Revision at which the mutations took effect.
    pub written_at: Revision,
}

/// One question in a bulk permission check.
#[derive(Debug, Clone)]
pub struct CheckItem {
    /// The question, phrased as a relationship whose relation is the
    /// permission being asked about.
    pub relationship: Relationship,
}

/// Request to answer a batch of permission questions.
#[derive(Debug, Clone)]
pub struct BulkCheckRequest {
    /// Freshness the whole batch is answered at.
    pub consistency: Consistency,

    /// Questions, in request order.
    pub items: Vec<CheckItem>,
}

/// The service's verdict on one permission question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissionship {
    /// The service did not state a verdict.
    Unspecified,

    /// The subject does not hold the permission.
    NoPermission,

    /// The subject holds the permission.
    HasPermission,

    /// The subject holds the permission only if caveat context not
    /// supplied with the check evaluates true.
    ConditionalPermission,
}

impl Permissionship {
    /// Collapses the verdict to a boolean. Only an unconditional
    /// [`HasPermission`](Permissionship::HasPermission) counts as allowed.
    #[inline]
    pub fn allowed(self) -> bool {
        matches!(self, Permissionship::HasPermission)
    }
}

/// One answer in a bulk check response. Items fail individually.
#[derive(Debug, Clone)]
pub enum CheckPair {
    /// The item was answered.
    Item(Permissionship),

    /// The item failed; the rest of the batch may still have answers.
    Error(String),
}

/// Response to a bulk permission check, one pair per request item.
#[derive(Debug, Clone)]
pub struct BulkCheckResponse {
    /// Answers in request order.
    pub pairs: Vec<CheckPair>,
}

/// Request to stream relationships matching a filter.
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Freshness of the snapshot being read.
    pub consistency: Consistency,

    /// What to read.
    pub filter: RelationshipFilter,
}

/// Request to delete relationships matching a filter.
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    /// What to delete.
    pub filter: RelationshipFilter,

    /// Guards evaluated atomically with the delete.
    pub preconditions: Vec<Precondition>,

    /// Upper bound on relationships deleted in this call; zero means
    /// no bound.
    pub limit: u32,

    /// Whether deleting only some of the matches is acceptable.
    pub allow_partial: bool,
}

/// Whether a delete removed everything the filter matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionProgress {
    /// Every match was deleted.
    Complete,

    /// The limit was hit with matches remaining.
    Partial,
}

/// Response to a delete.
#[derive(Debug, Clone)]
pub struct DeleteResponse {
    /// Revision at which the delete took effect.
    pub deleted_at: Revision,

    /// Whether matches remain.
    pub progress: DeletionProgress,
}

/// Request to stream changes to watched object types.
#[derive(Debug, Clone, Default)]
pub struct WatchRequest {
    /// Object types to watch; empty watches everything.
    pub object_types: Vec<String>,

    /// Additional filters narrowing the watched set.
    pub filters: Vec<RelationshipFilter>,

    /// Resume point; `None` starts from the present.
    pub start_revision: Option<Revision>,
}

/// The kind of change a watch update reports, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireOperation {
    /// The service did not state the operation.
    Unspecified,

    /// A relationship was created.
    Create,

    /// A relationship was touched.
    Touch,

    /// A relationship was deleted.
    Delete,
}

/// One change notification from a watch stream.
#[derive(Debug, Clone)]
pub struct WatchUpdate {
    /// What happened.
    pub operation: WireOperation,

    /// The relationship it happened to.
    pub relationship: Relationship,
}

/// Request to export every relationship at a snapshot.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// The snapshot to export.
    pub snapshot: Revision,
}

/// Response to a schema read.
#[derive(Debug, Clone)]
pub struct SchemaResponse {
    /// The schema text.
    pub schema: String,

    /// Revision the schema was read at.
    pub read_at: Revision,
}

/// Transport seam carrying client calls to the authorization service.
///
/// Implementations translate these requests to their wire protocol. They
/// must not retry: retry policy belongs to the [`Client`](crate::Client)
/// on top.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Applies a batch of mutations atomically.
    async fn write_relationships(&self, request: WriteRequest) -> Result<WriteResponse, Error>;

    /// Answers a batch of permission questions.
    async fn bulk_check_permission(
        &self,
        request: BulkCheckRequest,
    ) -> Result<BulkCheckResponse, Error>;

    /// Streams the relationships matching a filter.
    async fn read_relationships(&self, request: ReadRequest) -> Result<RelationshipStream, Error>;

    /// Deletes the relationships matching a filter.
    async fn delete_relationships(&self, request: DeleteRequest) -> Result<DeleteResponse, Error>;

    /// Streams change notifications for the watched object types.
    async fn watch(&self, request: WatchRequest) -> Result<WatchStream, Error>;

    /// Streams every relationship at a snapshot.
    async fn bulk_export_relationships(
        &self,
        request: ExportRequest,
    ) -> Result<RelationshipStream, Error>;

    /// Reads the current schema.
    async fn read_schema(&self) -> Result<SchemaResponse, Error>;

    /// Replaces the schema, returning the revision it took effect at.
    async fn write_schema(&self, schema: &str) -> Result<Revision, Error>;
}
