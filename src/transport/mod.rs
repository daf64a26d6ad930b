//! Transport seam between client policy and the wire.

mod mock;
mod traits;

pub use mock::MockGateway;
pub use traits::{
    BulkCheckRequest, BulkCheckResponse, CheckItem, CheckPair, DeleteRequest, DeleteResponse,
    DeletionProgress, ExportRequest, Gateway, Permissionship, ReadRequest, RelationshipStream,
    SchemaResponse, WatchRequest, WatchStream, WatchUpdate, WireOperation, WriteRequest,
    WriteResponse,
};
