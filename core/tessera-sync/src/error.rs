//! Error types for the sync layer.

use tessera_model::ModelError;
use tessera_storage::StorageError;
use tessera_types::{ContentTypeId, ItemRef};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while saving an item or synchronizing its relations.
///
/// Everything raised after the edited item is persisted is recovered locally:
/// collected into a [`SyncReport`](crate::SyncReport), logged, and surfaced as
/// one notification. Only validation and the item's own save fail a save.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A content type could not be found.
    #[error("content type not found: {0}")]
    SchemaNotFound(ContentTypeId),

    /// A relation field named in the sync run does not exist.
    #[error("field `{field}` not found on content type `{content_type}`")]
    FieldNotFound {
        content_type: ContentTypeId,
        field: String,
    },

    /// A reverse field could not be created on the target content type.
    #[error("failed to create reverse field for `{field}` on `{target}`: {source}")]
    ReverseFieldCreationFailed {
        field: String,
        target: ContentTypeId,
        #[source]
        source: ReverseFieldFailure,
    },

    /// The item on the other side of a relation no longer exists.
    #[error("target item not found: {0}")]
    TargetItemNotFound(ItemRef),

    /// The item on the other side of a relation could not be written.
    #[error("failed to save target item {target}: {source}")]
    TargetItemSaveFailed {
        target: ItemRef,
        #[source]
        source: StorageError,
    },

    /// A link or unlink did not finish within the configured bound.
    #[error("updating {target} timed out after {after_ms} ms")]
    Timeout { target: ItemRef, after_ms: u64 },

    /// The edited item was rejected by its validator.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The edited item itself could not be persisted.
    #[error("failed to save item: {0}")]
    ItemSaveFailed(#[source] StorageError),

    /// The edited item does not belong to the session's content type.
    #[error("item belongs to `{actual}`, session edits `{expected}`")]
    ContentTypeMismatch {
        expected: ContentTypeId,
        actual: ContentTypeId,
    },

    /// Storage error outside the cases above.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Model invariant violated.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Why a reverse field could not be created.
#[derive(Debug, Error)]
pub enum ReverseFieldFailure {
    /// The relation field already records this reverse name, and an unrelated
    /// field on the target holds it.
    #[error("field name `{0}` is taken by an unrelated field")]
    NameTaken(String),

    /// Writing the source or target content type failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
