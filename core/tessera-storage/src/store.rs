//! The record-store seam the sync engine talks to.

use crate::StorageResult;
use async_trait::async_trait;
use tessera_model::{ContentType, Item};
use tessera_types::{ContentTypeId, ItemId};

/// A store of whole records addressed by type and id.
///
/// Each `save_*` is atomic for the one record it writes. Nothing is atomic
/// across records, so callers that touch several records must tolerate
/// partial completion.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Loads a content type. Missing types yield `StorageError::NotFound`.
    async fn find_content_type(&self, id: &ContentTypeId) -> StorageResult<ContentType>;

    /// Creates or replaces a content type.
    async fn save_content_type(&self, content_type: &ContentType) -> StorageResult<()>;

    /// Loads an item. Missing items yield `StorageError::NotFound`.
    async fn find_item(&self, content_type: &ContentTypeId, id: &ItemId) -> StorageResult<Item>;

    /// Creates or replaces an item.
    async fn save_item(&self, item: &Item) -> StorageResult<()>;
}
