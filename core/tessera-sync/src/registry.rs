//! Schema registry - content type lookup with an in-process cache.

use crate::error::{SyncError, SyncResult};
use std::collections::HashMap;
use std::sync::Arc;
use tessera_model::{ContentType, FieldDefinition};
use tessera_storage::{RecordStore, StorageResult};
use tessera_types::ContentTypeId;
use tokio::sync::RwLock;
use tracing::debug;

/// Resolves content type ids to their definitions.
///
/// An explicitly owned instance (per process or per request) rather than
/// ambient state. Writes go through [`persist`](Self::persist) and are visible
/// to every later `resolve` on the same instance. Nothing serializes
/// concurrent writers of the same content type across saves.
pub struct SchemaRegistry {
    store: Arc<dyn RecordStore>,
    cache: RwLock<HashMap<ContentTypeId, ContentType>>,
}

impl SchemaRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a copy of the content type, loading it on first use.
    pub async fn resolve(&self, id: &ContentTypeId) -> SyncResult<ContentType> {
        if let Some(ct) = self.cache.read().await.get(id) {
            return Ok(ct.clone());
        }

        match self.store.find_content_type(id).await {
            Ok(ct) => {
                debug!("Loaded content type {} into registry", id);
                self.cache.write().await.insert(id.clone(), ct.clone());
                Ok(ct)
            }
            Err(e) if e.is_not_found() => Err(SyncError::SchemaNotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up a field by name.
    pub fn field_by_name<'a>(content_type: &'a ContentType, name: &str) -> Option<&'a FieldDefinition> {
        content_type.field(name)
    }

    /// Writes the content type to the store, then to the cache.
    /// On failure the cache keeps its previous copy.
    pub async fn persist(&self, content_type: &ContentType) -> StorageResult<()> {
        self.store.save_content_type(content_type).await?;
        self.cache
            .write()
            .await
            .insert(content_type.id.clone(), content_type.clone());
        Ok(())
    }

    /// Drops a cached copy so the next `resolve` reloads it from the store.
    pub async fn evict(&self, id: &ContentTypeId) {
        self.cache.write().await.remove(id);
    }
}
