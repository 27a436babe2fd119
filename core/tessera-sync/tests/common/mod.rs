//! Shared fixtures for sync tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tessera_model::{ContentType, FieldDefinition, FieldValue, Item};
use tessera_storage::{RecordStore, SqliteStore, StorageError, StorageResult};
use tessera_sync::{Notifier, NotifyLevel, SchemaRegistry, SyncConfig, SyncOrchestrator};
use tessera_types::{ContentTypeId, ItemId, ItemRef};

pub fn ct(id: &str) -> ContentTypeId {
    ContentTypeId::parse(id).unwrap()
}

pub fn r(s: &str) -> ItemRef {
    ItemRef::parse(s).unwrap()
}

pub fn refs(list: &[&str]) -> Vec<ItemRef> {
    list.iter().map(|s| r(s)).collect()
}

/// `articles` (T1) with a multi-valued `authors` relation into `authors` (T2)
/// and a single-valued `category` relation into `categories`.
pub fn articles() -> ContentType {
    ContentType::new(ct("articles"), "Articles")
        .with_field(FieldDefinition::text("name"))
        .with_field(FieldDefinition::relation("authors", ct("authors")))
        .with_field(FieldDefinition::single_relation("category", ct("categories")))
}

pub fn authors() -> ContentType {
    ContentType::new(ct("authors"), "Authors").with_field(FieldDefinition::text("name"))
}

pub fn categories() -> ContentType {
    ContentType::new(ct("categories"), "Categories").with_field(FieldDefinition::text("name"))
}

pub fn item(reference: &str) -> Item {
    let r = r(reference);
    Item::new(r.content_type().clone(), r.item().clone())
}

pub fn article(id: &str, author_refs: &[&str]) -> Item {
    Item::new(ct("articles"), ItemId::parse(id).unwrap())
        .with("authors", FieldValue::RefSet(refs(author_refs)))
}

// ── Fault-injecting store ────────────────────────────────────────

/// SQLite store wrapper that can fail or stall chosen writes and records the
/// order of item saves.
#[derive(Default)]
pub struct Faults {
    pub failing_type_saves: HashSet<ContentTypeId>,
    pub failing_item_saves: HashSet<ItemRef>,
    pub hanging_item_loads: HashSet<ItemRef>,
    pub slow_item_saves: HashMap<ItemRef, Duration>,
}

pub struct FaultyStore {
    inner: SqliteStore,
    faults: Mutex<Faults>,
    item_saves: Mutex<Vec<ItemRef>>,
    type_saves: Mutex<Vec<ContentTypeId>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            faults: Mutex::new(Faults::default()),
            item_saves: Mutex::new(Vec::new()),
            type_saves: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_type_save(&self, id: &str) {
        self.faults.lock().unwrap().failing_type_saves.insert(ct(id));
    }

    pub fn fail_item_save(&self, reference: &str) {
        self.faults.lock().unwrap().failing_item_saves.insert(r(reference));
    }

    pub fn hang_item_load(&self, reference: &str) {
        self.faults.lock().unwrap().hanging_item_loads.insert(r(reference));
    }

    /// Delays a save on a detached task, the way a blocking-pool write keeps
    /// running after its caller stopped waiting.
    pub fn slow_item_save(&self, reference: &str, delay: Duration) {
        self.faults.lock().unwrap().slow_item_saves.insert(r(reference), delay);
    }

    pub fn clear_faults(&self) {
        *self.faults.lock().unwrap() = Faults::default();
    }

    /// Item saves in the order they were accepted.
    pub fn item_saves(&self) -> Vec<ItemRef> {
        self.item_saves.lock().unwrap().clone()
    }

    pub fn type_saves(&self) -> Vec<ContentTypeId> {
        self.type_saves.lock().unwrap().clone()
    }

    pub fn reset_log(&self) {
        self.item_saves.lock().unwrap().clear();
        self.type_saves.lock().unwrap().clear();
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn find_content_type(&self, id: &ContentTypeId) -> StorageResult<ContentType> {
        self.inner.find_content_type(id).await
    }

    async fn save_content_type(&self, content_type: &ContentType) -> StorageResult<()> {
        let fail = self
            .faults
            .lock()
            .unwrap()
            .failing_type_saves
            .contains(&content_type.id);
        if fail {
            return Err(StorageError::InvalidData(format!(
                "injected failure saving {}",
                content_type.id
            )));
        }
        self.inner.save_content_type(content_type).await?;
        self.type_saves.lock().unwrap().push(content_type.id.clone());
        Ok(())
    }

    async fn find_item(&self, content_type: &ContentTypeId, id: &ItemId) -> StorageResult<Item> {
        let key = ItemRef::new(content_type.clone(), id.clone());
        let hang = self.faults.lock().unwrap().hanging_item_loads.contains(&key);
        if hang {
            std::future::pending::<()>().await;
        }
        self.inner.find_item(content_type, id).await
    }

    async fn save_item(&self, item: &Item) -> StorageResult<()> {
        let key = item.item_ref();
        let fail = self.faults.lock().unwrap().failing_item_saves.contains(&key);
        if fail {
            return Err(StorageError::InvalidData(format!("injected failure saving {key}")));
        }
        let delay = self.faults.lock().unwrap().slow_item_saves.get(&key).copied();
        if let Some(delay) = delay {
            let inner = self.inner.clone();
            let item = item.clone();
            let write = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                inner.save_item(&item).await
            });
            write
                .await
                .map_err(|e| StorageError::Task(e.to_string()))??;
        } else {
            self.inner.save_item(item).await?;
        }
        self.item_saves.lock().unwrap().push(key);
        Ok(())
    }
}

// ── Notifications ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(NotifyLevel, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotifyLevel, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self, level: NotifyLevel) -> usize {
        self.messages().iter().filter(|(l, _)| *l == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

// ── Harness ──────────────────────────────────────────────────────

pub struct Harness {
    pub store: Arc<FaultyStore>,
    pub registry: Arc<SchemaRegistry>,
    pub notifier: Arc<RecordingNotifier>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = Arc::new(FaultyStore::new());
        let registry = Arc::new(SchemaRegistry::new(store.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&registry),
            store.clone(),
            notifier.clone(),
            config,
        ));
        Self {
            store,
            registry,
            notifier,
            orchestrator,
        }
    }

    /// Seeds the articles/authors/categories schema.
    pub async fn seed_schema(&self) {
        for t in [articles(), authors(), categories()] {
            self.store.save_content_type(&t).await.unwrap();
        }
        self.store.reset_log();
    }

    pub async fn seed_items(&self, items: &[Item]) {
        for i in items {
            self.store.save_item(i).await.unwrap();
        }
        self.store.reset_log();
    }

    pub async fn load(&self, reference: &str) -> Item {
        let r = r(reference);
        self.store.find_item(r.content_type(), r.item()).await.unwrap()
    }

    pub async fn content_type(&self, id: &str) -> ContentType {
        self.registry.resolve(&ct(id)).await.unwrap()
    }

    /// The stored content type, bypassing the registry cache.
    pub async fn stored_content_type(&self, id: &str) -> ContentType {
        self.store.find_content_type(&ct(id)).await.unwrap()
    }
}
