//! Edit sessions - the item-save workflow and its relation baseline.

use crate::config::BaselinePolicy;
use crate::error::{SyncError, SyncResult};
use crate::notify::NotifyLevel;
use crate::orchestrator::{SyncOrchestrator, SyncReport};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tessera_model::{ContentType, Item, ItemValidator};
use tessera_types::{ContentTypeId, ItemRef};
use tracing::{error, info};

/// Relation field values as they were when editing began (or at the last
/// baseline advance). The "before" side of every relation diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    baselines: BTreeMap<String, Vec<ItemRef>>,
}

impl SessionSnapshot {
    /// A snapshot with no references, used for items never saved before.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Captures the value of every relation field of `item`.
    pub fn capture(content_type: &ContentType, item: &Item) -> Self {
        let baselines = content_type
            .relation_fields()
            .map(|f| (f.name.clone(), item.relation_refs(&f.name).to_vec()))
            .collect();
        Self { baselines }
    }

    /// Baseline references of a field; empty when the field was not captured.
    pub fn baseline(&self, field: &str) -> &[ItemRef] {
        self.baselines.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.baselines.keys().map(String::as_str)
    }
}

/// Result of a successful [`EditSession::save`].
#[derive(Debug)]
pub struct SaveOutcome {
    pub item: Item,
    pub report: SyncReport,
    /// Whether the session baseline now reflects `item`.
    pub baseline_advanced: bool,
}

/// One author editing one item.
///
/// Save order: validate, persist the item, synchronize relations, advance the
/// baseline. Synchronization problems never fail the save.
pub struct EditSession {
    orchestrator: Arc<SyncOrchestrator>,
    content_type: ContentTypeId,
    snapshot: SessionSnapshot,
}

impl EditSession {
    /// Starts editing a brand-new item of `content_type`.
    pub fn create(orchestrator: Arc<SyncOrchestrator>, content_type: ContentTypeId) -> Self {
        Self {
            orchestrator,
            content_type,
            snapshot: SessionSnapshot::empty(),
        }
    }

    /// Starts editing an existing item, capturing its relation baseline.
    pub fn open(orchestrator: Arc<SyncOrchestrator>, content_type: &ContentType, item: &Item) -> Self {
        Self {
            orchestrator,
            content_type: content_type.id.clone(),
            snapshot: SessionSnapshot::capture(content_type, item),
        }
    }

    pub fn content_type(&self) -> &ContentTypeId {
        &self.content_type
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// Whether any relation field of `item` differs from the baseline.
    /// Order within a field does not count as a change.
    pub fn is_dirty(&self, content_type: &ContentType, item: &Item) -> bool {
        content_type.relation_fields().any(|f| {
            let baseline: HashSet<&ItemRef> = self.snapshot.baseline(&f.name).iter().collect();
            let current: HashSet<&ItemRef> = item.relation_refs(&f.name).iter().collect();
            baseline != current
        })
    }

    /// Validates and persists `item`, then synchronizes its relations.
    pub async fn save(&mut self, item: Item, validator: &dyn ItemValidator) -> SyncResult<SaveOutcome> {
        let notifier = Arc::clone(self.orchestrator.notifier());

        if item.content_type != self.content_type {
            return Err(SyncError::ContentTypeMismatch {
                expected: self.content_type.clone(),
                actual: item.content_type.clone(),
            });
        }

        let content_type = self.orchestrator.registry().resolve(&self.content_type).await?;

        if let Err(message) = validator.validate(&content_type, &item) {
            notifier.notify(NotifyLevel::Danger, "Didn't save. Errors in form.");
            return Err(SyncError::ValidationFailed(message));
        }

        if let Err(e) = self.orchestrator.store().save_item(&item).await {
            error!("Failed to save {}: {}", item.item_ref(), e);
            notifier.notify(NotifyLevel::Danger, "There was an error while saving.");
            return Err(SyncError::ItemSaveFailed(e));
        }

        let report = self
            .orchestrator
            .synchronize(&item, &content_type, &self.snapshot)
            .await;

        let baseline_advanced = match self.orchestrator.config().baseline_policy {
            BaselinePolicy::AfterSave => true,
            BaselinePolicy::AfterCleanSync => report.is_clean(),
        };
        if baseline_advanced {
            self.snapshot = SessionSnapshot::capture(&content_type, &item);
        } else {
            info!("Keeping relation baseline for {} after failed sync", item.item_ref());
        }

        notifier.notify(NotifyLevel::Success, "Saved.");
        Ok(SaveOutcome {
            item,
            report,
            baseline_advanced,
        })
    }
}
