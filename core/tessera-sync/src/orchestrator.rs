//! Synchronization orchestrator - restores forward/reverse relation
//! consistency after an item save.
//!
//! Runs strictly sequentially: one relation field after another, all removals
//! of a field before any of its additions, one target at a time. A reference
//! may be removed from one target and added to the same target within one
//! field, so the phases must not interleave.

use crate::applicator::{LinkApplier, LinkOp};
use crate::config::SyncConfig;
use crate::diff::{diff, RelationDiff};
use crate::error::SyncError;
use crate::notify::{Notifier, NotifyLevel};
use crate::registry::SchemaRegistry;
use crate::resolver::ReverseFieldResolver;
use crate::session::SessionSnapshot;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tessera_model::{ContentType, FieldDefinition, Item};
use tessera_storage::RecordStore;
use tessera_types::{ContentTypeId, ItemRef};
use tracing::{debug, error, info, warn};

/// Where a field's synchronization is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Start,
    DiffComputed,
    ReverseFieldResolving,
    ReverseFieldReady,
    /// Reverse field resolution failed; no target was touched.
    Aborted,
    ApplyingRemovals,
    ApplyingAdditions,
    /// All targets were attempted. Individual failures are in the report.
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of synchronizing one relation field.
#[derive(Debug)]
pub struct FieldReport {
    pub field: String,
    pub phase: SyncPhase,
    pub removed: Vec<ItemRef>,
    pub added: Vec<ItemRef>,
    pub failures: Vec<SyncError>,
}

impl FieldReport {
    fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            phase: SyncPhase::Start,
            removed: Vec::new(),
            added: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn advance(&mut self, phase: SyncPhase) {
        debug!("`{}`: {} -> {}", self.field, self.phase, phase);
        self.phase = phase;
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of synchronizing every relation field of one saved item.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub fields: Vec<FieldReport>,
}

impl SyncReport {
    pub fn field(&self, name: &str) -> Option<&FieldReport> {
        self.fields.iter().find(|f| f.field == name)
    }

    pub fn errors(&self) -> impl Iterator<Item = &SyncError> {
        self.fields.iter().flat_map(|f| f.failures.iter())
    }

    pub fn failure_count(&self) -> usize {
        self.fields.iter().map(|f| f.failures.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.fields.iter().all(FieldReport::is_clean)
    }
}

/// Drives diff, reverse field resolution and link application for a save.
pub struct SyncOrchestrator {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn RecordStore>,
    applier: LinkApplier,
    notifier: Arc<dyn Notifier>,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        config: SyncConfig,
    ) -> Self {
        let applier = LinkApplier::new(Arc::clone(&store), config.link_timeout());
        Self {
            registry,
            store,
            applier,
            notifier,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Synchronizes every relation field of an already persisted `item`.
    ///
    /// `snapshot` holds the field values from when editing began. Never fails:
    /// problems are logged, collected in the report, and surfaced as a single
    /// notification.
    pub async fn synchronize(
        &self,
        item: &Item,
        content_type: &ContentType,
        snapshot: &SessionSnapshot,
    ) -> SyncReport {
        let mut working = content_type.clone();
        let source = item.item_ref();
        let fields: Vec<String> = working.relation_fields().map(|f| f.name.clone()).collect();

        info!("Updating {} reverse relationships for {}", fields.len(), source);

        let mut report = SyncReport::default();
        for field in &fields {
            let previous = snapshot.baseline(field);
            let current = item.relation_refs(field);
            let field_report = self
                .sync_field(&mut working, field, &source, previous, current)
                .await;
            report.fields.push(field_report);
        }

        if !report.is_clean() {
            error!(
                "{} relationship update(s) failed for {}",
                report.failure_count(),
                source
            );
            self.notifier
                .notify(NotifyLevel::Danger, &self.config.error_message);
        }
        report
    }

    async fn sync_field(
        &self,
        working: &mut ContentType,
        field: &str,
        source: &ItemRef,
        previous: &[ItemRef],
        current: &[ItemRef],
    ) -> FieldReport {
        let mut report = FieldReport::new(field);

        let changes = diff(previous, current);
        report.advance(SyncPhase::DiffComputed);
        info!(
            "`{}` added {} and removed {} relationships",
            field,
            changes.added.len(),
            changes.removed.len()
        );

        if changes.is_empty() {
            report.advance(SyncPhase::Done);
            return report;
        }

        let target_types = changes.target_types();
        let RelationDiff { added, removed } = changes;
        report.added = added;
        report.removed = removed;

        report.advance(SyncPhase::ReverseFieldResolving);
        let reverse_fields = match self.resolve_reverse_fields(working, field, &target_types).await {
            Ok(map) => map,
            Err(e) => {
                error!("Skipping `{}`: {}", field, e);
                report.failures.push(e);
                report.advance(SyncPhase::Aborted);
                return report;
            }
        };
        report.advance(SyncPhase::ReverseFieldReady);

        report.advance(SyncPhase::ApplyingRemovals);
        for target in report.removed.clone() {
            self.apply_one(&target, &reverse_fields, source, LinkOp::Unlink, &mut report)
                .await;
        }

        report.advance(SyncPhase::ApplyingAdditions);
        for target in report.added.clone() {
            self.apply_one(&target, &reverse_fields, source, LinkOp::Link, &mut report)
                .await;
        }

        report.advance(SyncPhase::Done);
        report
    }

    /// Resolves the reverse field once per target content type.
    ///
    /// A target type that no longer exists is left out of the map, so only
    /// its own references fail. Any other error aborts the field.
    async fn resolve_reverse_fields(
        &self,
        working: &mut ContentType,
        field: &str,
        target_types: &[ContentTypeId],
    ) -> Result<HashMap<ContentTypeId, FieldDefinition>, SyncError> {
        let resolver = ReverseFieldResolver::new(&self.registry);
        let mut resolved = HashMap::with_capacity(target_types.len());
        for target in target_types {
            match resolver.resolve(working, field, target).await {
                Ok(reverse) => {
                    resolved.insert(target.clone(), reverse);
                }
                Err(SyncError::SchemaNotFound(missing)) => {
                    warn!("`{}` references unknown content type {}", field, missing);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(resolved)
    }

    async fn apply_one(
        &self,
        target: &ItemRef,
        reverse_fields: &HashMap<ContentTypeId, FieldDefinition>,
        source: &ItemRef,
        op: LinkOp,
        report: &mut FieldReport,
    ) {
        let Some(reverse) = reverse_fields.get(target.content_type()) else {
            warn!("Cannot {} {} from `{}`: unknown content type", op, target, report.field);
            report
                .failures
                .push(SyncError::SchemaNotFound(target.content_type().clone()));
            return;
        };

        if let Err(e) = self.applier.apply(target, reverse, source, op).await {
            warn!("Failed to {} {} from `{}`: {}", op, target, report.field, e);
            report.failures.push(e);
        }
    }
}
