//! Link applicator - applies one link or unlink to a target item's reverse field.
//!
//! Each application is a read-modify-write of a single record. There is no
//! optimistic version check: two saves racing on the same target item resolve
//! as last writer wins at the store.
//!
//! A timeout abandons the cycle rather than cancelling it: a save already
//! running on the store's blocking pool can land after `Timeout` is reported.

use crate::error::{SyncError, SyncResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tessera_model::{FieldDefinition, FieldValue};
use tessera_storage::RecordStore;
use tessera_types::ItemRef;
use tracing::debug;

/// Direction of a reverse-field update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOp {
    Link,
    Unlink,
}

impl fmt::Display for LinkOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => f.write_str("link"),
            Self::Unlink => f.write_str("unlink"),
        }
    }
}

/// Computes a reverse field's new value.
///
/// Single-valued: `Unlink` clears the field whatever it held, `Link`
/// overwrites it with `source`. Multi-valued: set insert/remove, both no-ops
/// when already satisfied. Non-reference values in a multi-valued field are
/// treated as an empty set.
pub fn apply_link_op(
    current: Option<&FieldValue>,
    single: bool,
    source: &ItemRef,
    op: LinkOp,
) -> FieldValue {
    if single {
        return match op {
            LinkOp::Unlink => FieldValue::Empty,
            LinkOp::Link => FieldValue::Ref(source.clone()),
        };
    }

    let mut refs: Vec<ItemRef> = current.map(|v| v.refs().to_vec()).unwrap_or_default();
    match op {
        LinkOp::Unlink => refs.retain(|r| r != source),
        LinkOp::Link => {
            if !refs.contains(source) {
                refs.push(source.clone());
            }
        }
    }
    FieldValue::RefSet(refs)
}

/// Applies link operations to target items in the record store.
pub struct LinkApplier {
    store: Arc<dyn RecordStore>,
    timeout: Option<Duration>,
}

impl LinkApplier {
    /// Creates an applier. `timeout` bounds how long each load-mutate-save
    /// cycle is awaited.
    pub fn new(store: Arc<dyn RecordStore>, timeout: Option<Duration>) -> Self {
        Self { store, timeout }
    }

    /// Loads `target`, updates its `reverse_field` with `source`, and saves it.
    /// Returns whether the stored references changed.
    pub async fn apply(
        &self,
        target: &ItemRef,
        reverse_field: &FieldDefinition,
        source: &ItemRef,
        op: LinkOp,
    ) -> SyncResult<bool> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.apply_inner(target, reverse_field, source, op))
                .await
                .map_err(|_| SyncError::Timeout {
                    target: target.clone(),
                    after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => self.apply_inner(target, reverse_field, source, op).await,
        }
    }

    async fn apply_inner(
        &self,
        target: &ItemRef,
        reverse_field: &FieldDefinition,
        source: &ItemRef,
        op: LinkOp,
    ) -> SyncResult<bool> {
        let mut item = match self.store.find_item(target.content_type(), target.item()).await {
            Ok(item) => item,
            Err(e) if e.is_not_found() => return Err(SyncError::TargetItemNotFound(target.clone())),
            Err(e) => return Err(e.into()),
        };

        let before = item.get(&reverse_field.name);
        let after = apply_link_op(before, reverse_field.is_single_valued(), source, op);
        let changed = before.map(FieldValue::refs).unwrap_or(&[]) != after.refs();
        item.set(reverse_field.name.clone(), after);

        self.store
            .save_item(&item)
            .await
            .map_err(|source| SyncError::TargetItemSaveFailed {
                target: target.clone(),
                source,
            })?;

        debug!(
            "Applied {} of {} to `{}` on {} (changed={})",
            op, source, reverse_field.name, target, changed
        );
        Ok(changed)
    }
}
