//! Reverse field resolver - pairs a relation field with a field on the
//! target content type, creating one on first use.

use crate::error::{ReverseFieldFailure, SyncError, SyncResult};
use crate::registry::SchemaRegistry;
use tessera_model::{ContentType, FieldDefinition};
use tessera_types::ContentTypeId;
use tracing::{debug, info, warn};

/// Ensures relation fields have a paired reverse field on their target type.
pub struct ReverseFieldResolver<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> ReverseFieldResolver<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Returns the reverse field of `source_field` on `target_id`.
    ///
    /// If the field's recorded reverse name exists on the target as a relation
    /// back to the source type, that field is returned and nothing is written.
    /// If an unrelated field holds the recorded name, creation fails with
    /// [`ReverseFieldFailure::NameTaken`] and the pointer is left alone.
    ///
    /// Otherwise a multi-valued relation is appended to the target. It takes
    /// the recorded name when there is one, so every target type of the field
    /// shares a single reverse name. Without a recorded name it is labelled
    /// after the source type, the source field is pointed at it, and the
    /// source type then the target type are persisted. The target write is
    /// only attempted once the source write succeeded; a failed target write
    /// leaves the source pointer in place.
    ///
    /// `source_type` is updated in place once its write has succeeded.
    pub async fn resolve(
        &self,
        source_type: &mut ContentType,
        source_field: &str,
        target_id: &ContentTypeId,
    ) -> SyncResult<FieldDefinition> {
        let field = source_type
            .field(source_field)
            .ok_or_else(|| SyncError::FieldNotFound {
                content_type: source_type.id.clone(),
                field: source_field.to_string(),
            })?;
        let recorded = field.reverse_field_name().map(str::to_string);

        let self_relation = *target_id == source_type.id;
        let mut target = if self_relation {
            source_type.clone()
        } else {
            self.registry.resolve(target_id).await?
        };

        let creation_failed = |source: ReverseFieldFailure| SyncError::ReverseFieldCreationFailed {
            field: source_field.to_string(),
            target: target_id.clone(),
            source,
        };

        if let Some(name) = recorded.as_deref() {
            if let Some(existing) = target.field(name) {
                if !points_back_to(existing, &source_type.id) {
                    warn!(
                        "`{}` on `{}` is not a relation back to `{}`",
                        name, target.name, source_type.name
                    );
                    return Err(creation_failed(ReverseFieldFailure::NameTaken(
                        name.to_string(),
                    )));
                }
                debug!(
                    "Reverse field found for `{}` on `{}`, proceeding",
                    source_field, target.name
                );
                return Ok(existing.clone());
            }
        }

        info!(
            "Reverse field NOT found for `{}` on `{}`, creating it",
            source_field, target.name
        );

        let name = match recorded.as_deref() {
            Some(name) => name.to_string(),
            None => {
                let base = if source_type.name.trim().is_empty() {
                    source_type.id.as_str()
                } else {
                    source_type.name.as_str()
                };
                unique_field_name(&target, base)
            }
        };
        let reverse = FieldDefinition::reverse_relation(&name, source_type.id.clone(), source_field);
        target.push_field(reverse.clone())?;

        if self_relation {
            // Source and target are one record: mutate and persist it once.
            point_at(&mut target, source_field, &reverse.name);
            self.registry
                .persist(&target)
                .await
                .map_err(|e| creation_failed(e.into()))?;
            *source_type = target;
            return Ok(reverse);
        }

        if recorded.is_none() {
            let mut updated_source = source_type.clone();
            point_at(&mut updated_source, source_field, &reverse.name);
            self.registry
                .persist(&updated_source)
                .await
                .map_err(|e| creation_failed(e.into()))?;
            *source_type = updated_source;
        }

        if let Err(e) = self.registry.persist(&target).await {
            warn!(
                "`{}` now points at `{}` but `{}` could not be saved",
                source_field, reverse.name, target.name
            );
            return Err(creation_failed(e.into()));
        }

        info!(
            "Reverse relationship of `{}` to `{}` successfully added",
            source_field, reverse.name
        );
        Ok(reverse)
    }
}

/// Whether `field` is a relation that may hold references into `source`.
fn points_back_to(field: &FieldDefinition, source: &ContentTypeId) -> bool {
    field.is_relation()
        && field
            .relation
            .as_ref()
            .and_then(|r| r.content_type_id.as_ref())
            .is_none_or(|id| id == source)
}

fn point_at(content_type: &mut ContentType, field: &str, reverse_name: &str) {
    if let Some(f) = content_type.field_mut(field) {
        f.set_reverse_field_name(reverse_name);
    }
}

/// First of `base`, `"base 2"`, `"base 3"`, … not already a field on `target`.
pub fn unique_field_name(target: &ContentType, base: &str) -> String {
    if !target.has_field(base) {
        return base.to_string();
    }
    let mut counter = 2u32;
    loop {
        let candidate = format!("{base} {counter}");
        if !target.has_field(&candidate) {
            debug!("Duplicate field name detected, using `{}`", candidate);
            return candidate;
        }
        counter += 1;
    }
}
