//! Content model for Tessera.
//!
//! Defines the records the relation sync engine reads and writes:
//! - [`ContentType`] - a named, ordered list of [`FieldDefinition`]s
//! - [`FieldDefinition`] - one field; relation fields carry [`RelationMeta`]
//! - [`Item`] - one record, a map from field name to [`FieldValue`]
//! - [`ItemValidator`] - hook run before an item is persisted

mod handler;
mod item;
mod schema;

pub use handler::{AcceptAll, ItemValidator};
pub use item::{FieldValue, Item};
pub use schema::{ContentType, FieldDefinition, RelationMeta, WidgetKind};

use tessera_types::ContentTypeId;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or decoding model records.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("field `{field}` already exists on content type `{content_type}`")]
    DuplicateField {
        content_type: ContentTypeId,
        field: String,
    },

    #[error("invalid item data: {0}")]
    InvalidItemData(String),

    #[error("invalid reference in field `{field}`: {source}")]
    InvalidReference {
        field: String,
        #[source]
        source: tessera_types::Error,
    },
}
