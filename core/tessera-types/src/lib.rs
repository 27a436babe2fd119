//! Core type definitions for Tessera.
//!
//! This crate defines the identifiers shared by every other crate:
//! - Content type and item identifiers
//! - [`ItemRef`], the compound `"<contentTypeId> <itemId>"` reference stored
//!   inside relation field values
//!
//! Schema and record types live in `tessera-model`.

mod ids;
mod reference;

pub use ids::{ContentTypeId, ItemId};
pub use reference::ItemRef;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid content type id: {0:?}")]
    InvalidContentTypeId(String),

    #[error("invalid item id: {0:?}")]
    InvalidItemId(String),

    #[error("invalid item reference: {0:?}")]
    InvalidReference(String),
}
