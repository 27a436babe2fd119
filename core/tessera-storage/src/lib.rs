//! Record storage for Tessera.
//!
//! The sync engine only assumes a store reachable by type + id that can read,
//! create and update whole records, atomically per record. [`RecordStore`]
//! is that contract; [`SqliteStore`] is the bundled implementation.
//!
//! # Architecture
//!
//! - Content types and items are stored as whole JSON documents
//! - Writes replace the full record (no partial updates, no cross-record
//!   transactions)
//! - All access goes through the async [`RecordStore`] trait so callers can
//!   substitute their own backend

mod error;
mod sqlite;
mod store;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteStore;
pub use store::RecordStore;
