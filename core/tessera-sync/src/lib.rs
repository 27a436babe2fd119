//! Bidirectional relation synchronization for Tessera.
//!
//! When an author changes which items an item points to through a relation
//! field, the items on the other side must point back. This crate restores
//! that invariant after every save.
//!
//! # Architecture
//!
//! Saving an item never waits on, or fails because of, the other side of its
//! relations. The edited item is validated and persisted first; relation
//! synchronization then runs as one sequential task and reports problems
//! through a [`Notifier`].
//!
//! ## Components
//!
//! - **Registry**: resolves content types, caches them, persists schema changes
//! - **Diff**: computes added and removed references for one relation field
//! - **Resolver**: finds or creates the paired reverse field on the target type
//! - **Applicator**: links or unlinks the edited item on one target item
//! - **Orchestrator**: drives the above for every relation field of a save
//! - **Session**: the save workflow and the per-session relation baseline
//!
//! ## Sync Process
//!
//! 1. **Diff**: baseline vs. saved value; every current reference counts as added
//! 2. **Resolve**: one reverse field per (field, target content type)
//! 3. **Unlink**: each removed reference, one at a time
//! 4. **Link**: each current reference, one at a time
//! 5. **Report**: failures are collected, one notification is emitted
//!
//! # Known gaps
//!
//! Two saves that both find a reverse field missing on the same content type
//! can each create one. Two saves updating the same target item race as last
//! writer wins. Neither is guarded here.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera_storage::SqliteStore;
//! use tessera_sync::{SchemaRegistry, SyncConfig, SyncOrchestrator, TracingNotifier};
//!
//! let store = Arc::new(SqliteStore::open_in_memory().unwrap());
//! let registry = Arc::new(SchemaRegistry::new(store.clone()));
//! let orchestrator = SyncOrchestrator::new(
//!     registry,
//!     store,
//!     Arc::new(TracingNotifier),
//!     SyncConfig::default(),
//! );
//! assert_eq!(orchestrator.config().link_timeout_ms, Some(30_000));
//! ```

pub mod applicator;
mod config;
pub mod diff;
mod error;
mod notify;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod session;

pub use applicator::{apply_link_op, LinkApplier, LinkOp};
pub use config::{BaselinePolicy, SyncConfig, DEFAULT_ERROR_MESSAGE};
pub use diff::{diff, RelationDiff};
pub use error::{ReverseFieldFailure, SyncError, SyncResult};
pub use notify::{Notifier, NotifyLevel, TracingNotifier};
pub use orchestrator::{FieldReport, SyncOrchestrator, SyncPhase, SyncReport};
pub use registry::SchemaRegistry;
pub use resolver::{unique_field_name, ReverseFieldResolver};
pub use session::{EditSession, SaveOutcome, SessionSnapshot};
