//! Salarium Durable Store
//!
//! Durable key-value persistence for the compensation-planning core, plus
//! the change-aware write scheduler and the manual snapshot export surface.
//!
//! # Features
//!
//! - `DurableStore` trait with memory and SQLite backends
//! - Debounced, content-hash-deduplicated snapshot writes
//! - Self-describing export documents with validating import

pub mod error;
pub mod export;
pub mod hash;
pub mod kv;
pub mod scheduler;
pub mod snapshot;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use export::{ExportDocument, SnapshotExporter, EXPORT_VERSION};
pub use hash::content_hash;
pub use kv::{DurableStore, MemoryStore, StoredEntry};
pub use scheduler::{ChangeTrackingScheduler, FlushOutcome, SchedulerConfig};
pub use snapshot::SnapshotState;
pub use sqlite::SqliteStore;
