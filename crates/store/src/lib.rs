//! Code record persistence port and its in-memory implementation.
//!
//! [`CodeRecordStore`] is the boundary the engine and scheduler talk to;
//! [`MemoryStore`](memory::MemoryStore) is the single-process implementation
//! backing tests and in-memory deployments. Persistence errors are returned
//! as [`CoreError::Persistence`](jsrun_core::CoreError) and are never retried
//! by callers.

use async_trait::async_trait;
use jsrun_core::{CodeId, CodeRecord, CodeStatus, CoreError};

pub mod memory;

pub use memory::MemoryStore;

/// Sort order for record listings. Both orders are descending, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortSpec {
    /// Descending by record id.
    ById,
    /// Descending by scheduled instant; records without one sort last.
    ByScheduledAt,
}

/// Persistence boundary for [`CodeRecord`]s.
///
/// A store provides read-after-write consistency for a single id. Writes for
/// one run (status, outputs, duration) arrive as independent `save` calls and
/// are not atomic as a unit.
#[async_trait]
pub trait CodeRecordStore: Send + Sync {
    /// Persist `record`, assigning an id on first save. Returns the stored
    /// record.
    async fn save(&self, record: CodeRecord) -> Result<CodeRecord, CoreError>;

    /// Look up one record by id.
    async fn find_by_id(&self, id: CodeId) -> Result<Option<CodeRecord>, CoreError>;

    /// All records currently in `status`.
    async fn find_by_status(&self, status: CodeStatus) -> Result<Vec<CodeRecord>, CoreError>;

    /// All records, optionally sorted.
    async fn find_all(&self, sort: Option<SortSpec>) -> Result<Vec<CodeRecord>, CoreError>;

    /// Remove the record with the given id. Fails with `NotFound` if absent.
    async fn delete(&self, id: CodeId) -> Result<(), CoreError>;
}
