//! In-memory record store.

use std::collections::HashMap;

use async_trait::async_trait;
use jsrun_core::{CodeId, CodeRecord, CodeStatus, CoreError};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{CodeRecordStore, SortSpec};

/// `HashMap`-backed [`CodeRecordStore`].
///
/// Safe under concurrent access from the scheduler's workers; a write is
/// visible to every subsequent read of the same id. State lives for the
/// process lifetime only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<CodeId, CodeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CodeRecordStore for MemoryStore {
    async fn save(&self, mut record: CodeRecord) -> Result<CodeRecord, CoreError> {
        if record.id.is_nil() {
            // Time-ordered ids keep [`SortSpec::ById`] meaning newest first.
            record.id = Uuid::now_v7();
            tracing::debug!(code_id = %record.id, "Assigned id to new code record");
        }
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: CodeId) -> Result<Option<CodeRecord>, CoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_status(&self, status: CodeStatus) -> Result<Vec<CodeRecord>, CoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn find_all(&self, sort: Option<SortSpec>) -> Result<Vec<CodeRecord>, CoreError> {
        let mut records: Vec<CodeRecord> =
            self.records.read().await.values().cloned().collect();
        match sort {
            Some(SortSpec::ById) => records.sort_by(|a, b| b.id.cmp(&a.id)),
            Some(SortSpec::ByScheduledAt) => {
                // Descending; unscheduled records sort last.
                records.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
            }
            None => {}
        }
        Ok(records)
    }

    async fn delete(&self, id: CodeId) -> Result<(), CoreError> {
        match self.records.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(CoreError::record_not_found(id)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
