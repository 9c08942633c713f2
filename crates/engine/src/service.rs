//! Service facade consumed by the calling layer (REST, CLI).

use std::sync::Arc;

use jsrun_core::{CodeId, CodeRecord, CodeStatus, CoreError, Timestamp};
use jsrun_store::{CodeRecordStore, SortSpec};

use crate::evaluator::ScriptEvaluator;
use crate::execution::ExecutionEngine;
use crate::scheduler::{JobScheduler, SchedulerConfig};

/// Submission, lookup, stop, and delete operations over code records.
///
/// Wires the execution engine and scheduler together over a shared store;
/// everything the outer transport layer needs goes through here.
pub struct CodeService {
    store: Arc<dyn CodeRecordStore>,
    scheduler: Arc<JobScheduler>,
}

impl CodeService {
    pub fn new(
        store: Arc<dyn CodeRecordStore>,
        evaluator: Arc<dyn ScriptEvaluator>,
        config: SchedulerConfig,
    ) -> Self {
        let engine = Arc::new(ExecutionEngine::new(Arc::clone(&store), evaluator));
        let scheduler = Arc::new(JobScheduler::new(engine, config));
        Self { store, scheduler }
    }

    /// The underlying scheduler, for shutdown wiring.
    pub fn scheduler(&self) -> &Arc<JobScheduler> {
        &self.scheduler
    }

    /// Create a `Planned` record for `script` and schedule its run,
    /// immediately or at `scheduled_at`. Returns the new record's id.
    pub async fn submit_code(
        &self,
        script: impl Into<String>,
        scheduled_at: Option<Timestamp>,
    ) -> Result<CodeId, CoreError> {
        let record = CodeRecord::new(script.into(), scheduled_at);
        let record = self.store.save(record).await?;
        tracing::info!(
            code_id = %record.id,
            deferred = scheduled_at.is_some(),
            "Code record created",
        );
        self.scheduler.submit(record.id, scheduled_at)?;
        Ok(record.id)
    }

    /// Snapshot of the record for `id`. Fails with `NotFound` if absent.
    pub async fn get_status(&self, id: CodeId) -> Result<CodeRecord, CoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::record_not_found(id))
    }

    /// All records, unsorted.
    pub async fn list(&self) -> Result<Vec<CodeRecord>, CoreError> {
        self.store.find_all(None).await
    }

    /// All records currently in `status`.
    pub async fn list_by_status(&self, status: CodeStatus) -> Result<Vec<CodeRecord>, CoreError> {
        self.store.find_by_status(status).await
    }

    /// All records in the given sort order.
    pub async fn list_sorted(&self, sort: SortSpec) -> Result<Vec<CodeRecord>, CoreError> {
        self.store.find_all(Some(sort)).await
    }

    /// Cancel the pending or in-flight run for `id`.
    pub async fn stop(&self, id: CodeId) -> Result<(), CoreError> {
        self.scheduler.cancel(id).await
    }

    /// Delete the record for `id`. Only records in a terminal status may be
    /// deleted; active ones fail with `InvalidState`.
    pub async fn delete(&self, id: CodeId) -> Result<(), CoreError> {
        let record = self.get_status(id).await?;
        if !record.is_terminal() {
            tracing::warn!(code_id = %id, status = %record.status, "Refusing to delete active code");
            return Err(CoreError::InvalidState(format!(
                "code {id} is still active ({})",
                record.status
            )));
        }
        self.store.delete(id).await?;
        tracing::info!(code_id = %id, "Code record deleted");
        Ok(())
    }
}
