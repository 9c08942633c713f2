//! Orchestration of a single run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use jsrun_core::{classify_outputs, CodeId, CodeRecord, CodeStatus, CoreError, OutputSink};
use jsrun_store::CodeRecordStore;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

use crate::evaluator::{EvaluationError, ScriptEvaluator};

/// Drives one run end to end: binds a fresh sink, invokes the evaluator on a
/// blocking worker, times the call, classifies the outcome, and writes
/// status, outputs, and timing back to the record.
///
/// On return the record's status is always terminal. Evaluation failures are
/// absorbed into a `Failed` record; only persistence errors propagate.
pub struct ExecutionEngine {
    store: Arc<dyn CodeRecordStore>,
    evaluator: Arc<dyn ScriptEvaluator>,
    /// Per-id lock serializing status writes between a run and a concurrent
    /// [`force_stop`](Self::force_stop). Every status write re-validates
    /// against the currently stored record inside this lock, so a forced
    /// `Stopped` is never overwritten by a stale outcome.
    run_locks: Mutex<HashMap<CodeId, Arc<AsyncMutex<()>>>>,
}

impl ExecutionEngine {
    pub fn new(store: Arc<dyn CodeRecordStore>, evaluator: Arc<dyn ScriptEvaluator>) -> Self {
        Self {
            store,
            evaluator,
            run_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Execute the record's script and persist the outcome.
    ///
    /// Persistence happens in independent writes (pre-run status, post-run
    /// outputs, final status, timing); they are not atomic as a unit and are
    /// never retried.
    pub async fn run(&self, id: CodeId, cancel: CancellationToken) -> Result<(), CoreError> {
        let lock = self.run_lock(id);
        let result = self.run_inner(id, cancel, &lock).await;
        self.release_run_lock(id, lock);
        result
    }

    /// Force the record for `id` to `Stopped`, preserving any output and
    /// timing already persisted.
    ///
    /// No-op if the record is already terminal: a run that finished before
    /// the cancel signal landed keeps its natural outcome.
    pub async fn force_stop(&self, id: CodeId) -> Result<(), CoreError> {
        let lock = self.run_lock(id);
        let result = self.force_stop_inner(id, &lock).await;
        self.release_run_lock(id, lock);
        result
    }

    async fn run_inner(
        &self,
        id: CodeId,
        cancel: CancellationToken,
        lock: &AsyncMutex<()>,
    ) -> Result<(), CoreError> {
        let script = {
            let _guard = lock.lock().await;
            let mut record = self.fetch(id).await?;
            if record.is_terminal() {
                // Cancelled between firing and starting; nothing left to do.
                tracing::debug!(code_id = %id, status = %record.status, "Skipping run of terminal record");
                return Ok(());
            }
            record.transition_to(CodeStatus::Executing)?;
            let record = self.store.save(record).await?;
            record.script_body
        };
        tracing::info!(code_id = %id, "Script execution started");

        let evaluator = Arc::clone(&self.evaluator);
        let eval_cancel = cancel.clone();
        let start = Instant::now();
        let joined = tokio::task::spawn_blocking(move || {
            let mut sink = OutputSink::new();
            let outcome = evaluator.evaluate(&script, &mut sink, &eval_cancel);
            (sink.into_lines(), outcome)
        })
        .await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        // A panicking evaluator is contained the same way as a typed failure.
        let (mut outputs, outcome) = match joined {
            Ok(pair) => pair,
            Err(join_err) => (
                Vec::new(),
                Err(EvaluationError::new(join_err.to_string())),
            ),
        };

        let outcome_status = match outcome {
            Ok(()) => classify_outputs(&outputs),
            Err(err) => {
                tracing::warn!(code_id = %id, error = %err, "Script produced an evaluation error");
                outputs.push(err.message().to_string());
                CodeStatus::Failed
            }
        };

        // All post-run writes happen under the per-id lock: a cancel either
        // lands before this section (the re-read sees Stopped and keeps it)
        // or waits until after it (and finds the natural outcome, terminal).
        let _guard = lock.lock().await;
        let mut record = self.fetch(id).await?;
        record.outputs = outputs;
        let mut record = self.store.save(record).await?;

        let final_status = if cancel.is_cancelled() {
            CodeStatus::Stopped
        } else {
            outcome_status
        };
        if !record.is_terminal() {
            record.transition_to(final_status)?;
            record = self.store.save(record).await?;
        }

        record.execution_duration_ms = Some(elapsed_ms);
        let record = self.store.save(record).await?;
        tracing::info!(
            code_id = %id,
            status = %record.status,
            duration_ms = elapsed_ms,
            "Script execution finished",
        );
        Ok(())
    }

    async fn force_stop_inner(
        &self,
        id: CodeId,
        lock: &AsyncMutex<()>,
    ) -> Result<(), CoreError> {
        let _guard = lock.lock().await;
        let mut record = self.fetch(id).await?;
        if record.is_terminal() {
            tracing::debug!(code_id = %id, status = %record.status, "Run already terminal, keeping its outcome");
            return Ok(());
        }
        record.transition_to(CodeStatus::Stopped)?;
        // A run stopped before it fired consumed no execution time.
        if record.execution_duration_ms.is_none() {
            record.execution_duration_ms = Some(0);
        }
        self.store.save(record).await?;
        tracing::info!(code_id = %id, "Run forced to stopped");
        Ok(())
    }

    async fn fetch(&self, id: CodeId) -> Result<CodeRecord, CoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::record_not_found(id))
    }

    fn run_lock(&self, id: CodeId) -> Arc<AsyncMutex<()>> {
        self.run_locks
            .lock()
            .expect("run lock map poisoned")
            .entry(id)
            .or_default()
            .clone()
    }

    /// Drop `lock` and evict the map entry once no other holder remains.
    fn release_run_lock(&self, id: CodeId, lock: Arc<AsyncMutex<()>>) {
        let mut locks = self.run_locks.lock().expect("run lock map poisoned");
        drop(lock);
        if locks.get(&id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
