//! Deferred and immediate run scheduling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use jsrun_core::{CodeId, CoreError, Timestamp};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::execution::ExecutionEngine;

/// Fallback pool size when the host's parallelism cannot be queried.
const DEFAULT_WORKERS: usize = 4;

/// Scheduler tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Maximum number of runs executing concurrently.
    pub workers: usize,
}

impl Default for SchedulerConfig {
    /// One worker per available execution unit.
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_WORKERS);
        Self { workers }
    }
}

/// Ephemeral handle for a pending or in-flight run. Never persisted.
struct ScheduledHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Maps a record id to its deferred-or-inflight execution handle and runs
/// fired jobs on a bounded worker pool.
///
/// The id-to-handle map is owned by the scheduler instance and lives exactly
/// as long as it; the at-most-one-live-handle-per-id invariant is enforced on
/// submit. Failures are local to an id: one run's outcome never affects
/// another.
pub struct JobScheduler {
    engine: Arc<ExecutionEngine>,
    permits: Arc<Semaphore>,
    handles: Arc<Mutex<HashMap<CodeId, ScheduledHandle>>>,
    shutdown: CancellationToken,
}

impl JobScheduler {
    pub fn new(engine: Arc<ExecutionEngine>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(config.workers)),
            handles: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Register a run for `id`, deferred until `scheduled_at` if that instant
    /// is in the future, otherwise fired immediately on the worker pool.
    ///
    /// Fails with `InvalidState` if a live handle already exists for `id`.
    pub fn submit(
        &self,
        id: CodeId,
        scheduled_at: Option<Timestamp>,
    ) -> Result<(), CoreError> {
        let delay = scheduled_at
            .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            .unwrap_or(Duration::ZERO);

        let mut handles = self.handles.lock().expect("handle map poisoned");
        if handles.contains_key(&id) {
            return Err(CoreError::InvalidState(format!(
                "code {id} is already scheduled"
            )));
        }

        let cancel = self.shutdown.child_token();
        let task = tokio::spawn(run_job(
            id,
            delay,
            cancel.clone(),
            Arc::clone(&self.engine),
            Arc::clone(&self.permits),
            Arc::clone(&self.handles),
        ));
        // Insert while still holding the lock so the task's own cleanup
        // cannot observe the map before its entry exists.
        handles.insert(id, ScheduledHandle { cancel, task });
        tracing::info!(
            code_id = %id,
            delay_ms = delay.as_millis() as u64,
            "Run scheduled",
        );
        Ok(())
    }

    /// Cancel the pending or in-flight run for `id` and force its record to
    /// `Stopped`.
    ///
    /// Fails with `NotFound` if no live handle exists. Cancellation of an
    /// in-flight run is best-effort: the worker is signalled through its
    /// token, output already captured is preserved, and the record write goes
    /// through the engine's per-id lock so it cannot interleave with the
    /// run's own terminal writes.
    pub async fn cancel(&self, id: CodeId) -> Result<(), CoreError> {
        let handle = self
            .handles
            .lock()
            .expect("handle map poisoned")
            .remove(&id)
            .ok_or(CoreError::NotFound {
                entity: "scheduled run",
                id,
            })?;
        handle.cancel.cancel();
        self.engine.force_stop(id).await?;
        tracing::info!(code_id = %id, "Scheduled run stopped");
        Ok(())
    }

    /// Whether a live handle exists for `id`.
    pub fn is_live(&self, id: CodeId) -> bool {
        self.handles
            .lock()
            .expect("handle map poisoned")
            .contains_key(&id)
    }

    /// Number of live handles (pending plus in-flight runs).
    pub fn live_runs(&self) -> usize {
        self.handles.lock().expect("handle map poisoned").len()
    }

    /// Cancel every live handle and wait for their tasks to drain.
    ///
    /// Pending records keep their `Planned` status; in-flight runs finish as
    /// `Stopped` once their evaluator yields.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let drained: Vec<ScheduledHandle> = {
            let mut handles = self.handles.lock().expect("handle map poisoned");
            handles.drain().map(|(_, handle)| handle).collect()
        };
        for handle in drained {
            let _ = handle.task.await;
        }
        tracing::info!("Job scheduler shut down");
    }
}

/// One scheduled run: wait out the delay, take a worker permit, execute.
/// Removes its own handle entry when done, however it exits.
async fn run_job(
    id: CodeId,
    delay: Duration,
    cancel: CancellationToken,
    engine: Arc<ExecutionEngine>,
    permits: Arc<Semaphore>,
    handles: Arc<Mutex<HashMap<CodeId, ScheduledHandle>>>,
) {
    drive(id, delay, cancel, engine, permits).await;
    handles.lock().expect("handle map poisoned").remove(&id);
}

async fn drive(
    id: CodeId,
    delay: Duration,
    cancel: CancellationToken,
    engine: Arc<ExecutionEngine>,
    permits: Arc<Semaphore>,
) {
    if !delay.is_zero() {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(code_id = %id, "Deferred run cancelled before firing");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let permit = tokio::select! {
        _ = cancel.cancelled() => return,
        permit = permits.acquire_owned() => permit,
    };
    let _permit = match permit {
        Ok(permit) => permit,
        // The semaphore is never closed; treat closure as shutdown anyway.
        Err(_) => return,
    };
    if cancel.is_cancelled() {
        return;
    }

    if let Err(err) = engine.run(id, cancel).await {
        tracing::error!(code_id = %id, error = %err, "Run could not persist its outcome");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
