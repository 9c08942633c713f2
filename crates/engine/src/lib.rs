//! Script execution engine, job scheduler, and service facade.
//!
//! The engine sits in front of an embedded script interpreter supplied
//! through the [`ScriptEvaluator`] trait. [`ExecutionEngine`] drives one run
//! end to end (status transitions, output capture, timing);
//! [`JobScheduler`] maps record ids to deferred-or-inflight handles on a
//! bounded worker pool; [`CodeService`] is the surface a REST or CLI layer
//! calls into.

pub mod evaluator;
pub mod execution;
pub mod scheduler;
pub mod service;

pub use evaluator::{EvaluationError, ScriptEvaluator};
pub use execution::ExecutionEngine;
pub use scheduler::{JobScheduler, SchedulerConfig};
pub use service::CodeService;
