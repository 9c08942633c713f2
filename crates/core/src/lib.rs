//! Domain types for the script execution manager.
//!
//! This crate holds the pure model shared by the store and engine crates:
//! the [`CodeRecord`](record::CodeRecord) entity, its
//! [`CodeStatus`](status::CodeStatus) state machine, the
//! [`OutputSink`](sink::OutputSink) that collects script output, and result
//! classification. Zero internal dependency constraint: nothing here pulls
//! in the store or engine crates.

pub mod classify;
pub mod error;
pub mod record;
pub mod sink;
pub mod status;
pub mod types;

pub use classify::classify_outputs;
pub use error::CoreError;
pub use record::CodeRecord;
pub use sink::OutputSink;
pub use status::CodeStatus;
pub use types::{CodeId, Timestamp};
