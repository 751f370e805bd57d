//! Tiger Worker Pool
//!
//! A fixed-size pool of worker threads running Tiger compilations in
//! parallel. A single coordinator thread owns every piece of pool state
//! (queue, worker slots, in-flight map) and talks to callers and
//! workers over `std::sync::mpsc` channels, so no locking discipline
//! beyond that single-writer invariant is needed. Workers own their
//! compilation state exclusively; nothing is shared between concurrent
//! compilations.
//!
//! Requests are admitted under backpressure (bounded FIFO queue plus an
//! in-flight ceiling independent of worker count), correlated back to
//! callers by request id, and never silently dropped: every submission
//! resolves or rejects exactly once, including across worker crashes.

pub mod pool;
mod worker;

pub use pool::{PendingCompile, PoolConfig, WorkerPool};
pub use worker::CompileFn;

/// Failures surfaced by the worker pool.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// The pending queue is at capacity; retry later.
    #[error("compilation queue is full, try again later")]
    QueueFull,
    /// Shutdown has been initiated; no new submissions are accepted.
    #[error("worker pool is shutting down")]
    ShuttingDown,
    /// The worker running this request crashed mid-compilation.
    #[error("worker failed while compiling")]
    WorkerFailed,
    /// The compilation itself failed.
    #[error("{0}")]
    Compile(String),
    /// The coordinator is gone; the pool is unusable.
    #[error("worker pool coordinator disconnected")]
    Disconnected,
}
