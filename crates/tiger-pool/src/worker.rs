//! Worker threads and the messages they exchange with the coordinator.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::PoolError;

/// The compilation function a worker runs per request. Injectable so
/// tests can substitute slow or crashing compilers.
pub type CompileFn = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

/// One dispatched compilation request, on the coordinator → worker wire.
pub(crate) struct WorkerRequest {
    pub id: u64,
    pub source: String,
}

/// Everything the coordinator receives, from callers and workers alike.
pub(crate) enum PoolMsg {
    Submit {
        source: String,
        admit: Sender<Result<(), PoolError>>,
        result: Sender<Result<String, PoolError>>,
    },
    Completed {
        slot: usize,
        id: u64,
        result: Result<String, String>,
    },
    /// A worker panicked; `id` is the request it was running, if any.
    Crashed { slot: usize, id: Option<u64> },
    /// Delayed nudge to dispatch queued work to a slot.
    DispatchTick { slot: usize },
    Shutdown { done: Sender<()> },
}

/// Live-worker and in-flight counters, shared for observability only;
/// the coordinator remains the single writer of real pool state.
#[derive(Default)]
pub(crate) struct PoolMetrics {
    pub live_workers: AtomicUsize,
    pub in_flight: AtomicUsize,
}

/// Decrements the live-worker count when the worker thread ends, on any
/// exit path.
struct AliveGuard(Arc<PoolMetrics>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        let _ = self.0.live_workers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Spawn one worker thread. The worker loops over its private request
/// channel, runs the compile function with panics contained, and
/// reports each outcome to the coordinator. A panic ends the worker
/// after a `Crashed` report; the coordinator spawns a replacement.
pub(crate) fn spawn_worker(
    slot: usize,
    requests: Receiver<WorkerRequest>,
    coordinator: Sender<PoolMsg>,
    compile: CompileFn,
    metrics: Arc<PoolMetrics>,
) -> JoinHandle<()> {
    let _ = metrics.live_workers.fetch_add(1, Ordering::SeqCst);

    thread::spawn(move || {
        let _alive = AliveGuard(metrics);

        while let Ok(request) = requests.recv() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| compile(&request.source)));

            match outcome {
                Ok(result) => {
                    if coordinator
                        .send(PoolMsg::Completed { slot, id: request.id, result })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(_) => {
                    let _ = coordinator.send(PoolMsg::Crashed { slot, id: Some(request.id) });
                    break;
                }
            }
        }
    })
}
