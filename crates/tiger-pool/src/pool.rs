//! The worker pool: public handle plus the single-threaded coordinator
//! that owns all scheduling state.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::worker::{spawn_worker, CompileFn, PoolMetrics, PoolMsg, WorkerRequest};
use crate::PoolError;

/// Pool sizing and timing knobs.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum length of the pending FIFO queue.
    pub max_queue: usize,
    /// Ceiling on dispatched-but-uncompleted requests, independent of
    /// worker count.
    pub max_in_flight: usize,
    /// Pause between a completion and redispatching to the same worker,
    /// smoothing burst load.
    pub redispatch_delay: Duration,
    /// Pause before a freshly respawned worker picks up queued work.
    pub respawn_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let parallelism = thread::available_parallelism().map_or(4, |n| n.get());
        let workers = (parallelism * 3 / 4).max(1);
        Self {
            workers,
            max_queue: 100,
            max_in_flight: workers * 2,
            redispatch_delay: Duration::from_millis(10),
            respawn_delay: Duration::from_millis(100),
        }
    }
}

/// Completion handle for one submitted request. Resolves exactly once.
#[derive(Debug)]
pub struct PendingCompile {
    result: Receiver<Result<String, PoolError>>,
}

impl PendingCompile {
    /// Block until the compilation completes.
    pub fn wait(self) -> Result<String, PoolError> {
        self.result.recv().map_err(|_| PoolError::Disconnected)?
    }
}

/// A fixed-size pool of worker threads compiling Tiger sources in
/// parallel.
pub struct WorkerPool {
    tx: Sender<PoolMsg>,
    shutting_down: Arc<AtomicBool>,
    metrics: Arc<PoolMetrics>,
    coordinator: Mutex<Option<JoinHandle<()>>>,
    max_in_flight: usize,
}

impl WorkerPool {
    /// Pool with default sizing, running the Tiger compiler.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Pool with explicit sizing, running the Tiger compiler.
    pub fn with_config(config: PoolConfig) -> Self {
        Self::with_compiler(
            config,
            Arc::new(|source: &str| tiger_codegen::compile(source).map_err(|e| e.to_string())),
        )
    }

    /// Pool running an arbitrary compile function. This is the seam the
    /// crash-recovery and backpressure tests use.
    pub fn with_compiler(config: PoolConfig, compile: CompileFn) -> Self {
        let (tx, rx) = mpsc::channel();
        let metrics = Arc::new(PoolMetrics::default());
        let max_in_flight = config.max_in_flight;

        let mut coordinator = Coordinator {
            rx,
            self_tx: tx.clone(),
            slots: Vec::new(),
            queue: VecDeque::new(),
            pending: HashMap::new(),
            in_flight: 0,
            next_id: 0,
            shutting_down: false,
            shutdown_done: Vec::new(),
            config,
            compile,
            metrics: Arc::clone(&metrics),
        };
        for _ in 0..coordinator.config.workers {
            coordinator.slots.push(None);
        }
        for slot in 0..coordinator.config.workers {
            coordinator.spawn_slot(slot);
        }

        let handle = thread::spawn(move || coordinator.run());

        Self {
            tx,
            shutting_down: Arc::new(AtomicBool::new(false)),
            metrics,
            coordinator: Mutex::new(Some(handle)),
            max_in_flight,
        }
    }

    /// Submit one source for compilation. Rejects immediately when the
    /// pool is shutting down or the pending queue is full; otherwise
    /// the request is admitted and will resolve exactly once.
    pub fn submit(&self, source: impl Into<String>) -> Result<PendingCompile, PoolError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(PoolError::ShuttingDown);
        }

        let (admit_tx, admit_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();

        self.tx
            .send(PoolMsg::Submit {
                source: source.into(),
                admit: admit_tx,
                result: result_tx,
            })
            .map_err(|_| PoolError::Disconnected)?;

        admit_rx.recv().map_err(|_| PoolError::Disconnected)??;
        Ok(PendingCompile { result: result_rx })
    }

    /// Compile a batch of sources, returning results in input order.
    ///
    /// The batch is processed in chunks sized to half the in-flight
    /// ceiling; each chunk is awaited fully before the next begins,
    /// bounding the memory held by buffered results.
    pub fn submit_all(&self, sources: &[String]) -> Result<Vec<String>, PoolError> {
        let chunk_size = (self.max_in_flight / 2).max(1);
        let mut results = Vec::with_capacity(sources.len());

        for chunk in sources.chunks(chunk_size) {
            let pending: Vec<PendingCompile> = chunk
                .iter()
                .map(|source| self.submit(source.clone()))
                .collect::<Result<_, _>>()?;
            for handle in pending {
                results.push(handle.wait()?);
            }
        }

        Ok(results)
    }

    /// Compile a batch of sources, returning one result per source in
    /// input order.
    ///
    /// Unlike [`submit_all`](Self::submit_all), one source failing does
    /// not abort the batch. Submission is chunked the same way, so a
    /// batch of any size never overruns the pending-queue capacity.
    pub fn submit_each(&self, sources: &[String]) -> Vec<Result<String, PoolError>> {
        let chunk_size = (self.max_in_flight / 2).max(1);
        let mut results = Vec::with_capacity(sources.len());

        for chunk in sources.chunks(chunk_size) {
            let pending: Vec<Result<PendingCompile, PoolError>> =
                chunk.iter().map(|source| self.submit(source.clone())).collect();
            for handle in pending {
                results.push(handle.and_then(PendingCompile::wait));
            }
        }

        results
    }

    /// Initiate shutdown and block until the pool is drained: new
    /// submissions are rejected at once, queued requests are rejected,
    /// in-flight requests run to completion, then every worker is
    /// terminated. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.shutting_down.swap(true, Ordering::SeqCst);

        let (done_tx, done_rx) = mpsc::channel();
        if self.tx.send(PoolMsg::Shutdown { done: done_tx }).is_ok() {
            let _ = done_rx.recv();
        }

        if let Ok(mut guard) = self.coordinator.lock() {
            if let Some(handle) = guard.take() {
                let _ = handle.join();
            }
        }
    }

    /// Number of worker threads currently alive.
    pub fn live_workers(&self) -> usize {
        self.metrics.live_workers.load(Ordering::SeqCst)
    }

    /// Requests dispatched but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.metrics.in_flight.load(Ordering::SeqCst)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =============================================================================
// Coordinator
// =============================================================================

struct Slot {
    requests: Sender<WorkerRequest>,
    handle: JoinHandle<()>,
    running: Option<u64>,
}

/// Owns every piece of mutable pool state. Runs on its own thread and
/// is the only writer of the queue, the slot set, and the in-flight
/// map.
struct Coordinator {
    rx: Receiver<PoolMsg>,
    self_tx: Sender<PoolMsg>,
    slots: Vec<Option<Slot>>,
    queue: VecDeque<(u64, String)>,
    pending: HashMap<u64, Sender<Result<String, PoolError>>>,
    in_flight: usize,
    next_id: u64,
    shutting_down: bool,
    shutdown_done: Vec<Sender<()>>,
    config: PoolConfig,
    compile: CompileFn,
    metrics: Arc<PoolMetrics>,
}

impl Coordinator {
    fn run(mut self) {
        while let Ok(msg) = self.rx.recv() {
            match msg {
                PoolMsg::Submit { source, admit, result } => {
                    self.on_submit(source, admit, result);
                }
                PoolMsg::Completed { slot, id, result } => {
                    self.on_completed(slot, id, result);
                }
                PoolMsg::Crashed { slot, id } => {
                    self.on_crashed(slot, id);
                }
                PoolMsg::DispatchTick { slot } => {
                    self.try_dispatch(slot);
                }
                PoolMsg::Shutdown { done } => {
                    self.on_shutdown(done);
                }
            }

            if self.shutting_down && self.in_flight == 0 {
                self.finish_shutdown();
                return;
            }
        }
    }

    fn on_submit(
        &mut self,
        source: String,
        admit: Sender<Result<(), PoolError>>,
        result: Sender<Result<String, PoolError>>,
    ) {
        if self.shutting_down {
            let _ = admit.send(Err(PoolError::ShuttingDown));
            return;
        }
        if self.queue.len() >= self.config.max_queue {
            let _ = admit.send(Err(PoolError::QueueFull));
            return;
        }

        let id = self.next_id;
        self.next_id += 1;
        let _ = self.pending.insert(id, result);
        let _ = admit.send(Ok(()));

        match self.idle_slot() {
            Some(slot) if self.in_flight < self.config.max_in_flight => {
                self.dispatch(slot, id, source);
            }
            _ => self.queue.push_back((id, source)),
        }
    }

    fn on_completed(&mut self, slot: usize, id: u64, result: Result<String, String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.metrics.in_flight.store(self.in_flight, Ordering::SeqCst);

        if let Some(s) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            s.running = None;
        }
        if let Some(reply) = self.pending.remove(&id) {
            let _ = reply.send(result.map_err(PoolError::Compile));
        }

        self.schedule_tick(slot, self.config.redispatch_delay);
    }

    fn on_crashed(&mut self, slot: usize, id: Option<u64>) {
        if let Some(id) = id {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.metrics.in_flight.store(self.in_flight, Ordering::SeqCst);
            if let Some(reply) = self.pending.remove(&id) {
                let _ = reply.send(Err(PoolError::WorkerFailed));
            }
        }
        self.replace_worker(slot);
    }

    fn on_shutdown(&mut self, done: Sender<()>) {
        self.shutting_down = true;
        // The queue drains only via shutdown: reject everything still
        // queued so no continuation is orphaned.
        while let Some((id, _)) = self.queue.pop_front() {
            if let Some(reply) = self.pending.remove(&id) {
                let _ = reply.send(Err(PoolError::ShuttingDown));
            }
        }
        self.shutdown_done.push(done);
    }

    fn dispatch(&mut self, slot_idx: usize, id: u64, source: String) {
        let Some(slot) = self.slots.get_mut(slot_idx).and_then(Option::as_mut) else {
            self.queue.push_back((id, source));
            return;
        };

        slot.running = Some(id);
        match slot.requests.send(WorkerRequest { id, source }) {
            Ok(()) => {
                self.in_flight += 1;
                self.metrics.in_flight.store(self.in_flight, Ordering::SeqCst);
            }
            Err(failed) => {
                // The worker vanished before the dispatch was
                // acknowledged: re-queue the request, never fail it.
                slot.running = None;
                let request = failed.0;
                self.queue.push_front((request.id, request.source));
                self.replace_worker(slot_idx);
            }
        }
    }

    fn try_dispatch(&mut self, slot: usize) {
        if self.shutting_down {
            return;
        }
        let idle = self
            .slots
            .get(slot)
            .and_then(Option::as_ref)
            .is_some_and(|s| s.running.is_none());
        if idle && self.in_flight < self.config.max_in_flight {
            if let Some((id, source)) = self.queue.pop_front() {
                self.dispatch(slot, id, source);
            }
        }
    }

    /// Remove a dead worker, terminate it, and (outside shutdown) spawn
    /// a replacement into the same slot.
    fn replace_worker(&mut self, slot_idx: usize) {
        if let Some(dead) = self.slots.get_mut(slot_idx).and_then(Option::take) {
            log::warn!("worker {slot_idx} failed; terminating");
            drop(dead.requests);
            // Errors during termination are ignored.
            let _ = dead.handle.join();
        }

        if !self.shutting_down {
            self.spawn_slot(slot_idx);
            if !self.queue.is_empty() {
                self.schedule_tick(slot_idx, self.config.respawn_delay);
            }
        }
    }

    fn spawn_slot(&mut self, slot: usize) {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_worker(
            slot,
            rx,
            self.self_tx.clone(),
            Arc::clone(&self.compile),
            Arc::clone(&self.metrics),
        );
        self.slots[slot] = Some(Slot { requests: tx, handle, running: None });
    }

    fn idle_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|s| s.running.is_none()))
    }

    fn schedule_tick(&self, slot: usize, delay: Duration) {
        let tx = self.self_tx.clone();
        let _ = thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(PoolMsg::DispatchTick { slot });
        });
    }

    fn finish_shutdown(&mut self) {
        for entry in &mut self.slots {
            if let Some(slot) = entry.take() {
                drop(slot.requests);
                let _ = slot.handle.join();
            }
        }
        self.pending.clear();
        self.metrics.in_flight.store(0, Ordering::SeqCst);
        for done in self.shutdown_done.drain(..) {
            let _ = done.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(workers: usize, max_queue: usize, max_in_flight: usize) -> PoolConfig {
        PoolConfig {
            workers,
            max_queue,
            max_in_flight,
            redispatch_delay: Duration::from_millis(1),
            respawn_delay: Duration::from_millis(5),
        }
    }

    fn echo_compiler() -> CompileFn {
        Arc::new(|source: &str| Ok(format!("compiled:{source}")))
    }

    /// Sleeps for the number of milliseconds in the source, then echoes.
    fn sleepy_compiler() -> CompileFn {
        Arc::new(|source: &str| {
            let ms: u64 = source.parse().unwrap_or(0);
            thread::sleep(Duration::from_millis(ms));
            Ok(source.to_string())
        })
    }

    /// Panics on the source `boom`, echoes everything else.
    fn crashing_compiler() -> CompileFn {
        Arc::new(|source: &str| {
            assert!(source != "boom", "simulated worker crash");
            Ok(source.to_string())
        })
    }

    /// Spin until `predicate` holds or the deadline passes.
    fn wait_until(predicate: impl Fn() -> bool) {
        for _ in 0..200 {
            if predicate() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("condition not reached in time");
    }

    // =========================================================================
    // Basic submission
    // =========================================================================

    #[test]
    fn test_submit_resolves() {
        let pool = WorkerPool::with_compiler(config(2, 100, 4), echo_compiler());
        let html = pool.submit("hello").unwrap().wait().unwrap();
        assert_eq!(html, "compiled:hello");
    }

    #[test]
    fn test_pending_handle_is_debuggable() {
        // Handles appear in diagnostic output; `{:?}` must work on them.
        let pool = WorkerPool::with_compiler(config(1, 10, 1), echo_compiler());
        let handle = pool.submit("x").unwrap();
        assert!(format!("{handle:?}").contains("PendingCompile"));
        assert_eq!(handle.wait().unwrap(), "compiled:x");
    }

    #[test]
    fn test_default_compiler_produces_html() {
        let pool = WorkerPool::with_config(config(1, 10, 2));
        let html = pool
            .submit("<view className=\"test\"><text>Hi</text></view>")
            .unwrap()
            .wait()
            .unwrap();
        assert!(html.contains("<div class=\"test\">"));
        assert!(html.contains("Hi"));
    }

    #[test]
    fn test_compile_error_fails_only_that_request() {
        let pool = WorkerPool::with_config(config(1, 10, 2));
        let bad = pool.submit("<view className></view>").unwrap();
        match bad.wait() {
            Err(PoolError::Compile(message)) => assert!(message.contains("expected `=`")),
            other => panic!("expected compile error, got {other:?}"),
        }
        // The pool is unaffected.
        let good = pool.submit("<view></view>").unwrap().wait().unwrap();
        assert!(good.contains("<div>"));
    }

    // =========================================================================
    // Saturation and correlation
    // =========================================================================

    #[test]
    fn test_all_requests_resolve_beyond_ceiling() {
        let pool = WorkerPool::with_compiler(config(2, 100, 4), echo_compiler());
        let handles: Vec<_> = (0..20)
            .map(|i| pool.submit(format!("s{i}")).unwrap())
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.wait().unwrap(), format!("compiled:s{i}"));
        }
        wait_until(|| pool.in_flight() == 0);
    }

    #[test]
    fn test_results_correlate_by_request_not_completion_order() {
        // The slowest request is submitted first; correlation must not
        // depend on completion order across workers.
        let pool = WorkerPool::with_compiler(config(3, 100, 6), sleepy_compiler());
        let slow = pool.submit("80").unwrap();
        let mid = pool.submit("20").unwrap();
        let fast = pool.submit("0").unwrap();
        assert_eq!(fast.wait().unwrap(), "0");
        assert_eq!(mid.wait().unwrap(), "20");
        assert_eq!(slow.wait().unwrap(), "80");
    }

    #[test]
    fn test_queue_full_rejects_without_disturbing_queued_work() {
        let pool = WorkerPool::with_compiler(config(1, 2, 1), sleepy_compiler());
        let running = pool.submit("150").unwrap();
        let queued_a = pool.submit("0").unwrap();
        let queued_b = pool.submit("0").unwrap();

        match pool.submit("0") {
            Err(PoolError::QueueFull) => {}
            other => panic!("expected queue-full rejection, got {other:?}"),
        }

        assert_eq!(running.wait().unwrap(), "150");
        assert_eq!(queued_a.wait().unwrap(), "0");
        assert_eq!(queued_b.wait().unwrap(), "0");
    }

    // =========================================================================
    // Batch submission
    // =========================================================================

    #[test]
    fn test_submit_all_preserves_input_order() {
        let pool = WorkerPool::with_compiler(config(2, 100, 4), echo_compiler());
        let sources: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
        let results = pool.submit_all(&sources).unwrap();
        let expected: Vec<String> = (0..10).map(|i| format!("compiled:s{i}")).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_submit_each_batch_larger_than_queue_capacity() {
        // Chunked submission must keep the pending queue below its cap
        // no matter how large the batch is; nothing gets rejected.
        let pool = WorkerPool::with_compiler(config(2, 10, 4), echo_compiler());
        let sources: Vec<String> = (0..150).map(|i| format!("s{i}")).collect();
        let results = pool.submit_each(&sources);
        assert_eq!(results.len(), 150);
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap(), format!("compiled:s{i}"));
        }
    }

    #[test]
    fn test_submit_each_reports_failures_per_item() {
        let pool = WorkerPool::with_config(config(1, 10, 2));
        let sources = vec![
            "<view></view>".to_string(),
            "<view className></view>".to_string(),
            "<text>ok</text>".to_string(),
        ];
        let results = pool.submit_each(&sources);
        assert!(results[0].as_ref().unwrap().contains("<div>"));
        assert!(matches!(results[1], Err(PoolError::Compile(_))));
        assert!(results[2].as_ref().unwrap().contains("ok"));
    }

    #[test]
    fn test_submit_all_empty() {
        let pool = WorkerPool::with_compiler(config(1, 10, 2), echo_compiler());
        assert_eq!(pool.submit_all(&[]).unwrap(), Vec::<String>::new());
    }

    // =========================================================================
    // Crash recovery
    // =========================================================================

    #[test]
    fn test_crashed_request_rejected_and_worker_replaced() {
        let pool = WorkerPool::with_compiler(config(1, 10, 1), crashing_compiler());
        let crashed = pool.submit("boom").unwrap();
        assert_eq!(crashed.wait(), Err(PoolError::WorkerFailed));

        // The pool self-heals transparently.
        wait_until(|| pool.live_workers() == 1);
        let ok = pool.submit("fine").unwrap().wait().unwrap();
        assert_eq!(ok, "fine");
        assert!(pool.live_workers() <= 1);
    }

    #[test]
    fn test_crash_does_not_lose_queued_work() {
        let pool = WorkerPool::with_compiler(config(1, 10, 1), crashing_compiler());
        let crashed = pool.submit("boom").unwrap();
        let queued_a = pool.submit("a").unwrap();
        let queued_b = pool.submit("b").unwrap();

        assert_eq!(crashed.wait(), Err(PoolError::WorkerFailed));
        assert_eq!(queued_a.wait().unwrap(), "a");
        assert_eq!(queued_b.wait().unwrap(), "b");
    }

    #[test]
    fn test_worker_count_bounded_across_crashes() {
        let pool = WorkerPool::with_compiler(config(2, 100, 4), crashing_compiler());
        let crashes: Vec<_> = (0..4).map(|_| pool.submit("boom").unwrap()).collect();
        for handle in crashes {
            assert_eq!(handle.wait(), Err(PoolError::WorkerFailed));
        }

        wait_until(|| pool.live_workers() == 2);
        let results = pool
            .submit_all(&["x".to_string(), "y".to_string()])
            .unwrap();
        assert_eq!(results, vec!["x".to_string(), "y".to_string()]);
        assert!(pool.live_workers() <= 2);
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    #[test]
    fn test_shutdown_completes_in_flight_and_rejects_queued() {
        let pool = WorkerPool::with_compiler(config(1, 10, 1), sleepy_compiler());
        let running = pool.submit("100").unwrap();
        let queued = pool.submit("0").unwrap();

        pool.shutdown();

        // In-flight work was never abandoned; queued work was rejected.
        assert_eq!(running.wait().unwrap(), "100");
        assert_eq!(queued.wait(), Err(PoolError::ShuttingDown));
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(pool.live_workers(), 0);
    }

    #[test]
    fn test_submit_after_shutdown_rejected() {
        let pool = WorkerPool::with_compiler(config(1, 10, 1), echo_compiler());
        pool.shutdown();
        assert!(matches!(pool.submit("x"), Err(PoolError::ShuttingDown)));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let pool = WorkerPool::with_compiler(config(2, 10, 4), echo_compiler());
        let done = pool.submit("x").unwrap();
        assert_eq!(done.wait().unwrap(), "compiled:x");
        pool.shutdown();
        pool.shutdown();
        assert_eq!(pool.live_workers(), 0);
    }
}
