// src/scheduler.rs
//! Background refresh: one thread, one cycle at a time.
//!
//! Idle → Running on each tick, Running → Idle when the cycle returns, whatever it
//! returned. The wait for the next tick only starts after a cycle ends, so cycles
//! can never overlap. Errors and panics inside a cycle are logged and swallowed;
//! the previously published board and artifact stay authoritative.
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::pipeline::Pipeline;
use crate::progress::NullProgress;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// How one cycle ended, as seen from the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Published,
    Failed,
    Panicked,
}

pub struct Scheduler {
    pipeline: Pipeline,
    interval: Duration,
}

#[derive(Default)]
struct Shared {
    running: AtomicBool,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

pub struct SchedulerHandle {
    stop_tx: Option<mpsc::Sender<()>>,
    join: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl Scheduler {
    pub fn new(pipeline: Pipeline, interval: Duration) -> Self {
        Self { pipeline, interval }
    }

    /// Run the first cycle right away, then one per interval, on a dedicated thread.
    pub fn spawn(self) -> io::Result<SchedulerHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let shared = Arc::new(Shared::default());
        let worker = Arc::clone(&shared);

        let join = thread::Builder::new()
            .name(s!("refresh"))
            .spawn(move || self.run(stop_rx, &worker))?;

        Ok(SchedulerHandle { stop_tx: Some(stop_tx), join: Some(join), shared })
    }

    fn run(self, stop_rx: mpsc::Receiver<()>, shared: &Shared) {
        logf!("Scheduler: started, interval {:?}", self.interval);
        loop {
            shared.running.store(true, Ordering::SeqCst);
            let outcome = run_guarded(&self.pipeline);
            if outcome != CycleOutcome::Published {
                shared.failed.fetch_add(1, Ordering::SeqCst);
            }
            shared.running.store(false, Ordering::SeqCst);
            shared.completed.fetch_add(1, Ordering::SeqCst);

            match stop_rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        logf!("Scheduler: stopped");
    }
}

/// One cycle behind the failure boundary.
pub fn run_guarded(pipeline: &Pipeline) -> CycleOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| pipeline.run_cycle(&mut NullProgress))) {
        Ok(Ok(_)) => CycleOutcome::Published,
        Ok(Err(e)) => {
            loge!("Cycle: failed: {e}; keeping previous leaderboard");
            CycleOutcome::Failed
        }
        Err(_) => {
            loge!("Cycle: panicked; keeping previous leaderboard");
            CycleOutcome::Panicked
        }
    }
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        if self.shared.running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Cycles finished so far, successful or not.
    pub fn cycles_completed(&self) -> usize {
        self.shared.completed.load(Ordering::SeqCst)
    }

    pub fn cycles_failed(&self) -> usize {
        self.shared.failed.load(Ordering::SeqCst)
    }

    /// Ask the thread to stop and wait for it. A running cycle is allowed to finish.
    pub fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.join_thread();
    }

    /// Block until the scheduler thread exits (it only does after `stop` or a dropped handle).
    pub fn wait(mut self) {
        self.join_thread();
    }

    fn join_thread(&mut self) {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                loge!("Scheduler: thread panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        // closing the channel stops the loop at its next wait
        self.stop_tx.take();
    }
}
