use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};

use super::{WorkerStartError, WorkerState};
use crate::staleness::PassStats;
use crate::util::log::debug;

pub(crate) struct WorkerSync {
    /// Has a pass been requested (and not yet completed)?
    pub(crate) requested: bool,
    pub(crate) state: WorkerState,
    /// Is there a worker thread, or one being started?
    pub(crate) running: bool,
    pub(crate) stop_pending: bool,
    /// Set by the new worker thread to tell `start` whether it came up.
    pub(crate) start_report: Option<Result<(), WorkerStartError>>,
    pub(crate) last_pass: Option<PassStats>,
}

/// The state shared between the incinerator worker and the threads that trigger, start or stop
/// it.
pub struct PassRequester {
    sync: Mutex<WorkerSync>,
    cond: Condvar,
    /// Mirrors `WorkerSync::requested` so repeated triggers return without taking the lock.
    request_flag: AtomicBool,
    passes_completed: AtomicUsize,
}

impl Default for PassRequester {
    fn default() -> Self {
        Self::new()
    }
}

impl PassRequester {
    pub fn new() -> Self {
        Self {
            sync: Mutex::new(WorkerSync {
                requested: false,
                state: WorkerState::Idle,
                running: false,
                stop_pending: false,
                start_report: None,
                last_pass: None,
            }),
            cond: Condvar::new(),
            request_flag: AtomicBool::new(false),
            passes_completed: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkerSync> {
        self.sync.lock().unwrap()
    }

    /// Request a pass. Does nothing if a pass has already been requested and not completed.
    pub fn request(&self) {
        if self.request_flag.load(Ordering::Relaxed) {
            return;
        }

        let mut guard = self.lock();
        // Note: This is the double-checked locking algorithm.
        // The flag is only used to drop successive requests. The state it guards is read under
        // the lock.
        if !guard.requested {
            guard.requested = true;
            self.request_flag.store(true, Ordering::Relaxed);
            if guard.state == WorkerState::Idle {
                guard.state = WorkerState::Triggered;
            }
            self.cond.notify_all();
        }
    }

    /// Called by the worker. Block until a pass is requested or the worker is asked to stop.
    /// Returns false if the worker should stop.
    pub(crate) fn wait_for_request(&self) -> bool {
        let mut guard = self.lock();
        while !guard.requested && !guard.stop_pending {
            guard = self.cond.wait(guard).unwrap();
        }
        !guard.stop_pending
    }

    /// Called by the worker right before it executes a pass. Returns false if the worker should
    /// stop instead.
    pub(crate) fn on_pass_started(&self) -> bool {
        let mut guard = self.lock();
        if guard.stop_pending {
            return false;
        }
        guard.state = WorkerState::Walking;
        self.cond.notify_all();
        true
    }

    /// Called by the worker when a pass has finished. Clears the request so the next trigger
    /// requests a new pass.
    pub(crate) fn on_pass_finished(&self, stats: PassStats) {
        let mut guard = self.lock();
        guard.requested = false;
        self.request_flag.store(false, Ordering::Relaxed);
        guard.state = WorkerState::Idle;
        guard.last_pass = Some(stats);
        self.passes_completed.fetch_add(1, Ordering::SeqCst);
        self.cond.notify_all();
    }

    /// Reserve the worker slot before spawning a thread.
    pub(crate) fn on_start_requested(&self) -> Result<(), WorkerStartError> {
        let mut guard = self.lock();
        if guard.running {
            return Err(WorkerStartError::AlreadyRunning);
        }
        guard.running = true;
        guard.stop_pending = false;
        guard.start_report = None;
        Ok(())
    }

    /// Called on the new worker thread once it knows whether it can run.
    pub(crate) fn report_start(&self, report: Result<(), WorkerStartError>) {
        let mut guard = self.lock();
        if report.is_err() {
            guard.running = false;
        }
        guard.start_report = Some(report);
        self.cond.notify_all();
    }

    /// Block until the new worker thread has reported.
    pub(crate) fn wait_for_start_report(&self) -> Result<(), WorkerStartError> {
        let mut guard = self.lock();
        loop {
            if let Some(report) = guard.start_report.take() {
                return report;
            }
            guard = self.cond.wait(guard).unwrap();
        }
    }

    /// Is the worker asked to stop?
    pub(crate) fn is_stop_pending(&self) -> bool {
        self.lock().stop_pending
    }

    /// Called by the worker when it leaves its loop.
    pub(crate) fn on_worker_exited(&self) {
        let mut guard = self.lock();
        guard.running = false;
        guard.stop_pending = false;
        guard.state = WorkerState::Idle;
        self.cond.notify_all();
        debug!("Incinerator worker exited");
    }

    /// Ask the worker to stop, and block until it has left its loop. A pass in progress is
    /// completed first. Does nothing if no worker is running.
    pub fn stop(&self) {
        let mut guard = self.lock();
        if !guard.running {
            return;
        }
        guard.stop_pending = true;
        self.cond.notify_all();
        while guard.running {
            guard = self.cond.wait(guard).unwrap();
        }
    }

    pub fn state(&self) -> WorkerState {
        self.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn passes_completed(&self) -> usize {
        self.passes_completed.load(Ordering::SeqCst)
    }

    /// Counters of the last completed pass.
    pub fn last_pass_stats(&self) -> Option<PassStats> {
        self.lock().last_pass
    }
}
