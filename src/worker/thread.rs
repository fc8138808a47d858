use std::time::Duration;

use super::requester::PassRequester;
use super::WorkerStartError;
use crate::heap_walker::{HeapWalkOperation, HeapWalker};
use crate::incinerator::Incinerator;
use crate::staleness::PassStats;
use crate::util::log::{debug, error, info, warn};
use crate::util::{VMThread, VMWorkerThread};
use crate::vm::Collection;
use crate::vm::VMBinding;

/// The thread-local part of the incinerator worker. The VM passes it from
/// [`Collection::spawn_worker_thread`] to [`crate::memory_manager::start_worker`] on the new
/// thread.
pub struct IncineratorWorker<VM: VMBinding> {
    /// The VM-specific thread-local storage for this worker.
    pub tls: VMWorkerThread,
    incinerator: &'static Incinerator<VM>,
    /// The walker of whole-heap passes.
    walker: HeapWalker<VM>,
    /// The walker of the exclusion walks nested in a pass.
    exclusion_walker: HeapWalker<VM>,
}

impl<VM: VMBinding> IncineratorWorker<VM> {
    pub(crate) fn new(incinerator: &'static Incinerator<VM>) -> Box<Self> {
        let capacity = incinerator.get_options().worklist_capacity;
        Box::new(Self {
            tls: VMWorkerThread(VMThread::UNINITIALIZED),
            incinerator,
            walker: HeapWalker::new(capacity),
            exclusion_walker: HeapWalker::new(capacity),
        })
    }

    pub fn incinerator(&self) -> &'static Incinerator<VM> {
        self.incinerator
    }

    /// The entry point of the worker thread. Runs until the worker is stopped.
    pub fn run(&mut self, tls: VMWorkerThread) {
        self.tls = tls;
        let incinerator = self.incinerator;
        let requester = &incinerator.requester;

        if requester.is_stop_pending() {
            requester.report_start(Err(WorkerStartError::StoppedBeforeStart));
            return;
        }
        if !VM::VMCollection::prepare_worker_thread(tls) {
            warn!("The VM failed to prepare the incinerator worker thread");
            requester.report_start(Err(WorkerStartError::PreparationFailed));
            return;
        }
        requester.report_start(Ok(()));
        let _exit = WorkerExit(requester);

        info!("Incinerator worker started");
        let delay = Duration::from_millis(incinerator.get_options().pass_delay_ms);
        loop {
            debug!("Incinerator worker waiting for a trigger");
            if !requester.wait_for_request() {
                break;
            }
            // Let producers that mark several loaders in a row finish before the pass.
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            if !requester.on_pass_started() {
                break;
            }
            let stats = self.run_pass();
            requester.on_pass_finished(stats);
        }
    }

    /// Run one pass at a safepoint and return its counters.
    pub fn run_pass(&mut self) -> PassStats {
        let defer = self.incinerator.get_options().defer_for_finalization;
        let mut pass = self
            .incinerator
            .staleness
            .begin_pass(&mut self.exclusion_walker, defer);
        {
            let mut op = HeapWalkOperation::new(&mut self.walker, &mut pass, None);
            VM::VMCollection::execute_at_safepoint(self.tls, &mut op);
        }
        *pass.stats()
    }
}

/// Tells the requester that the worker has left its loop, including when a binding callback
/// panics on the worker thread, so that `stop` does not wait forever.
struct WorkerExit<'a>(&'a PassRequester);

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!("Incinerator worker panicked");
        }
        self.0.on_worker_exited();
    }
}
