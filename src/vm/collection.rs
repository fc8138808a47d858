use crate::util::opaque_pointer::*;
use crate::vm::VMBinding;
use crate::worker::IncineratorWorker;

/// An operation that must run while every mutator is paused at a safepoint.
///
/// The VM runs it through [`Collection::execute_at_safepoint`]: it calls
/// [`SafepointOperation::prologue`] first, before pausing the world, and skips the operation if
/// the prologue returns false. Otherwise it brings every mutator to a safepoint, calls
/// [`SafepointOperation::run`], resumes the mutators and finally calls
/// [`SafepointOperation::epilogue`].
pub trait SafepointOperation: Send {
    /// Prepare the operation. Returning false cancels it.
    fn prologue(&mut self, _tls: VMWorkerThread) -> bool {
        true
    }

    /// The body of the operation. Called with the world paused.
    fn run(&mut self, tls: VMWorkerThread);

    /// Clean up after the world has been resumed.
    fn epilogue(&mut self, _tls: VMWorkerThread) {}
}

/// VM-specific methods for pausing the world and for the incinerator worker thread.
pub trait Collection<VM: VMBinding> {
    /// Run `op` with the world paused, following the protocol described in
    /// [`SafepointOperation`]. This function returns after the operation has completed or has
    /// been cancelled by its prologue.
    ///
    /// Arguments:
    /// * `tls`: The thread pointer for the incinerator worker.
    /// * `op`: The operation to run.
    fn execute_at_safepoint(tls: VMWorkerThread, op: &mut dyn SafepointOperation);

    /// Return true if the world is currently paused at a safepoint.
    fn is_at_safepoint() -> bool;

    /// Make the heap parsable so that [`crate::vm::Scanning::enumerate_objects`] can visit
    /// every object, for example by filling the unused tails of thread-local allocation buffers.
    /// Called at a safepoint before each heap walk.
    fn ensure_heap_parsable(_tls: VMWorkerThread) {}

    /// Ask the VM to spawn the incinerator worker thread. The VM should create a thread that
    /// the VM is aware of (so it can be paused at safepoints and can own monitors), and call
    /// [`crate::memory_manager::start_worker`] on it, passing `worker` through.
    ///
    /// This is called from [`crate::memory_manager::initialize`], which blocks until the new
    /// thread has reported whether [`Collection::prepare_worker_thread`] succeeded.
    ///
    /// Arguments:
    /// * `tls`: The thread pointer for the caller of `initialize`.
    /// * `worker`: The worker to run on the new thread.
    fn spawn_worker_thread(tls: VMThread, worker: Box<IncineratorWorker<VM>>);

    /// First-time setup on the new worker thread, such as creating the managed object that
    /// represents the thread. Returning false aborts the worker before its first pass.
    fn prepare_worker_thread(_tls: VMWorkerThread) -> bool {
        true
    }
}
