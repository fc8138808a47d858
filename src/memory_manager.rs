//! VM-to-incinerator interface: safe Rust APIs.
//!
//! This module provides a safe Rust API for the incinerator.
//! We expect the VM binding to inherit and extend this API by:
//! 1. adding their VM-specific functions, such as resolving a loader from a managed object
//! 2. exposing the functions to native if necessary. And the VM binding needs to manage the
//!    unsafety for exposing this safe API to FFI.

use crate::incinerator::{Incinerator, IncineratorBuilder};
use crate::util::log::debug;
use crate::util::opaque_pointer::*;
use crate::util::ObjectReference;
use crate::vm::VMBinding;
use crate::worker::{IncineratorWorker, WorkerState};

/// Create an incinerator instance.
///
/// We expect a binding to initialize the incinerator in the following steps:
///
/// 1. Create an [`IncineratorBuilder`] instance.
/// 2. Set options for the builder by [`process`].
/// 3. Create the instance by calling this function and pass the builder. Usually a binding
///    stores the instance in a static, for example with `Box::leak`, as the worker needs a
///    `'static` reference to it.
/// 4. Start the worker by [`initialize`] once the thread system of the VM is ready.
///
/// Note that this method will attempt to initialize a logger. If the VM would like to use its
/// own logger, it should initialize the logger before calling this method.
///
/// Arguments:
/// * `builder`: The reference to an incinerator builder.
pub fn incinerator_init<VM: VMBinding>(builder: &IncineratorBuilder) -> Box<Incinerator<VM>> {
    match crate::util::logger::try_init() {
        Ok(_) => debug!("The incinerator initialized the logger."),
        Err(_) => debug!(
            "The incinerator failed to initialize the logger. Possibly a logger has been initialized by user."
        ),
    }
    Box::new(builder.build())
}

/// Process an incinerator option. Return true if the option is processed successfully.
///
/// Arguments:
/// * `builder`: A reference to an incinerator builder.
/// * `name`: The name of the option.
/// * `value`: The value of the option (as a string).
pub fn process(builder: &mut IncineratorBuilder, name: &str, value: &str) -> bool {
    builder.set_option(name, value)
}

/// Process multiple incinerator options. Returns true if all the options are processed
/// successfully.
///
/// Arguments:
/// * `builder`: A reference to an incinerator builder.
/// * `options`: a string that is key value pairs separated by white spaces, e.g.
///   "pass_delay_ms=0 defer_for_finalization=false"
pub fn process_bulk(builder: &mut IncineratorBuilder, options: &str) -> bool {
    builder.set_options_bulk_by_str(options)
}

/// Start the incinerator worker. This will invoke `Collection::spawn_worker_thread()` and block
/// until the new thread has run `Collection::prepare_worker_thread()`.
///
/// Returns false without doing anything if the incinerator is disabled by the `enabled` option.
/// Only the first call has an effect. Later calls return the result of the first one.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
/// * `tls`: The thread that starts the incinerator. This value will be passed back to the VM in
///   `Collection::spawn_worker_thread()` so that the VM knows the context.
pub fn initialize<VM: VMBinding>(incinerator: &'static Incinerator<VM>, tls: VMThread) -> bool {
    incinerator.initialize(tls)
}

/// Run the main loop of the incinerator worker. This method returns when the worker is stopped
/// by [`shutdown`], or right away if the worker cannot start.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
/// * `tls`: The thread that will be used as the incinerator worker.
/// * `worker`: The context of the worker thread.
///   It is the `IncineratorWorker` passed to `Collection::spawn_worker_thread`.
pub fn start_worker<VM: VMBinding>(
    incinerator: &'static Incinerator<VM>,
    tls: VMWorkerThread,
    worker: &mut IncineratorWorker<VM>,
) {
    debug_assert!(
        std::ptr::eq(incinerator, worker.incinerator()),
        "The worker belongs to another incinerator instance"
    );
    worker.run(tls);
}

/// Mark a class loader stale. References to objects of its types are cleared from the next pass
/// on. This does not trigger a pass. Returns false if `loader` is `None`.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
/// * `loader`: The loader to retire.
pub fn mark_loader_stale<VM: VMBinding>(
    incinerator: &Incinerator<VM>,
    loader: Option<VM::VMLoader>,
) -> bool {
    incinerator.staleness.mark_loader_stale(loader)
}

/// Tell the incinerator that a loader is being unloaded by the VM, so it is forgotten.
/// The VM should call this for every loader it unloads, stale or not.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
/// * `loader`: The loader being unloaded.
pub fn notify_loader_unloaded<VM: VMBinding>(incinerator: &Incinerator<VM>, loader: VM::VMLoader) {
    incinerator.staleness.notify_loader_unloaded(loader)
}

/// Is the object defined by a stale loader? Loaders marked stale after the start of the last
/// pass are not considered. This can be called from any thread.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
/// * `object`: The object to query.
pub fn is_stale<VM: VMBinding>(incinerator: &Incinerator<VM>, object: ObjectReference) -> bool {
    incinerator.staleness.is_stale(object)
}

/// Request a pass. Requests made before the requested pass completes are merged into it.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
pub fn trigger<VM: VMBinding>(incinerator: &Incinerator<VM>) {
    incinerator.requester.request();
}

/// Stop the worker. A pass in progress is completed first. This blocks until the worker has
/// left its main loop.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
pub fn shutdown<VM: VMBinding>(incinerator: &Incinerator<VM>) {
    incinerator.requester.stop();
}

/// Return the number of passes the worker has completed.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
pub fn passes_completed<VM: VMBinding>(incinerator: &Incinerator<VM>) -> usize {
    incinerator.passes_completed()
}

/// Return the state of the worker.
///
/// Arguments:
/// * `incinerator`: A reference to an incinerator instance.
pub fn worker_state<VM: VMBinding>(incinerator: &Incinerator<VM>) -> WorkerState {
    incinerator.worker_state()
}
