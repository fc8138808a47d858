use crate::util::ObjectReference;
use crate::util::VMThread;
use crate::util::VMWorkerThread;
use crate::vm::VMBinding;

/// VM-specific methods for the monitors of objects whose references are cleared.
///
/// When the last visible reference to a locked object is cleared, threads waiting on its
/// monitor could never be woken through that object again. Before such a reference is cleared,
/// the incinerator notifies every waiter and releases the lock on behalf of its owner.
/// All the methods are called at a safepoint.
pub trait Synchronization<VM: VMBinding> {
    /// Return the inflated monitor associated with `object`, if any.
    fn monitor_of(object: ObjectReference) -> Option<VM::VMMonitor>;

    /// Return the thread that currently owns `monitor`, if any.
    fn monitor_owner(monitor: VM::VMMonitor) -> Option<VMThread>;

    /// Wake every thread waiting on `monitor`, acting as `owner`.
    fn notify_all(monitor: VM::VMMonitor, owner: VMThread);

    /// Fully release `monitor` held by `owner`, whatever its recursion count. Returns the
    /// number of recursive acquisitions that were released.
    fn complete_exit(monitor: VM::VMMonitor, owner: VMThread) -> usize;

    /// Return idle monitors to the VM's free list. Called once at the end of every pass.
    fn deflate_idle_monitors(_tls: VMWorkerThread) {}
}
