use crate::util::ObjectReference;
use crate::util::VMThread;
use crate::util::VMWorkerThread;
use crate::vm::slot::Slot;
use crate::vm::VMBinding;

use strum_macros::{Display, EnumIter};

/// Callback trait of scanning functions that report slots and objects.
pub trait SlotVisitor<SL: Slot> {
    /// Call this function for each slot.
    fn visit_slot(&mut self, slot: SL);

    /// Call this function for each object the VM discovers without going through a slot, such as
    /// the mirror object of a type or the object of a loader reached from its runtime data.
    fn visit_object(&mut self, object: ObjectReference);
}

/// The providers of root slots.
///
/// The heap walker asks its listener about each provider before scanning it, so a listener can
/// leave out roots whose referents it must not touch, such as lock records on thread stacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, Display, enum_map::Enum)]
pub enum RootKind {
    /// Global handles created by native code.
    GlobalHandles,
    /// Always-reachable types and loaders from the type registry.
    TypeRegistry,
    /// Objects associated with inflated monitors.
    InflatedMonitors,
    /// Other runtime-global objects, such as preallocated exceptions.
    Universe,
    /// References embedded in compiled code.
    CompiledCode,
    /// Frames on a thread's stack.
    ThreadStack,
    /// Handles owned by a thread.
    ThreadHandles,
    /// Lock records on a thread's stack that point to locked objects.
    LockRecords,
}

impl RootKind {
    /// Is this a provider that is scanned once per thread?
    pub const fn is_per_thread(self) -> bool {
        matches!(
            self,
            RootKind::ThreadStack | RootKind::ThreadHandles | RootKind::LockRecords
        )
    }
}

/// A thread whose roots are scanned, together with the object that represents the thread in
/// the managed heap. Roots of the thread are reported with that object as their referent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VisibleThread {
    /// The thread.
    pub tls: VMThread,
    /// The managed object of the thread, if it has one.
    pub thread_object: Option<ObjectReference>,
}

/// VM-specific methods for scanning roots and objects.
pub trait Scanning<VM: VMBinding> {
    /// Delegated scanning of an object, visiting each reference field encountered, and
    /// each object reachable without a field (for example, the mirror of its type).
    ///
    /// Arguments:
    /// * `tls`: The VM-specific thread-local storage for the current worker.
    /// * `object`: The object to be scanned.
    /// * `slot_visitor`: Called back for each field and each slot-less reference.
    fn scan_object<SV: SlotVisitor<VM::VMSlot>>(
        tls: VMWorkerThread,
        object: ObjectReference,
        slot_visitor: &mut SV,
    );

    /// Scan one global root provider. `kind` is never a per-thread kind.
    ///
    /// Arguments:
    /// * `tls`: The VM-specific thread-local storage for the current worker.
    /// * `kind`: The provider to scan.
    /// * `slot_visitor`: Called back for each root slot and each root object.
    fn scan_roots<SV: SlotVisitor<VM::VMSlot>>(
        tls: VMWorkerThread,
        kind: RootKind,
        slot_visitor: &mut SV,
    );

    /// Return the threads whose roots should be scanned. Exiting threads and threads hidden
    /// from external view should not be included.
    fn visible_threads() -> Vec<VisibleThread>;

    /// Scan one per-thread root provider of `thread`. `kind` is always a per-thread kind.
    ///
    /// Arguments:
    /// * `tls`: The VM-specific thread-local storage for the current worker.
    /// * `thread`: The thread whose roots are scanned.
    /// * `kind`: The provider to scan.
    /// * `slot_visitor`: Called back for each root slot and each root object.
    fn scan_thread_roots<SV: SlotVisitor<VM::VMSlot>>(
        tls: VMWorkerThread,
        thread: VMThread,
        kind: RootKind,
        slot_visitor: &mut SV,
    );

    /// Visit every object in the heap, reachable or not. The heap has been made parsable with
    /// [`crate::vm::Collection::ensure_heap_parsable`] before this is called.
    fn enumerate_objects<F: FnMut(ObjectReference)>(tls: VMWorkerThread, visitor: F);
}
