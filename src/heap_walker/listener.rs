use crate::util::ObjectReference;
use crate::util::VMWorkerThread;
use crate::vm::RootKind;
use crate::vm::VMBinding;

/// Receives everything a [`crate::heap_walker::HeapWalker`] discovers.
///
/// Every callback receives the `referent`: the object through which the discovery was made.
/// It is `None` for global roots and for the root of a rooted walk, the thread's own object
/// for the roots of a thread, and the scanned object for its fields.
pub trait HeapWalkerListener<VM: VMBinding> {
    /// Called at the start of a walk, before any root is scanned.
    fn prologue(&mut self, _tls: VMWorkerThread) {}

    /// Should the walker scan the roots of this provider? Asked once per provider and walk.
    fn accepts_roots_from(&self, _kind: RootKind) -> bool {
        true
    }

    /// An object was discovered without a slot. Reported on every discovery, whether or not
    /// the object has been visited before.
    fn object_found(&mut self, object: ObjectReference, referent: Option<ObjectReference>);

    /// A non-empty wide slot holding `target` was discovered.
    fn reference_found(
        &mut self,
        slot: VM::VMSlot,
        target: ObjectReference,
        referent: Option<ObjectReference>,
    );

    /// A non-empty narrow slot holding `target` was discovered.
    fn narrow_reference_found(
        &mut self,
        slot: VM::VMSlot,
        target: ObjectReference,
        referent: Option<ObjectReference>,
    );

    /// Called at the end of a walk, after every visited header has been restored.
    fn epilogue(&mut self, _tls: VMWorkerThread) {}
}
