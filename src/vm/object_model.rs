use crate::util::ObjectReference;
use crate::vm::VMBinding;

/// VM-specific methods for the incinerator to query object types and to use the header word
/// as a visited marker.
///
/// The header word is treated as an opaque `usize`. During a heap walk the incinerator
/// overwrites the header of each visited object with [`ObjectModel::visited_header`], and
/// restores every header before the walk returns: headers that carried information are saved
/// and replayed verbatim, and all others are reset to [`ObjectModel::default_header`].
///
/// Note that depending on the selected collector, the header may also be used by the VM's
/// own GC. All the methods in this trait are only called while the VM is at a safepoint, except
/// [`ObjectModel::loader_of`], which is also called by [`crate::memory_manager::is_stale`].
pub trait ObjectModel<VM: VMBinding> {
    /// Return the class loader that defined the type of `object`. The bootstrap loader, if the
    /// VM does not represent it as a loader value, is `None`; objects of such types are never
    /// stale.
    ///
    /// Arguments:
    /// * `object`: The object to be queried.
    fn loader_of(object: ObjectReference) -> Option<VM::VMLoader>;

    /// Return true if the type of `object` declares a non-trivial finalizer.
    fn has_finalizer(object: ObjectReference) -> bool;

    /// Return true if `object` is a weak reference object. References found in fields of a
    /// weak reference object are left for the VM's GC to handle.
    fn is_weak_reference(object: ObjectReference) -> bool;

    /// Return true if `object` is one of the VM's finalizer records, that is, the object the VM
    /// uses to keep a finalizable object alive until its finalizer has run.
    fn is_finalizer_record(object: ObjectReference) -> bool;

    /// Load the header word of `object`.
    fn load_header(object: ObjectReference) -> usize;

    /// Store `header` into the header word of `object`.
    fn store_header(object: ObjectReference, header: usize);

    /// Return true if `header` carries the visited marker.
    fn is_marked_header(header: usize) -> bool;

    /// The header word written into an object when it is visited.
    /// [`ObjectModel::is_marked_header`] must return true for it.
    fn visited_header() -> usize;

    /// The header word a fresh object of the type of `object` would have.
    /// [`ObjectModel::is_marked_header`] must return false for it.
    fn default_header(object: ObjectReference) -> usize;

    /// Return true if `header` carries information (a hash code, a lock, an age or a bias)
    /// that would be lost if the header were reset to [`ObjectModel::default_header`].
    fn header_must_be_preserved(object: ObjectReference, header: usize) -> bool;
}
