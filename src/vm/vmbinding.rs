use std::fmt::Debug;
use std::hash::Hash;

use super::*;

/// The `VMBinding` trait associates with each trait, and provides VM-specific types.
pub trait VMBinding
where
    Self: Sized + 'static + Send + Sync + Default,
{
    /// The binding's implementation of [`crate::vm::ObjectModel`].
    type VMObjectModel: ObjectModel<Self>;
    /// The binding's implementation of [`crate::vm::Scanning`].
    type VMScanning: Scanning<Self>;
    /// The binding's implementation of [`crate::vm::Collection`].
    type VMCollection: Collection<Self>;
    /// The binding's implementation of [`crate::vm::Synchronization`].
    type VMSynchronization: Synchronization<Self>;

    /// The type of slots in this VM.
    type VMSlot: slot::Slot;
    /// The identity of a class loader. Loaders are compared by identity and kept in hash sets,
    /// so this is usually a pointer to the VM's loader data.
    type VMLoader: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    /// A handle to an inflated monitor.
    type VMMonitor: Copy + Debug;
}
