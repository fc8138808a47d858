//! The staleness engine.
//!
//! A class loader is *stale* once the application has retired it, even though its types and
//! instances may still be reachable. The engine keeps the set of stale loaders, and in each pass
//! clears every reference into a stale loader's objects, except for references the VM's GC
//! or a pending finalizer still needs:
//!
//! * references found through a weak reference object are left for the GC;
//! * references from a finalizer record to a finalizable object are kept;
//! * references reachable from a finalizable object that has only been reached through
//!   finalizer records are kept until a later pass, since its finalizer may still run.

mod finalizable;
mod loader_sets;
mod pass;
mod stale_reference;

pub use self::finalizable::FinalizableReachability;
pub use self::loader_sets::StaleLoaderSets;
pub use self::pass::PassStats;
pub use self::pass::StaleReferencePass;
pub use self::stale_reference::ResetOutcome;
pub use self::stale_reference::StaleReference;

use crate::heap_walker::HeapWalker;
use crate::util::log::info;
use crate::util::ObjectReference;
use crate::vm::ObjectModel;
use crate::vm::VMBinding;

/// The thread-safe state of the staleness engine: the stale loader sets.
pub struct StalenessEngine<VM: VMBinding> {
    loaders: StaleLoaderSets<VM::VMLoader>,
}

impl<VM: VMBinding> Default for StalenessEngine<VM> {
    fn default() -> Self {
        Self::new()
    }
}

impl<VM: VMBinding> StalenessEngine<VM> {
    pub fn new() -> Self {
        Self {
            loaders: StaleLoaderSets::new(),
        }
    }

    pub fn loaders(&self) -> &StaleLoaderSets<VM::VMLoader> {
        &self.loaders
    }

    /// Mark `loader` stale. It takes effect at the start of the next pass. Returns false, with
    /// no effect, if `loader` is `None`.
    pub fn mark_loader_stale(&self, loader: Option<VM::VMLoader>) -> bool {
        let Some(loader) = loader else {
            return false;
        };
        info!("Class loader marked stale: {:?}", loader);
        self.loaders.add_incoming(loader);
        true
    }

    /// Forget `loader`, which the VM is unloading. No-op if it was never marked stale.
    pub fn notify_loader_unloaded(&self, loader: VM::VMLoader) {
        if self.loaders.remove(loader) {
            info!("Stale class loader unloading: {:?}", loader);
        }
    }

    /// Is `object` defined by a committed stale loader? Can be called from any thread.
    /// Loaders marked stale since the start of the last pass are not considered.
    pub fn is_stale(&self, object: ObjectReference) -> bool {
        if self.loaders.is_committed_empty() {
            return false;
        }
        VM::VMObjectModel::loader_of(object).is_some_and(|loader| self.loaders.is_committed(loader))
    }

    /// Create the listener for one pass.
    pub(crate) fn begin_pass<'a>(
        &'a self,
        exclusion_walker: &'a mut HeapWalker<VM>,
        defer_for_finalization: bool,
    ) -> StaleReferencePass<'a, VM> {
        StaleReferencePass::new(self, exclusion_walker, defer_for_finalization)
    }
}
