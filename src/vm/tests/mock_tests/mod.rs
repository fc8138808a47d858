// Mock tests can be placed anywhere in the source directory `src`.
// * They need to be conditionally compiled for tests. Otherwise they cannot access `MockVM`.
// * They should have the prefix 'mock_test_' in their file name.

// Common includes for mock tests.
pub(crate) mod mock_test_prelude {
    pub use crate::memory_manager;
    pub use crate::util::test_util::mock_vm::*;
    pub use crate::util::test_util::wait_until;
    pub use crate::util::{ObjectReference, VMThread, VMWorkerThread};
    pub use crate::vm::slot::{Slot, SlotWidth};
    pub use crate::vm::*;
}

mod mock_test_finalization;
mod mock_test_monitors;
mod mock_test_root_filtering;
mod mock_test_stale_references;
mod mock_test_worker;
