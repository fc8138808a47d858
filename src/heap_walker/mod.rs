//! The heap walker: a root-driven tracer over the managed heap.
//!
//! A walk starts either from the VM's roots or from a single object, visits each reachable
//! object once, and reports every discovered object and reference to a
//! [`HeapWalkerListener`] together with the object it was discovered through. The visited
//! marker is kept in object headers and is fully removed before the walk returns.

mod listener;
pub mod mark_ledger;
mod operation;
mod walker;

pub use self::listener::HeapWalkerListener;
pub use self::operation::HeapWalkOperation;
pub use self::walker::HeapWalker;
pub use self::walker::WalkStats;
