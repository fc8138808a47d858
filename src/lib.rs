//! The incinerator eliminates dangling references into retired class loaders.
//!
//! When an application retires a class loader (for example, when a plugin is undeployed), the
//! types and instances of that loader can stay reachable for a long time through stray
//! references, and stale code may keep running through them. The incinerator severs those
//! references while the objects are still reachable, so that the VM's GC can reclaim them later
//! and stale code can never be reached again.
//!
//! The crate has three parts:
//! * the [heap walker](heap_walker/index.html), which traces the managed heap at a safepoint
//!   and reports every discovered object and reference to a listener;
//! * the [staleness engine](staleness/index.html), the listener that decides which
//!   references are cleared, sparing weak references and objects pending finalization;
//! * the [worker](worker/index.html), a background thread that runs one pass per trigger.
//!
//! A VM uses the incinerator by implementing [`vm::VMBinding`] and its collaborator traits,
//! and by calling the functions in [`memory_manager`].

#[macro_use]
extern crate lazy_static;

mod incinerator;
pub use crate::incinerator::Incinerator;
pub use crate::incinerator::IncineratorBuilder;

pub mod heap_walker;
pub mod memory_manager;
pub mod staleness;
pub mod util;
pub mod vm;
pub mod worker;
