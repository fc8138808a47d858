//! Incinerator-to-VM interface: the VMBinding trait.
//!
//! This module provides VM-specific traits that serve as interfaces for the VM. A VM binding
//! needs to create a type that implements [`VMBinding`], and implement the collaborator traits
//! associated with it.
//!
//! The incinerator does not know how objects, roots, safepoints or monitors are represented in
//! the VM. It reaches all of them through the static methods of these traits, for example
//! `VM::VMObjectModel::loader_of(object)`.

mod collection;
mod object_model;
mod scanning;
pub mod slot;
mod synchronization;
mod vmbinding;

pub use self::collection::Collection;
pub use self::collection::SafepointOperation;
pub use self::object_model::ObjectModel;
pub use self::scanning::RootKind;
pub use self::scanning::Scanning;
pub use self::scanning::SlotVisitor;
pub use self::scanning::VisibleThread;
pub use self::synchronization::Synchronization;
pub use self::vmbinding::VMBinding;

#[cfg(test)]
mod tests;
