use crate::util::Address;
use libc::c_void;

/// OpaquePointer represents pointers that the incinerator needs to know about but will not
/// dereference. For example, a pointer to a VM thread is an opaque pointer.
/// The type does not provide any method for dereferencing.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OpaquePointer(*mut c_void);

// We never really dereference an opaque pointer in this crate.
unsafe impl Sync for OpaquePointer {}
unsafe impl Send for OpaquePointer {}

impl Default for OpaquePointer {
    fn default() -> Self {
        Self::UNINITIALIZED
    }
}

impl OpaquePointer {
    /// Represents an uninitialized value for [`OpaquePointer`].
    pub const UNINITIALIZED: Self = Self(std::ptr::null_mut());

    /// Cast an [`Address`] type to an [`OpaquePointer`].
    pub fn from_address(addr: Address) -> Self {
        OpaquePointer(addr.to_mut_ptr::<c_void>())
    }
}

/// A VMThread is an opaque pointer that can uniquely identify a thread in the VM.
/// A VM binding may use thread pointers or thread IDs as VMThreads.
/// This is used as arguments in the VM-to-incinerator APIs, and the incinerator may store it
/// and pass it back through the binding traits, so the VM knows the context.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VMThread(pub OpaquePointer);

impl VMThread {
    /// Represents an uninitialized value for [`VMThread`].
    pub const UNINITIALIZED: Self = Self(OpaquePointer::UNINITIALIZED);
}

/// A VMWorkerThread is the VMThread the incinerator worker runs on.
/// When a VMWorkerThread is used as an argument, it generally means the function is executed
/// in the context of the incinerator worker.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VMWorkerThread(pub VMThread);
