//! Utilities used by other modules, including addresses, options, logging and test helpers.

/// Address and object reference.
pub mod address;
/// Logger initialization.
pub mod logger;
/// Wrappers of the logging macros.
pub(crate) mod log;
/// Opaque pointers to VM data.
pub mod opaque_pointer;
/// Run-time options.
pub mod options;
/// Test utilities, including the mock VM.
#[cfg(any(test, feature = "mock_test"))]
pub mod test_util;

pub use self::address::Address;
pub use self::address::ObjectReference;
pub use self::opaque_pointer::*;
