//! This module provides the trait [`Slot`] and related traits and types.

use std::fmt::Debug;
use std::hash::Hash;

use atomic::Atomic;

use crate::util::{Address, ObjectReference};

/// The width of a reference slot.
///
/// A runtime may keep some references in full machine words and others in 32-bit compressed
/// form. The heap walker reports the two kinds through different listener callbacks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotWidth {
    /// The slot holds a full-width reference.
    Wide,
    /// The slot holds a compressed 32-bit reference.
    Narrow,
}

/// A `Slot` represents a slot in an object (a.k.a. a field), on the stack (i.e. a local
/// variable) or any other places (such as global handles and runtime tables), that holds a
/// reference to an object. A slot may be empty, holding no reference at all.
///
/// The incinerator only reads a slot and, when the target is stale, clears it. It never
/// stores a different object into a slot.
///
/// Slots are used as keys of the pending candidate table while a pass runs, so two `Slot`
/// values compare equal iff they denote the same location.
pub trait Slot: Copy + Send + Debug + PartialEq + Eq + Hash {
    /// Load object reference from the slot.
    ///
    /// If the slot is not holding an object reference (for example, if it is holding NULL or a
    /// deleted handle), it should return `None`. Such slots are skipped by the heap walker.
    fn load(&self) -> Option<ObjectReference>;

    /// Clear the slot so that it holds no reference.
    fn clear(&self);

    /// The width of the reference held in this slot.
    fn width(&self) -> SlotWidth;
}

/// A simple slot implementation that represents a word-sized slot which holds the raw address of
/// an `ObjectReference`, or 0 if it is holding NULL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SimpleSlot {
    slot_addr: *mut Atomic<Address>,
}

impl SimpleSlot {
    /// Create a simple slot from an address.
    ///
    /// Arguments:
    /// *   `address`: The address in memory where an `ObjectReference` is stored.
    pub fn from_address(address: Address) -> Self {
        Self {
            slot_addr: address.to_mut_ptr(),
        }
    }

    /// Get the address of the slot.
    ///
    /// Return the address at which the `ObjectReference` is stored.
    pub fn as_address(&self) -> Address {
        Address::from_mut_ptr(self.slot_addr)
    }
}

unsafe impl Send for SimpleSlot {}

impl Slot for SimpleSlot {
    fn load(&self) -> Option<ObjectReference> {
        let addr = unsafe { (*self.slot_addr).load(atomic::Ordering::Relaxed) };
        ObjectReference::from_raw_address(addr)
    }

    fn clear(&self) {
        unsafe { (*self.slot_addr).store(Address::ZERO, atomic::Ordering::Relaxed) }
    }

    fn width(&self) -> SlotWidth {
        SlotWidth::Wide
    }
}

/// The number of low bits dropped from an object address when it is compressed.
/// Objects referenced from narrow slots must be aligned to `1 << LOG_NARROW_SHIFT` bytes.
pub const LOG_NARROW_SHIFT: usize = 3;

/// A 32-bit slot holding a compressed reference relative to a heap base.
///
/// A compressed value `c` denotes the object at `base + (c << LOG_NARROW_SHIFT)`. The value 0
/// denotes NULL, so no object may start exactly at `base`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NarrowSlot {
    slot_addr: *mut Atomic<u32>,
    base: Address,
}

unsafe impl Send for NarrowSlot {}

impl NarrowSlot {
    /// Create a narrow slot at `address` whose values are relative to `base`.
    pub fn from_address(address: Address, base: Address) -> Self {
        debug_assert!(address.is_aligned_to(std::mem::size_of::<u32>()));
        Self {
            slot_addr: address.to_mut_ptr(),
            base,
        }
    }

    /// Get the address of the slot.
    pub fn as_address(&self) -> Address {
        Address::from_mut_ptr(self.slot_addr)
    }

    /// Compress `object` relative to `base`.
    pub fn encode(base: Address, object: ObjectReference) -> u32 {
        let addr = object.to_raw_address();
        debug_assert!(addr > base, "{} is not above the narrow base {}", addr, base);
        debug_assert!(addr.is_aligned_to(1 << LOG_NARROW_SHIFT));
        let compressed = (addr - base) >> LOG_NARROW_SHIFT;
        debug_assert!(compressed <= u32::MAX as usize);
        compressed as u32
    }
}

impl Slot for NarrowSlot {
    fn load(&self) -> Option<ObjectReference> {
        let compressed = unsafe { (*self.slot_addr).load(atomic::Ordering::Relaxed) };
        if compressed == 0 {
            return None;
        }
        ObjectReference::from_raw_address(self.base + ((compressed as usize) << LOG_NARROW_SHIFT))
    }

    fn clear(&self) {
        unsafe { (*self.slot_addr).store(0, atomic::Ordering::Relaxed) }
    }

    fn width(&self) -> SlotWidth {
        SlotWidth::Narrow
    }
}
