// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2025.

//! Wrapper type for references to memory-mapped registers.

use core::ops::Deref;

/// A pointer to statically allocated mutable data, such as a peripheral
/// register block.
///
/// This is a simple wrapper around a raw pointer that encapsulates an
/// unsafe dereference in a way that ensures a certain type of access
/// pattern: the lifetime of the returned reference is `'static`, which is
/// correct for MMIO registers that exist for the life of the program.
#[derive(Debug)]
pub struct StaticRef<T> {
    ptr: *const T,
}

impl<T> StaticRef<T> {
    /// Create a new `StaticRef` from a raw pointer
    ///
    /// ## Safety
    ///
    /// - `ptr` must be aligned, non-null, and dereferencable as `T`.
    /// - `*ptr` must be valid for the program duration.
    pub const unsafe fn new(ptr: *const T) -> StaticRef<T> {
        StaticRef { ptr }
    }

    /// Return the raw pointer without dereferencing it. Useful for layout
    /// checks and for handing register addresses to DMA-style consumers.
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }
}

impl<T> Clone for StaticRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StaticRef<T> {}

impl<T> PartialEq for StaticRef<T> {
    fn eq(&self, other: &StaticRef<T>) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for StaticRef<T> {}

impl<T: 'static> Deref for StaticRef<T> {
    type Target = T;
    fn deref(&self) -> &'static T {
        unsafe { &*self.ptr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deref_reads_through() {
        static WORD: u32 = 0xC0FFEE;
        let reference = unsafe { StaticRef::new(&WORD as *const u32) };
        assert_eq!(*reference, 0xC0FFEE);
        assert_eq!(reference.as_ptr(), &WORD as *const u32);
    }
}
