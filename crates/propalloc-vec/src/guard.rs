// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::ptr;

/// Tracks values written past a vector's length.
///
/// Dropping the guard drops everything written so far, which is what
/// happens when producing the next value panics. [`commit`](Self::commit)
/// hands the values over to the vector instead.
pub(crate) struct Rollback<T> {
    base: *mut T,
    start: usize,
    built: usize,
}

impl<T> Rollback<T> {
    #[inline]
    pub(crate) fn new(base: *mut T, start: usize) -> Self {
        Self {
            base,
            start,
            built: 0,
        }
    }

    /// Writes `value` into the next uninitialized slot.
    ///
    /// # Safety
    ///
    /// `base` must have capacity for `start + built + 1` elements.
    #[inline]
    pub(crate) unsafe fn push(&mut self, value: T) {
        // SAFETY (PRECONDITIONS ARE MET): the slot is in bounds and uninitialized.
        unsafe { self.base.add(self.start + self.built).write(value) };
        self.built += 1;
    }

    /// Returns how many values were written; they now belong to the caller.
    #[inline]
    pub(crate) fn commit(self) -> usize {
        let built = self.built;
        core::mem::forget(self);
        built
    }
}

impl<T> Drop for Rollback<T> {
    fn drop(&mut self) {
        if self.built == 0 {
            return;
        }

        // SAFETY (PRECONDITIONS ARE MET): exactly `built` values were written
        // starting at `start` and nobody else owns them.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.base.add(self.start),
                self.built,
            ));
        }
    }
}
