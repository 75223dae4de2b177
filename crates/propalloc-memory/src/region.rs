// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::ptr;

/// An opaque `(pointer, count)` handle to a block of storage.
///
/// A `Region` owns nothing. It is the value allocators hand out and take
/// back; `count` is measured in elements of the layout the allocator was
/// adapted to. A region stays valid until it is passed to
/// [`deallocate`](crate::Allocate::deallocate) or consumed by
/// [`reallocate`](crate::Allocate::reallocate), which invalidates it and
/// returns its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Base address of the block. Null only for [`Region::EMPTY`].
    pub pointer: *mut u8,
    /// Number of elements the block can hold.
    pub count: usize,
}

impl Region {
    /// The region of a container that owns no buffer.
    pub const EMPTY: Region = Region {
        pointer: ptr::null_mut(),
        count: 0,
    };

    /// Creates a region from its parts.
    #[inline]
    pub const fn new(pointer: *mut u8, count: usize) -> Self {
        Self { pointer, count }
    }

    /// A non-null, `align`-aligned region that backs no memory.
    ///
    /// Allocators return it for requests whose byte size is zero; it must
    /// never be handed to the underlying system allocator.
    #[inline]
    pub const fn dangling(align: usize, count: usize) -> Self {
        Self {
            pointer: ptr::without_provenance_mut(align),
            count,
        }
    }

    /// Returns `true` for [`Region::EMPTY`] (null pointer).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pointer.is_null()
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::EMPTY
    }
}
