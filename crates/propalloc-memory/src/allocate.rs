// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::error::AllocError;
use crate::region::Region;

/// Region operations of an allocator adapted to an element layout.
///
/// Only allocators that went through
/// [`require`](crate::Require::require)`(`[`Layout`](crate::Layout)`)`
/// implement this trait: before that they have no element stride to count in.
///
/// # Contract
///
/// - Regions returned by `allocate`/`reallocate` cover at least the requested
///   count. Allocators whose `Query<Overallocation>` is unsatisfied return
///   exactly the requested count.
/// - `deallocate` never fails.
/// - `reallocate` is disabled unless `Query<Reallocation>` is satisfied; the
///   default body reports [`AllocError::Unsupported`] and leaves the region
///   untouched.
pub trait Allocate {
    /// Allocates a region holding at least `count` elements.
    ///
    /// `hint` is either [`Region::EMPTY`] or a region the caller currently
    /// owns and is about to migrate away from. Allocators are free to ignore
    /// it.
    fn allocate(&self, hint: Region, count: usize) -> Result<Region, AllocError>;

    /// Resizes `region` to hold at least `count` elements, preserving its
    /// contents up to the smaller of the two counts.
    ///
    /// On success `region` is consumed and must not be used again. On error
    /// `region` is still valid and unchanged.
    ///
    /// # Safety
    ///
    /// `region` must have been returned by `allocate`/`reallocate` of an
    /// allocator equivalent to `self` and not yet deallocated or consumed.
    unsafe fn reallocate(&self, region: Region, count: usize) -> Result<Region, AllocError> {
        let _ = (region, count);
        Err(AllocError::Unsupported)
    }

    /// Releases `region`.
    ///
    /// # Safety
    ///
    /// `region` must have been returned by `allocate`/`reallocate` of an
    /// allocator equivalent to `self` and not yet deallocated or consumed.
    unsafe fn deallocate(&self, region: Region);
}

/// Whether values of `T` may be relocated by an allocator's raw byte copy,
/// without the owning container running any code for them.
///
/// Types without drop glue own nothing a foreign copy could orphan or
/// duplicate. Types with drop glue are relocated by the container itself.
///
/// # Example
///
/// ```rust
/// use propalloc_memory::is_bitwise_relocatable;
///
/// assert!(is_bitwise_relocatable::<u64>());
/// assert!(is_bitwise_relocatable::<[u8; 16]>());
/// assert!(!is_bitwise_relocatable::<String>());
/// ```
#[inline]
pub const fn is_bitwise_relocatable<T>() -> bool {
    !core::mem::needs_drop::<T>()
}

/// Byte length of `count` elements of `stride` bytes, or
/// [`AllocError::LayoutOverflow`] past `isize::MAX`.
#[inline]
pub(crate) fn byte_len(stride: usize, count: usize) -> Result<usize, AllocError> {
    match stride.checked_mul(count) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(bytes),
        _ => Err(AllocError::LayoutOverflow { count }),
    }
}
