// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Property descriptors: the vocabulary a container uses to ask an allocator
//! for optional capabilities.

use core::fmt;
use core::marker::PhantomData;
use core::mem::{align_of, size_of};

/// A compile-time tag naming one optional allocator capability.
///
/// The two flags mirror the marker traits [`Requirable`] and [`Preferable`]:
/// a descriptor implements a marker trait exactly when the matching flag is
/// `true`, so asking for a descriptor the wrong way does not compile.
///
/// **Note:** This trait is NOT dyn-compatible (has associated constants).
pub trait Property: Copy + Default + fmt::Debug {
    /// Whether a caller may mandate support (absence is a build error).
    const IS_REQUIRABLE: bool;

    /// Whether a caller may hint a preference the allocator is free to ignore.
    const IS_PREFERABLE: bool;
}

/// Descriptors usable with [`Require`](crate::Require).
pub trait Requirable: Property {}

/// Descriptors usable with [`Prefer`](crate::Prefer).
pub trait Preferable: Property {}

/// Asks for storage suitable for values of `T` aligned to `ALIGN` bytes.
///
/// `ALIGN == 0` (the default) means the natural alignment of `T`. A non-zero
/// `ALIGN` must be a power of two and is raised to at least `align_of::<T>()`.
///
/// Layout is requirable only: once an allocator commits to an element stride
/// there is no meaningful "best effort" variant of it.
///
/// # Example
///
/// ```rust
/// use propalloc_memory::Layout;
///
/// assert_eq!(Layout::<u64>::ALIGNMENT, core::mem::align_of::<u64>());
/// assert_eq!(Layout::<u8, 64>::ALIGNMENT, 64);
/// assert_eq!(Layout::<u64, 2>::ALIGNMENT, core::mem::align_of::<u64>());
/// ```
pub struct Layout<T, const ALIGN: usize = 0> {
    _marker: PhantomData<fn() -> T>,
}

impl<T, const ALIGN: usize> Layout<T, ALIGN> {
    /// Alignment, in bytes, the allocator must provide for the region base.
    pub const ALIGNMENT: usize = if ALIGN > align_of::<T>() {
        ALIGN
    } else {
        align_of::<T>()
    };

    /// Distance in bytes between consecutive elements.
    pub const STRIDE: usize = size_of::<T>();

    /// Creates the descriptor.
    ///
    /// Fails to build when `ALIGN` is neither zero nor a power of two.
    #[inline]
    pub const fn new() -> Self {
        const {
            assert!(
                ALIGN == 0 || ALIGN.is_power_of_two(),
                "layout alignment must be zero or a power of two"
            )
        };

        Self {
            _marker: PhantomData,
        }
    }
}

impl<T, const ALIGN: usize> Clone for Layout<T, ALIGN> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const ALIGN: usize> Copy for Layout<T, ALIGN> {}

impl<T, const ALIGN: usize> Default for Layout<T, ALIGN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const ALIGN: usize> PartialEq for Layout<T, ALIGN> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T, const ALIGN: usize> Eq for Layout<T, ALIGN> {}

impl<T, const ALIGN: usize> fmt::Debug for Layout<T, ALIGN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("type", &core::any::type_name::<T>())
            .field("stride", &Self::STRIDE)
            .field("alignment", &Self::ALIGNMENT)
            .finish()
    }
}

impl<T, const ALIGN: usize> Property for Layout<T, ALIGN> {
    const IS_REQUIRABLE: bool = true;
    const IS_PREFERABLE: bool = false;
}

impl<T, const ALIGN: usize> Requirable for Layout<T, ALIGN> {}

/// Layout descriptor for `T` at its natural alignment.
///
/// This is the layout a container requires for its element type.
#[inline]
pub const fn storage_for<T>() -> Layout<T> {
    Layout::new()
}

/// Asks for in-place, content-preserving resizing of previously returned
/// regions.
///
/// An allocator satisfying this descriptor enables
/// [`Allocate::reallocate`](crate::Allocate::reallocate).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reallocation;

impl Property for Reallocation {
    const IS_REQUIRABLE: bool = true;
    const IS_PREFERABLE: bool = true;
}

impl Requirable for Reallocation {}
impl Preferable for Reallocation {}

/// Asks whether `allocate`/`reallocate` may return more elements than
/// requested, and whether callers should adopt the surplus.
///
/// Allocators that do not satisfy this descriptor return regions covering
/// exactly the requested count.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overallocation;

impl Property for Overallocation {
    const IS_REQUIRABLE: bool = true;
    const IS_PREFERABLE: bool = true;
}

impl Requirable for Overallocation {}
impl Preferable for Overallocation {}
