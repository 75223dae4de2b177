// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! `malloc(3)`/`realloc(3)`/`free(3)` allocator.
//!
//! The untyped [`Mallocator`] has no element stride and cannot allocate.
//! Requiring a [`Layout`] turns it into a [`TypedMallocator`], which can.
//! Reallocation is a per-type flag switched on by requiring or preferring
//! [`Reallocation`]; it is only honored for bitwise-relocatable element
//! types, since `realloc(3)` moves bytes behind the container's back.
//! A required reallocation is sticky: committing to a layout whose element
//! has drop glue afterwards does not build. A preferred one is dropped
//! silently for such layouts.
//! Overallocation is never honored.

use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;

use crate::allocate::{Allocate, byte_len, is_bitwise_relocatable};
use crate::error::AllocError;
use crate::negotiate::{Prefer, Query, Require};
use crate::property::{Layout, Overallocation, Reallocation};
use crate::region::Region;

/// Alignment every `malloc(3)` block is guaranteed to have on the supported
/// C runtimes (glibc, musl, macOS libSystem, MSVCRT).
pub const MALLOC_ALIGNMENT: usize = 2 * size_of::<usize>();

/// Untyped `malloc(3)` allocator.
///
/// `REALLOCATION` records whether reallocation was requested and `REQUIRED`
/// whether that request was a requirement. Both carry over to the typed
/// allocator produced by requiring a layout.
///
/// Requesting more alignment than `malloc(3)` guarantees does not build:
///
/// ```compile_fail
/// use propalloc_memory::{Layout, Mallocator, Require};
///
/// let _ = Mallocator::new().require(Layout::<u8, 4096>::new());
/// ```
///
/// Neither does committing to an element with drop glue once reallocation
/// was required:
///
/// ```compile_fail
/// use propalloc_memory::{Mallocator, Reallocation, Require, storage_for};
///
/// let _ = Mallocator::new()
///     .require(Reallocation)
///     .require(storage_for::<String>());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Mallocator<const REALLOCATION: bool = false, const REQUIRED: bool = false>;

impl Mallocator {
    /// Creates the base allocator.
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<U, const ALIGN: usize, const REALLOCATION: bool, const REQUIRED: bool>
    Require<Layout<U, ALIGN>> for Mallocator<REALLOCATION, REQUIRED>
{
    type Output = TypedMallocator<U, REALLOCATION, REQUIRED>;

    #[inline]
    fn require(&self, _property: Layout<U, ALIGN>) -> Self::Output {
        const {
            assert!(
                Layout::<U, ALIGN>::ALIGNMENT <= MALLOC_ALIGNMENT,
                "malloc(3) cannot satisfy the requested alignment"
            )
        };
        const {
            assert!(
                !REQUIRED || is_bitwise_relocatable::<U>(),
                "realloc(3) cannot relocate values with drop glue"
            )
        };

        TypedMallocator::new()
    }
}

impl<const REALLOCATION: bool, const REQUIRED: bool> Require<Reallocation>
    for Mallocator<REALLOCATION, REQUIRED>
{
    type Output = Mallocator<true, true>;

    #[inline]
    fn require(&self, _property: Reallocation) -> Self::Output {
        Mallocator
    }
}

impl<const REALLOCATION: bool, const REQUIRED: bool> Prefer<Reallocation>
    for Mallocator<REALLOCATION, REQUIRED>
{
    type Output = Mallocator<true, REQUIRED>;

    #[inline]
    fn prefer(&self, _property: Reallocation) -> Self::Output {
        Mallocator
    }
}

impl<const REALLOCATION: bool, const REQUIRED: bool> Prefer<Overallocation>
    for Mallocator<REALLOCATION, REQUIRED>
{
    type Output = Self;

    #[inline]
    fn prefer(&self, _property: Overallocation) -> Self::Output {
        *self
    }
}

impl<U, const ALIGN: usize, const REALLOCATION: bool, const REQUIRED: bool>
    Query<Layout<U, ALIGN>> for Mallocator<REALLOCATION, REQUIRED>
{
    const SATISFIED: bool = false;
}

impl<const REALLOCATION: bool, const REQUIRED: bool> Query<Reallocation>
    for Mallocator<REALLOCATION, REQUIRED>
{
    const SATISFIED: bool = REALLOCATION;
}

impl<const REALLOCATION: bool, const REQUIRED: bool> Query<Overallocation>
    for Mallocator<REALLOCATION, REQUIRED>
{
    const SATISFIED: bool = false;
}

/// `malloc(3)` allocator committed to the layout of `T`.
pub struct TypedMallocator<T, const REALLOCATION: bool = false, const REQUIRED: bool = false> {
    _marker: PhantomData<fn() -> T>,
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> TypedMallocator<T, REALLOCATION, REQUIRED> {
    #[inline]
    const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    #[inline]
    fn is_zero_sized(region: &Region) -> bool {
        size_of::<T>() == 0 || region.count == 0
    }
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Clone
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Copy
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Default
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> PartialEq
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Eq
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> fmt::Debug
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedMallocator")
            .field("type", &core::any::type_name::<T>())
            .field("reallocation", &<Self as Query<Reallocation>>::SATISFIED)
            .field("required", &REQUIRED)
            .finish()
    }
}

impl<T, U, const ALIGN: usize, const REALLOCATION: bool, const REQUIRED: bool>
    Require<Layout<U, ALIGN>> for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    type Output = TypedMallocator<U, REALLOCATION, REQUIRED>;

    #[inline]
    fn require(&self, property: Layout<U, ALIGN>) -> Self::Output {
        Mallocator::<REALLOCATION, REQUIRED>.require(property)
    }
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Require<Reallocation>
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    type Output = TypedMallocator<T, true, true>;

    #[inline]
    fn require(&self, _property: Reallocation) -> Self::Output {
        const {
            assert!(
                is_bitwise_relocatable::<T>(),
                "realloc(3) cannot relocate values with drop glue"
            )
        };

        TypedMallocator::new()
    }
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Prefer<Reallocation>
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    type Output = TypedMallocator<T, true, REQUIRED>;

    #[inline]
    fn prefer(&self, _property: Reallocation) -> Self::Output {
        TypedMallocator::new()
    }
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Prefer<Overallocation>
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    type Output = Self;

    #[inline]
    fn prefer(&self, _property: Overallocation) -> Self::Output {
        *self
    }
}

impl<T, U, const ALIGN: usize, const REALLOCATION: bool, const REQUIRED: bool>
    Query<Layout<U, ALIGN>> for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    const SATISFIED: bool =
        size_of::<U>() == size_of::<T>() && Layout::<U, ALIGN>::ALIGNMENT <= MALLOC_ALIGNMENT;
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Query<Reallocation>
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    const SATISFIED: bool = REALLOCATION && is_bitwise_relocatable::<T>();
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Query<Overallocation>
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    const SATISFIED: bool = false;
}

impl<T, const REALLOCATION: bool, const REQUIRED: bool> Allocate
    for TypedMallocator<T, REALLOCATION, REQUIRED>
{
    fn allocate(&self, _hint: Region, count: usize) -> Result<Region, AllocError> {
        let bytes = byte_len(size_of::<T>(), count)?;

        if bytes == 0 {
            return Ok(Region::dangling(MALLOC_ALIGNMENT, count));
        }

        // SAFETY: `bytes` is non-zero; a null return is handled below.
        let pointer = unsafe { libc::malloc(bytes) }.cast::<u8>();

        if pointer.is_null() {
            log::debug!("malloc({bytes}) failed");
            return Err(AllocError::OutOfMemory { count });
        }

        Ok(Region::new(pointer, count))
    }

    unsafe fn reallocate(&self, region: Region, count: usize) -> Result<Region, AllocError> {
        if !<Self as Query<Reallocation>>::SATISFIED {
            return Err(AllocError::Unsupported);
        }

        if Self::is_zero_sized(&region) {
            return self.allocate(region, count);
        }

        let bytes = byte_len(size_of::<T>(), count)?;

        if bytes == 0 {
            // SAFETY (PRECONDITIONS ARE MET): caller guarantees `region` is live and ours.
            unsafe { self.deallocate(region) };
            return Ok(Region::dangling(MALLOC_ALIGNMENT, count));
        }

        // SAFETY (PRECONDITIONS ARE MET): `region.pointer` came from malloc/realloc
        // and is live; on failure realloc(3) leaves the old block untouched.
        let pointer = unsafe { libc::realloc(region.pointer.cast(), bytes) }.cast::<u8>();

        if pointer.is_null() {
            log::debug!("realloc({bytes}) failed, original block kept");
            return Err(AllocError::OutOfMemory { count });
        }

        Ok(Region::new(pointer, count))
    }

    unsafe fn deallocate(&self, region: Region) {
        if region.is_empty() || Self::is_zero_sized(&region) {
            return;
        }

        // SAFETY (PRECONDITIONS ARE MET): caller guarantees `region` is live and ours.
        unsafe { libc::free(region.pointer.cast()) };
    }
}
