// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Allocator backed by the Rust global allocator.

use alloc::alloc::{Layout as RawLayout, alloc, dealloc, realloc};
use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;

use crate::allocate::{Allocate, byte_len};
use crate::error::AllocError;
use crate::negotiate::{Prefer, Query, Require};
use crate::property::{Layout, Overallocation, Reallocation};
use crate::region::Region;

/// Granularity, in bytes, of overallocating requests.
pub const CACHE_LINE: usize = 64;

/// Untyped allocator over the Rust global allocator.
///
/// Supports any power-of-two alignment and always honors [`Reallocation`].
/// [`Overallocation`] is opt-in: once required or preferred, every request is
/// rounded up to whole [`CACHE_LINE`]s and the surplus is reported in the
/// returned region.
///
/// # Example
///
/// ```rust
/// use propalloc_memory::{Allocate, Global, Overallocation, Region, Require, storage_for};
///
/// let alloc = Global::new().require(Overallocation).require(storage_for::<u8>());
/// let region = alloc.allocate(Region::EMPTY, 10).expect("Failed to allocate(..)");
/// assert_eq!(region.count, 64);
///
/// // SAFETY: region was just returned by `alloc`.
/// unsafe { alloc.deallocate(region) };
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global<const OVERALLOCATION: bool = false>;

impl Global {
    /// Creates the base allocator.
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl<U, const ALIGN: usize, const OVERALLOCATION: bool> Require<Layout<U, ALIGN>>
    for Global<OVERALLOCATION>
{
    type Output = TypedGlobal<U, ALIGN, OVERALLOCATION>;

    #[inline]
    fn require(&self, _property: Layout<U, ALIGN>) -> Self::Output {
        TypedGlobal::new()
    }
}

impl<const OVERALLOCATION: bool> Require<Reallocation> for Global<OVERALLOCATION> {
    type Output = Self;

    #[inline]
    fn require(&self, _property: Reallocation) -> Self::Output {
        *self
    }
}

impl<const OVERALLOCATION: bool> Prefer<Reallocation> for Global<OVERALLOCATION> {
    type Output = Self;

    #[inline]
    fn prefer(&self, _property: Reallocation) -> Self::Output {
        *self
    }
}

impl<const OVERALLOCATION: bool> Require<Overallocation> for Global<OVERALLOCATION> {
    type Output = Global<true>;

    #[inline]
    fn require(&self, _property: Overallocation) -> Self::Output {
        Global
    }
}

impl<const OVERALLOCATION: bool> Prefer<Overallocation> for Global<OVERALLOCATION> {
    type Output = Global<true>;

    #[inline]
    fn prefer(&self, _property: Overallocation) -> Self::Output {
        Global
    }
}

impl<U, const ALIGN: usize, const OVERALLOCATION: bool> Query<Layout<U, ALIGN>>
    for Global<OVERALLOCATION>
{
    const SATISFIED: bool = false;
}

impl<const OVERALLOCATION: bool> Query<Reallocation> for Global<OVERALLOCATION> {
    const SATISFIED: bool = true;
}

impl<const OVERALLOCATION: bool> Query<Overallocation> for Global<OVERALLOCATION> {
    const SATISFIED: bool = OVERALLOCATION;
}

/// Global-allocator allocator committed to the layout of `T` at `ALIGN`.
pub struct TypedGlobal<T, const ALIGN: usize = 0, const OVERALLOCATION: bool = false> {
    _marker: PhantomData<fn() -> T>,
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> TypedGlobal<T, ALIGN, OVERALLOCATION> {
    #[inline]
    const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Element count actually handed out for a request of `count`.
    fn granted(count: usize) -> usize {
        let stride = size_of::<T>();

        if !OVERALLOCATION || stride == 0 {
            return count;
        }

        count
            .checked_mul(stride)
            .and_then(|bytes| bytes.checked_next_multiple_of(CACHE_LINE))
            .map_or(count, |rounded| rounded / stride)
    }

    fn raw_layout(count: usize) -> Result<RawLayout, AllocError> {
        let bytes = byte_len(size_of::<T>(), count)?;

        RawLayout::from_size_align(bytes, Layout::<T, ALIGN>::ALIGNMENT)
            .map_err(|_| AllocError::LayoutOverflow { count })
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Clone
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Copy
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Default
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> PartialEq
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Eq for TypedGlobal<T, ALIGN, OVERALLOCATION> {}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> fmt::Debug
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedGlobal")
            .field("type", &core::any::type_name::<T>())
            .field("alignment", &Layout::<T, ALIGN>::ALIGNMENT)
            .field("overallocation", &OVERALLOCATION)
            .finish()
    }
}

impl<T, U, const ALIGN: usize, const NEW_ALIGN: usize, const OVERALLOCATION: bool>
    Require<Layout<U, NEW_ALIGN>> for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    type Output = TypedGlobal<U, NEW_ALIGN, OVERALLOCATION>;

    #[inline]
    fn require(&self, _property: Layout<U, NEW_ALIGN>) -> Self::Output {
        TypedGlobal::new()
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Require<Reallocation>
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    type Output = Self;

    #[inline]
    fn require(&self, _property: Reallocation) -> Self::Output {
        *self
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Prefer<Reallocation>
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    type Output = Self;

    #[inline]
    fn prefer(&self, _property: Reallocation) -> Self::Output {
        *self
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Require<Overallocation>
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    type Output = TypedGlobal<T, ALIGN, true>;

    #[inline]
    fn require(&self, _property: Overallocation) -> Self::Output {
        TypedGlobal::new()
    }
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Prefer<Overallocation>
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    type Output = TypedGlobal<T, ALIGN, true>;

    #[inline]
    fn prefer(&self, _property: Overallocation) -> Self::Output {
        TypedGlobal::new()
    }
}

impl<T, U, const ALIGN: usize, const QUERIED_ALIGN: usize, const OVERALLOCATION: bool>
    Query<Layout<U, QUERIED_ALIGN>> for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    const SATISFIED: bool = size_of::<U>() == size_of::<T>()
        && Layout::<U, QUERIED_ALIGN>::ALIGNMENT <= Layout::<T, ALIGN>::ALIGNMENT;
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Query<Reallocation>
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    const SATISFIED: bool = true;
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Query<Overallocation>
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    const SATISFIED: bool = OVERALLOCATION;
}

impl<T, const ALIGN: usize, const OVERALLOCATION: bool> Allocate
    for TypedGlobal<T, ALIGN, OVERALLOCATION>
{
    fn allocate(&self, _hint: Region, count: usize) -> Result<Region, AllocError> {
        let count = Self::granted(count);
        let layout = Self::raw_layout(count)?;

        if layout.size() == 0 {
            return Ok(Region::dangling(layout.align(), count));
        }

        // SAFETY: `layout` has a non-zero size.
        let pointer = unsafe { alloc(layout) };

        if pointer.is_null() {
            log::debug!("global allocation of {layout:?} failed");
            return Err(AllocError::OutOfMemory { count });
        }

        Ok(Region::new(pointer, count))
    }

    unsafe fn reallocate(&self, region: Region, count: usize) -> Result<Region, AllocError> {
        let old_layout = Self::raw_layout(region.count)?;

        if region.is_empty() || old_layout.size() == 0 {
            return self.allocate(region, count);
        }

        let count = Self::granted(count);
        let new_layout = Self::raw_layout(count)?;

        if new_layout.size() == 0 {
            // SAFETY (PRECONDITIONS ARE MET): caller guarantees `region` is live and ours.
            unsafe { self.deallocate(region) };
            return Ok(Region::dangling(new_layout.align(), count));
        }

        // SAFETY (PRECONDITIONS ARE MET): `region` was allocated with `old_layout`
        // by the global allocator; `new_layout` was validated against the same
        // alignment. On failure the old block is left untouched.
        let pointer = unsafe { realloc(region.pointer, old_layout, new_layout.size()) };

        if pointer.is_null() {
            log::debug!("global reallocation to {new_layout:?} failed, original block kept");
            return Err(AllocError::OutOfMemory { count });
        }

        Ok(Region::new(pointer, count))
    }

    unsafe fn deallocate(&self, region: Region) {
        if region.is_empty() {
            return;
        }

        let Ok(layout) = Self::raw_layout(region.count) else {
            return;
        };

        if layout.size() == 0 {
            return;
        }

        // SAFETY (PRECONDITIONS ARE MET): caller guarantees `region` is live and was
        // allocated with this layout.
        unsafe { dealloc(region.pointer, layout) };
    }
}
