// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;

use propalloc_memory::{
    Allocate, Global, Negotiate, Negotiated, Reallocation, Region, is_bitwise_relocatable, query,
};

use crate::error::VecError;
use crate::guard::Rollback;

/// Growable array whose growth strategy is negotiated with its allocator.
///
/// `A` is the base allocator. Every growth derives a working allocator from
/// it through [`Negotiate`], then either resizes the buffer in place (when
/// `T` is bitwise relocatable and the working allocator honors
/// [`Reallocation`]) or allocates a new buffer and relocates the elements.
///
/// Growth without an explicit target goes from capacity `c` to
/// `2 + c + c / 2`, capped at [`max_size`](Self::max_size).
///
/// Zero-sized element types never touch the allocator: the first growth
/// sets the capacity to `usize::MAX`.
///
/// # Example
///
/// ```rust
/// use propalloc_vec::{PropVec, VecError};
///
/// fn example() -> Result<(), VecError> {
///     let mut vec = PropVec::new();
///     vec.reserve(4)?;
///
///     vec.push_back(String::from("a"))?;
///     vec.emplace_back_with(|| String::from("b"))?.push('!');
///
///     assert_eq!(vec.as_slice(), &["a", "b!"]);
///     assert_eq!(vec.capacity(), 4);
///     Ok(())
/// }
/// # example().unwrap();
/// ```
pub struct PropVec<T, A = Global>
where
    A: Negotiate<T>,
{
    buf: Option<NonNull<T>>,
    len: usize,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: PropVec owns its elements and its allocator exclusively.
unsafe impl<T: Send, A: Negotiate<T> + Send> Send for PropVec<T, A> {}

// SAFETY: shared access only hands out `&T` and `&A`.
unsafe impl<T: Sync, A: Negotiate<T> + Sync> Sync for PropVec<T, A> {}

impl<T> PropVec<T> {
    /// Creates an empty vector over the global allocator. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global::new())
    }

    /// Creates a vector over the global allocator holding clones of `values`.
    ///
    /// See [`from_slice_in`](Self::from_slice_in).
    pub fn from_slice(values: &[T]) -> Result<Self, VecError>
    where
        T: Clone,
    {
        Self::from_slice_in(values, Global::new())
    }
}

impl<T, A> PropVec<T, A>
where
    A: Negotiate<T>,
{
    const MAX_SIZE: usize = match size_of::<T>() {
        0 => usize::MAX,
        stride => isize::MAX as usize / stride,
    };

    /// Creates an empty vector over `alloc`. Does not allocate.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buf: None,
            len: 0,
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Creates a vector over `alloc` holding clones of `values`.
    ///
    /// Capacity is exactly `values.len()`. A slice longer than
    /// [`max_size`](Self::max_size) fails with [`VecError::LengthLimit`]
    /// before anything is allocated.
    pub fn from_slice_in(values: &[T], alloc: A) -> Result<Self, VecError>
    where
        T: Clone,
    {
        let mut vec = Self::new_in(alloc);
        vec.reserve(values.len())?;
        vec.extend_within_capacity(values.iter().cloned());

        Ok(vec)
    }

    /// Creates a vector over `alloc` from an iterator of known length.
    ///
    /// Capacity is exactly the reported length. A length beyond
    /// [`max_size`](Self::max_size) fails with [`VecError::LengthLimit`]
    /// before anything is allocated or any item is produced.
    ///
    /// # Example
    ///
    /// ```rust
    /// use propalloc_memory::Global;
    /// use propalloc_vec::{PropVec, VecError};
    ///
    /// let result = PropVec::from_iter_exact_in((0..usize::MAX).map(|_| [0u8; 1024]), Global::new());
    /// assert!(matches!(result, Err(VecError::LengthLimit { .. })));
    /// ```
    pub fn from_iter_exact_in<I>(values: I, alloc: A) -> Result<Self, VecError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();

        let mut vec = Self::new_in(alloc);
        vec.reserve(values.len())?;
        vec.extend_within_capacity(values);

        Ok(vec)
    }

    /// Returns a deep copy sharing a clone of the allocator.
    ///
    /// On error or panic nothing is leaked.
    pub fn try_clone(&self) -> Result<Self, VecError>
    where
        T: Clone,
        A: Clone,
    {
        Self::from_slice_in(self.as_slice(), self.alloc.clone())
    }

    /// Replaces the contents of `self` with a deep copy of `source`.
    ///
    /// The copy is built in full with `self`'s allocator and only then
    /// swapped in, so an allocation error or a panicking `clone()` leaves
    /// `self` exactly as it was.
    pub fn try_clone_from<B>(&mut self, source: &PropVec<T, B>) -> Result<(), VecError>
    where
        T: Clone,
        A: Clone,
        B: Negotiate<T>,
    {
        let mut copy = Self::from_slice_in(source.as_slice(), self.alloc.clone())?;
        self.swap(&mut copy);

        Ok(())
    }

    /// Moves the contents out, leaving `self` empty with no buffer.
    ///
    /// # Example
    ///
    /// ```rust
    /// use propalloc_vec::PropVec;
    ///
    /// let mut source = PropVec::from_slice(&[1u8, 2, 3]).expect("Failed to from_slice(..)");
    /// let taken = source.take();
    ///
    /// assert_eq!(taken.as_slice(), &[1, 2, 3]);
    /// assert_eq!((source.len(), source.capacity()), (0, 0));
    /// assert!(source.as_ptr().is_null());
    /// ```
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::new_in(self.alloc.clone());
        core::mem::replace(self, empty)
    }

    /// Exchanges buffers, lengths, capacities and allocators.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Pointer to the first element, or null when there is no buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.map_or(ptr::null(), |buf| buf.as_ptr().cast_const())
    }

    /// Mutable pointer to the first element, or null when there is no buffer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// The live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self.buf {
            // SAFETY (PRECONDITIONS ARE MET): the first `len` slots are initialized.
            Some(buf) => unsafe { slice::from_raw_parts(buf.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// The live elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.buf {
            // SAFETY (PRECONDITIONS ARE MET): the first `len` slots are initialized
            // and `&mut self` guarantees exclusivity.
            Some(buf) => unsafe { slice::from_raw_parts_mut(buf.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current buffer can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Largest element count representable for `T`.
    ///
    /// `isize::MAX / size_of::<T>()`, or `usize::MAX` for zero-sized `T`.
    #[inline]
    pub const fn max_size(&self) -> usize {
        Self::MAX_SIZE
    }

    /// The base allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Appends `value` and returns a reference to it.
    ///
    /// Grows by `2 + c + c / 2` when full. On error `value` is dropped and
    /// the vector is unchanged.
    pub fn emplace_back(&mut self, value: T) -> Result<&mut T, VecError> {
        self.emplace_back_with(|| value)
    }

    /// Appends the value produced by `f` and returns a reference to it.
    ///
    /// Capacity is secured before `f` runs. If `f` panics, length and
    /// elements are unchanged.
    pub fn emplace_back_with<F>(&mut self, f: F) -> Result<&mut T, VecError>
    where
        F: FnOnce() -> T,
    {
        self.try_emplace_back_with(|| Ok::<T, VecError>(f()))
    }

    /// Appends the value produced by the fallible `f` and returns a reference
    /// to it.
    ///
    /// Growth errors are converted into `E`. If `f` fails or panics, length
    /// and elements are unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use propalloc_vec::{PropVec, VecError};
    ///
    /// #[derive(Debug)]
    /// enum ParseError {
    ///     Vec(VecError),
    ///     Int(core::num::ParseIntError),
    /// }
    ///
    /// impl From<VecError> for ParseError {
    ///     fn from(err: VecError) -> Self {
    ///         Self::Vec(err)
    ///     }
    /// }
    ///
    /// let mut vec = PropVec::<u32>::new();
    /// vec.try_emplace_back_with(|| "17".parse::<u32>().map_err(ParseError::Int))
    ///     .expect("Failed to try_emplace_back_with(..)");
    ///
    /// let result = vec.try_emplace_back_with(|| "x".parse::<u32>().map_err(ParseError::Int));
    /// assert!(matches!(result, Err(ParseError::Int(_))));
    /// assert_eq!(vec.as_slice(), &[17]);
    /// ```
    pub fn try_emplace_back_with<E, F>(&mut self, f: F) -> Result<&mut T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<VecError>,
    {
        let required = self.required(1)?;
        self.grow_amortized(required)?;

        let value = f()?;

        // SAFETY (PRECONDITIONS ARE MET): grow_amortized() secured a buffer with
        // room for at least one more element.
        let slot = unsafe { self.as_mut_ptr().add(self.len) };
        unsafe { slot.write(value) };
        self.len += 1;

        // SAFETY (PRECONDITIONS ARE MET): `slot` was just initialized and is
        // borrowed through `&mut self`.
        Ok(unsafe { &mut *slot })
    }

    /// Appends `value`.
    #[inline]
    pub fn push_back(&mut self, value: T) -> Result<(), VecError> {
        self.emplace_back(value).map(|_| ())
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;

        // SAFETY (PRECONDITIONS ARE MET): slot `len` was initialized and is now
        // outside the live range, so ownership moves to the caller.
        Some(unsafe { self.as_mut_ptr().add(self.len).read() })
    }

    /// Appends clones of `values`, growing at most once.
    ///
    /// If a `clone()` panics, the clones made so far are dropped and the
    /// vector keeps its previous length.
    pub fn try_extend_from_slice(&mut self, values: &[T]) -> Result<(), VecError>
    where
        T: Clone,
    {
        let required = self.required(values.len())?;
        self.grow_amortized(required)?;
        self.extend_within_capacity(values.iter().cloned());

        Ok(())
    }

    /// Ensures `capacity() >= capacity`.
    ///
    /// Grows to exactly `capacity` (or whatever surplus an overallocating
    /// allocator grants) when the current buffer is too small. Fails with
    /// [`VecError::LengthLimit`] beyond [`max_size`](Self::max_size).
    pub fn reserve(&mut self, capacity: usize) -> Result<(), VecError> {
        if self.cap >= capacity {
            return Ok(());
        }

        self.check_length(capacity)?;
        self.grow_exact(capacity)
    }

    /// Resizes to exactly `len` elements, filling with clones of `value`.
    pub fn resize(&mut self, len: usize, value: T) -> Result<(), VecError>
    where
        T: Clone,
    {
        self.resize_with(len, || value.clone())
    }

    /// Resizes to exactly `len` elements, filling with `T::default()`.
    pub fn resize_default(&mut self, len: usize) -> Result<(), VecError>
    where
        T: Default,
    {
        self.resize_with(len, T::default)
    }

    /// Resizes to exactly `len` elements, filling with values from `f`.
    ///
    /// Shrinking drops the trailing elements and keeps the capacity.
    /// Growing reserves exactly `len`; if `f` panics, the values produced so
    /// far are dropped and the length is unchanged.
    pub fn resize_with<F>(&mut self, len: usize, f: F) -> Result<(), VecError>
    where
        F: FnMut() -> T,
    {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }

        self.reserve(len)?;
        self.extend_within_capacity(core::iter::repeat_with(f).take(len - self.len));

        Ok(())
    }

    /// Drops every element past `len`. Capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        let tail = ptr::slice_from_raw_parts_mut(
            // SAFETY (PRECONDITIONS ARE MET): `len < self.len`, so in bounds.
            unsafe { self.as_mut_ptr().add(len) },
            self.len - len,
        );

        // Shrink first: a panicking Drop must not lead to a double drop.
        self.len = len;

        // SAFETY (PRECONDITIONS ARE MET): the tail was initialized and is now
        // outside the live range.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drops every element. Capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops every element and returns the buffer to the allocator.
    ///
    /// Afterwards `capacity() == 0` and `as_ptr()` is null.
    pub fn release(&mut self) {
        self.clear();

        let region = self.region();
        self.buf = None;
        self.cap = 0;

        if region.is_empty() || size_of::<T>() == 0 {
            return;
        }

        // SAFETY (PRECONDITIONS ARE MET): `region` is the live buffer, obtained from
        // an allocator negotiated the same way from the same base.
        unsafe { Negotiate::<T>::negotiate(&self.alloc).deallocate(region) };
    }

    #[inline]
    fn region(&self) -> Region {
        match self.buf {
            Some(buf) => Region::new(buf.as_ptr().cast(), self.cap),
            None => Region::EMPTY,
        }
    }

    #[inline]
    fn adopt(&mut self, region: Region) {
        self.buf = NonNull::new(region.pointer.cast());
        self.cap = region.count;
    }

    #[inline]
    fn check_length(&self, requested: usize) -> Result<(), VecError> {
        if requested > Self::MAX_SIZE {
            log::debug!(
                "PropVec<{}>: {requested} elements exceed max_size() = {}",
                type_name::<T>(),
                Self::MAX_SIZE
            );
            return Err(VecError::LengthLimit {
                requested,
                max: Self::MAX_SIZE,
            });
        }

        Ok(())
    }

    /// `len + additional`, or a length-limit error when that overflows.
    #[inline]
    fn required(&self, additional: usize) -> Result<usize, VecError> {
        self.len
            .checked_add(additional)
            .ok_or(VecError::LengthLimit {
                requested: usize::MAX,
                max: Self::MAX_SIZE,
            })
    }

    /// Grows so that `required` elements fit, by the amortized factor.
    #[inline]
    fn grow_amortized(&mut self, required: usize) -> Result<(), VecError> {
        if self.cap >= required {
            return Ok(());
        }

        self.check_length(required)?;

        let target = self
            .cap
            .saturating_add(2)
            .saturating_add(self.cap / 2)
            .min(Self::MAX_SIZE)
            .max(required);

        self.grow_exact(target)
    }

    /// Grows the buffer to hold `target` elements.
    ///
    /// `target` is above the current capacity and within `max_size()`.
    #[cold]
    #[inline(never)]
    fn grow_exact(&mut self, target: usize) -> Result<(), VecError> {
        debug_assert!(target > self.cap && target <= Self::MAX_SIZE);

        if size_of::<T>() == 0 {
            self.buf = Some(NonNull::dangling());
            self.cap = usize::MAX;
            return Ok(());
        }

        let alloc = Negotiate::<T>::negotiate(&self.alloc);

        if self.buf.is_some() && is_bitwise_relocatable::<T>() && query(&alloc, Reallocation) {
            self.reallocate_in_place(&alloc, target)
        } else {
            self.allocate_move_swap(&alloc, target)
        }
    }

    fn reallocate_in_place(
        &mut self,
        alloc: &Negotiated<T, A>,
        target: usize,
    ) -> Result<(), VecError> {
        let old = self.region();

        log::trace!(
            "PropVec<{}>: reallocating in place, capacity {} -> {target}",
            type_name::<T>(),
            old.count
        );

        // SAFETY (PRECONDITIONS ARE MET): `old` is the live buffer, obtained from an
        // allocator negotiated the same way from the same base. On error it
        // is left untouched and still ours.
        let region = unsafe { alloc.reallocate(old, target) }.inspect_err(|err| {
            log::debug!("PropVec<{}>: reallocation failed: {err}", type_name::<T>());
        })?;

        debug_assert!(region.count >= target);
        self.adopt(region);

        Ok(())
    }

    fn allocate_move_swap(
        &mut self,
        alloc: &Negotiated<T, A>,
        target: usize,
    ) -> Result<(), VecError> {
        let old = self.region();

        log::trace!(
            "PropVec<{}>: allocating and moving, capacity {} -> {target}",
            type_name::<T>(),
            old.count
        );

        let region = alloc.allocate(old, target).inspect_err(|err| {
            log::debug!("PropVec<{}>: allocation failed: {err}", type_name::<T>());
        })?;

        debug_assert!(region.count >= target);

        if let Some(buf) = self.buf {
            // SAFETY (PRECONDITIONS ARE MET): both buffers hold at least `len` slots
            // and are distinct live allocations. Moves are bitwise; the old
            // slots are released without running destructors.
            unsafe {
                ptr::copy_nonoverlapping(buf.as_ptr(), region.pointer.cast::<T>(), self.len);
                alloc.deallocate(old);
            }
        }

        self.adopt(region);

        Ok(())
    }

    /// Appends every item of `values`; capacity must already suffice.
    ///
    /// Items beyond the spare capacity are ignored.
    fn extend_within_capacity<I>(&mut self, values: I)
    where
        I: Iterator<Item = T>,
    {
        let spare = self.cap - self.len;
        let mut rollback = Rollback::new(self.as_mut_ptr(), self.len);

        for value in values.take(spare) {
            // SAFETY (PRECONDITIONS ARE MET): at most `spare` values are written.
            unsafe { rollback.push(value) };
        }

        self.len += rollback.commit();
    }
}

impl<T, A> Drop for PropVec<T, A>
where
    A: Negotiate<T>,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, A> Default for PropVec<T, A>
where
    A: Negotiate<T> + Default,
{
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A> Clone for PropVec<T, A>
where
    T: Clone,
    A: Negotiate<T> + Clone,
{
    /// # Panics
    ///
    /// When the copy cannot be allocated, like `alloc::vec::Vec`.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("PropVec::clone() failed: {err}"),
        }
    }

    /// # Panics
    ///
    /// When the copy cannot be allocated. `self` is unchanged in that case.
    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_clone_from(source) {
            panic!("PropVec::clone_from() failed: {err}");
        }
    }
}

impl<T, A> Deref for PropVec<T, A>
where
    A: Negotiate<T>,
{
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, A> DerefMut for PropVec<T, A>
where
    A: Negotiate<T>,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, A> fmt::Debug for PropVec<T, A>
where
    T: fmt::Debug,
    A: Negotiate<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, A, B> PartialEq<PropVec<T, B>> for PropVec<T, A>
where
    T: PartialEq,
    A: Negotiate<T>,
    B: Negotiate<T>,
{
    fn eq(&self, other: &PropVec<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, A> Eq for PropVec<T, A>
where
    T: Eq,
    A: Negotiate<T>,
{
}
