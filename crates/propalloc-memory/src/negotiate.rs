// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! The three negotiation primitives and the composition containers use.

use crate::allocate::Allocate;
use crate::property::{Layout, Overallocation, Preferable, Property, Reallocation, Requirable, storage_for};

/// Reports whether an allocator, as currently adapted, satisfies `P`.
///
/// Implemented for every descriptor an allocator participates in, whatever
/// the answer. Querying never mutates and never fails.
///
/// **Note:** This trait is NOT dyn-compatible (has associated constants).
pub trait Query<P: Property> {
    /// The answer, known at build time.
    const SATISFIED: bool;

    /// Runtime form of [`SATISFIED`](Self::SATISFIED).
    #[inline]
    fn query(&self, property: P) -> bool {
        let _ = property;
        Self::SATISFIED
    }
}

/// Produces an allocator committed to satisfying `P`.
///
/// Allocators implement this only for descriptors they can honor; requiring
/// anything else is a build error, never a runtime one. Requiring an already
/// satisfied descriptor yields an equivalent allocator.
pub trait Require<P: Requirable> {
    /// The adapted allocator.
    type Output;

    /// Adapts `self` to `property`.
    fn require(&self, property: P) -> Self::Output;
}

/// Produces an allocator that satisfies `P` when it can.
///
/// Always succeeds. Allocators unable to honor `P` return themselves (or an
/// allocator behaving identically); callers learn which branch was taken
/// through [`Query`].
pub trait Prefer<P: Preferable> {
    /// The possibly adapted allocator.
    type Output;

    /// Adapts `self` to `property` if capable.
    fn prefer(&self, property: P) -> Self::Output;
}

/// Returns whether `alloc` satisfies `property`.
///
/// # Example
///
/// ```rust
/// use propalloc_memory::{Global, Reallocation, Overallocation, query};
///
/// assert!(query(&Global::new(), Reallocation));
/// assert!(!query(&Global::new(), Overallocation));
/// ```
#[inline]
pub fn query<A, P>(alloc: &A, property: P) -> bool
where
    A: Query<P>,
    P: Property,
{
    alloc.query(property)
}

/// Returns `alloc` adapted to satisfy `property`.
///
/// Requiring a descriptor the allocator cannot honor does not compile:
///
/// ```compile_fail
/// use propalloc_memory::{Mallocator, Overallocation, require};
///
/// // malloc(3) has no notion of surplus capacity.
/// let _ = require(&Mallocator::new(), Overallocation);
/// ```
#[inline]
pub fn require<A, P>(alloc: &A, property: P) -> A::Output
where
    A: Require<P>,
    P: Requirable,
{
    alloc.require(property)
}

/// Returns `alloc` adapted to `property` when capable, unchanged otherwise.
///
/// Only preferable descriptors can be preferred:
///
/// ```compile_fail
/// use propalloc_memory::{Global, prefer, storage_for};
///
/// let _ = prefer(&Global::new(), storage_for::<u32>());
/// ```
#[inline]
pub fn prefer<A, P>(alloc: &A, property: P) -> A::Output
where
    A: Prefer<P>,
    P: Preferable,
{
    alloc.prefer(property)
}

/// Allocators a container of `T` can derive its working allocator from.
///
/// The working allocator is always built the same way: the layout of `T` is
/// required, reallocation is preferred. Descriptors negotiated on the base
/// allocator beforehand (overallocation, for instance) carry through.
///
/// Blanket-implemented; allocator authors implement [`Require`],
/// [`Prefer`] and [`Query`] instead.
///
/// # Example
///
/// ```rust
/// use propalloc_memory::{Mallocator, Negotiate, Reallocation, query};
///
/// let working = Negotiate::<u32>::negotiate(&Mallocator::new());
/// assert!(query(&working, Reallocation));
///
/// // Values with drop glue are never handed to realloc(3).
/// let working = Negotiate::<String>::negotiate(&Mallocator::new());
/// assert!(!query(&working, Reallocation));
/// ```
pub trait Negotiate<T> {
    /// The working allocator.
    type Adapted: Allocate + Query<Reallocation> + Query<Overallocation>;

    /// Builds `prefer(require(self, storage_for::<T>()), Reallocation)`.
    fn negotiate(&self) -> Self::Adapted;
}

impl<T, A> Negotiate<T> for A
where
    A: Require<Layout<T>>,
    <A as Require<Layout<T>>>::Output: Prefer<Reallocation>,
    <<A as Require<Layout<T>>>::Output as Prefer<Reallocation>>::Output:
        Allocate + Query<Reallocation> + Query<Overallocation>,
{
    type Adapted = <<A as Require<Layout<T>>>::Output as Prefer<Reallocation>>::Output;

    #[inline]
    fn negotiate(&self) -> Self::Adapted {
        prefer(&require(self, storage_for::<T>()), Reallocation)
    }
}

/// The working allocator a container of `T` derives from `A`.
pub type Negotiated<T, A> = <A as Negotiate<T>>::Adapted;
