// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Capability negotiation between containers and allocators.
//!
//! A container does not know which allocator it will be instantiated with.
//! Instead of hard-coding one allocation strategy it asks the allocator, at
//! build time, which optional capabilities it has, and picks a code path from
//! the answer.
//!
//! # Vocabulary
//!
//! Capabilities are named by zero-sized descriptors:
//!
//! - [`Layout<T, ALIGN>`](Layout): storage suitable for `T` at `ALIGN`.
//!   Requirable.
//! - [`Reallocation`]: in-place, content-preserving resizing. Requirable and
//!   preferable.
//! - [`Overallocation`]: regions may hold more than requested and callers
//!   should adopt the surplus. Requirable and preferable.
//!
//! # Primitives
//!
//! - [`query`]: does the allocator satisfy the descriptor? Never fails.
//! - [`require`]: adapt the allocator so it does. Unsatisfiable
//!   requirements do not build.
//! - [`prefer`]: adapt the allocator if it can, leave it alone otherwise.
//!
//! Containers build their working allocator with [`Negotiate`], which is
//! `prefer(require(base, storage_for::<T>()), Reallocation)`.
//!
//! # Example
//!
//! ```rust
//! use propalloc_memory::{
//!     Allocate, Mallocator, Reallocation, Region, prefer, query, require, storage_for,
//! };
//!
//! fn example() -> Result<(), propalloc_memory::AllocError> {
//!     let base = Mallocator::new();
//!     assert!(!query(&base, Reallocation));
//!
//!     let alloc = prefer(&require(&base, storage_for::<u32>()), Reallocation);
//!     assert!(query(&alloc, Reallocation));
//!     assert!(query(&alloc, storage_for::<u32>()));
//!
//!     let region = alloc.allocate(Region::EMPTY, 4)?;
//!     // SAFETY: region was returned by `alloc` and is still live.
//!     let region = unsafe { alloc.reallocate(region, 16)? };
//!     assert_eq!(region.count, 16);
//!     // SAFETY: as above.
//!     unsafe { alloc.deallocate(region) };
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! # Bundled allocators
//!
//! - [`Global`]: the Rust global allocator; any alignment, always
//!   reallocates, overallocates on request.
//! - [`Mallocator`] (feature `malloc`, on by default): `malloc(3)` family;
//!   alignment up to [`MALLOC_ALIGNMENT`], reallocates bitwise-relocatable
//!   element types once reallocation is requested, never overallocates.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

extern crate alloc;

#[cfg(test)]
mod tests;

mod allocate;
mod error;
mod global;
#[cfg(feature = "malloc")]
mod malloc;
mod negotiate;
mod property;
mod region;

pub use allocate::{Allocate, is_bitwise_relocatable};
pub use error::AllocError;
pub use global::{CACHE_LINE, Global, TypedGlobal};
#[cfg(feature = "malloc")]
pub use malloc::{MALLOC_ALIGNMENT, Mallocator, TypedMallocator};
pub use negotiate::{Negotiate, Negotiated, Prefer, Query, Require, prefer, query, require};
pub use property::{
    Layout, Overallocation, Preferable, Property, Reallocation, Requirable, storage_for,
};
pub use region::Region;
