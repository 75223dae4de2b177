// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Growable array parameterized by a negotiating allocator.
//!
//! [`PropVec`] never assumes how its allocator works. Before each growth it
//! negotiates a working allocator (layout of `T` required, reallocation
//! preferred) and picks one of two paths:
//!
//! - **In place**: when `T` is bitwise relocatable and the allocator honors
//!   reallocation, the buffer is resized by the allocator. No element is
//!   touched.
//! - **Allocate, move, swap**: otherwise a fresh buffer is allocated, the
//!   elements are relocated into it and the old buffer is released.
//!
//! Both paths leave the vector untouched on failure. All growth is
//! fallible and reported through [`VecError`].
//!
//! # Example
//!
//! ```rust
//! use propalloc_memory::Mallocator;
//! use propalloc_vec::{PropVec, VecError};
//!
//! fn example() -> Result<(), VecError> {
//!     let mut vec = PropVec::new_in(Mallocator::new());
//!
//!     for i in 0u32..5 {
//!         vec.push_back(i)?;
//!     }
//!
//!     assert_eq!(vec.as_slice(), &[0, 1, 2, 3, 4]);
//!     assert_eq!(vec.capacity(), 5);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## License
//!
//! GPL-3.0-only

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

mod error;
mod guard;
mod prop_vec;

pub use error::VecError;
pub use prop_vec::PropVec;
