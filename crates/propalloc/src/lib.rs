// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Containers that negotiate allocation capabilities with their allocators.
//!
//! A container asks its allocator, at build time, whether it can resize
//! regions in place ([`Reallocation`](memory::Reallocation)) or hand out
//! surplus capacity ([`Overallocation`](memory::Overallocation)), and picks
//! its growth path from the answer.
//!
//! # Crates
//!
//! - [`memory`]: descriptors, `query`/`require`/`prefer`, the `Allocate`
//!   trait and the bundled allocators.
//! - [`vec`]: `PropVec`, the growable array built on top.
//! - `test_utils` (feature `test-utils`): instrumented allocator and element
//!   types.
//!
//! # Quick Start
//!
//! ```rust
//! use propalloc::memory::{Global, Overallocation, Require};
//! use propalloc::vec::{PropVec, VecError};
//!
//! fn main() -> Result<(), VecError> {
//!     // Byte buffers that grow in whole cache lines, resized in place.
//!     let mut bytes = PropVec::new_in(Global::new().require(Overallocation));
//!     bytes.try_extend_from_slice(b"hello")?;
//!     assert_eq!(bytes.capacity(), 64);
//!
//!     // Strings have drop glue: growth allocates anew and moves them.
//!     let mut words = PropVec::new();
//!     words.push_back(String::from("hello"))?;
//!     words.push_back(String::from("world"))?;
//!     assert_eq!(words.len(), 2);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## License
//!
//! GPL-3.0-only

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub use propalloc_memory as memory;
pub use propalloc_vec as vec;

#[cfg(feature = "test-utils")]
pub use propalloc_test_utils as test_utils;
