// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for propalloc-vec.

use propalloc_memory::AllocError;
use thiserror::Error;

/// Error type for `PropVec` operations.
///
/// Every fallible operation is all-or-nothing: when one of these is
/// returned the vector's length, elements and buffer are exactly as they
/// were before the call.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum VecError {
    /// The requested element count exceeds `max_size()`.
    ///
    /// Raised before any allocation is attempted.
    #[error("Length limit exceeded: {requested} elements requested, at most {max} representable")]
    LengthLimit {
        /// Element count the operation needed.
        requested: usize,
        /// `max_size()` of the vector.
        max: usize,
    },

    /// The allocator refused the request.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}
