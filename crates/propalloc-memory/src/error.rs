// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for propalloc-memory.
use thiserror::Error;

/// Errors reported by [`Allocate`](crate::Allocate) operations.
///
/// On every error the region passed in (if any) is still valid and still
/// owned by the caller.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum AllocError {
    /// The allocator could not provide the requested storage.
    #[error("allocator could not provide storage for {count} elements")]
    OutOfMemory {
        /// Requested element count.
        count: usize,
    },

    /// The byte size of the request does not fit the address space.
    #[error("storage for {count} elements exceeds the address space")]
    LayoutOverflow {
        /// Requested element count.
        count: usize,
    },

    /// `reallocate` was called on an allocator that does not honor
    /// [`Reallocation`](crate::Reallocation).
    #[error("allocator does not support in-place reallocation")]
    Unsupported,
}
