// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for propalloc crates.
//!
//! - [`Instrumented`]: allocator wrapper counting calls and injecting
//!   failures.
//! - [`Tracked`]: element type counting clones and drops, optionally
//!   panicking on a chosen clone.
//!
//! ## License
//!
//! GPL-3.0-only

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

mod instrumented;
mod tracked;

pub use instrumented::{Instrumented, InstrumentedBehaviour, InstrumentedStats};
pub use tracked::{Tracked, TrackedBehaviour, TrackedStats};
