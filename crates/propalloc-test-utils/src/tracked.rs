// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::cell::Cell;

/// Clone behaviour of [`Tracked`] values on the current thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackedBehaviour {
    /// Normal behaviour - clones always succeed.
    #[default]
    None,
    /// The n-th clone (1-based, counted from when this behaviour was set)
    /// panics. Later clones succeed again.
    PanicAtClone(usize),
}

/// Per-thread counters for [`Tracked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackedStats {
    /// Values built with [`Tracked::new`] or [`Default`].
    pub created: usize,
    /// Successful clones.
    pub clones: usize,
    /// Drops.
    pub drops: usize,
}

impl TrackedStats {
    /// Values currently alive on this thread.
    pub fn live(&self) -> usize {
        self.created + self.clones - self.drops
    }
}

thread_local! {
    static STATS: Cell<TrackedStats> = const { Cell::new(TrackedStats { created: 0, clones: 0, drops: 0 }) };
    static BEHAVIOUR: Cell<TrackedBehaviour> = const { Cell::new(TrackedBehaviour::None) };
    static CLONE_ATTEMPTS: Cell<usize> = const { Cell::new(0) };
}

fn record(f: impl FnOnce(&mut TrackedStats)) {
    STATS.with(|cell| {
        let mut stats = cell.get();
        f(&mut stats);
        cell.set(stats);
    });
}

/// Element type whose constructions, clones and drops are counted.
///
/// Counters are thread-local, so tests running in parallel do not see each
/// other. Has drop glue, which makes it non-bitwise-relocatable.
///
/// # Example
///
/// ```rust
/// use propalloc_test_utils::{Tracked, TrackedBehaviour};
///
/// Tracked::reset();
/// let a = Tracked::new(1);
///
/// Tracked::change_behaviour(TrackedBehaviour::PanicAtClone(1));
/// assert!(std::panic::catch_unwind(|| a.clone()).is_err());
///
/// let b = a.clone();
/// drop(b);
///
/// let stats = Tracked::stats();
/// assert_eq!(stats.clones, 1);
/// assert_eq!(stats.live(), 1);
/// ```
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tracked {
    value: u64,
}

impl Tracked {
    /// Creates a counted value.
    pub fn new(value: u64) -> Self {
        record(|stats| stats.created += 1);
        Self { value }
    }

    /// The payload.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Counters for the current thread.
    pub fn stats() -> TrackedStats {
        STATS.with(Cell::get)
    }

    /// Resets counters and behaviour for the current thread.
    pub fn reset() {
        STATS.with(|cell| cell.set(TrackedStats::default()));
        Self::change_behaviour(TrackedBehaviour::None);
    }

    /// Changes clone behaviour for the current thread.
    pub fn change_behaviour(behaviour: TrackedBehaviour) {
        BEHAVIOUR.with(|cell| cell.set(behaviour));
        CLONE_ATTEMPTS.with(|cell| cell.set(0));
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let attempt = CLONE_ATTEMPTS.with(|cell| {
            let attempt = cell.get() + 1;
            cell.set(attempt);
            attempt
        });

        if BEHAVIOUR.with(Cell::get) == TrackedBehaviour::PanicAtClone(attempt) {
            panic!("Tracked::clone() panicked on attempt {attempt}");
        }

        record(|stats| stats.clones += 1);
        Self { value: self.value }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        record(|stats| stats.drops += 1);
    }
}
