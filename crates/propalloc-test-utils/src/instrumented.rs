// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use std::cell::Cell;
use std::rc::Rc;

use propalloc_memory::{
    AllocError, Allocate, Layout, Overallocation, Preferable, Prefer, Query, Reallocation, Region,
    Requirable, Require,
};

/// Failure injection for [`Instrumented`].
///
/// Behaviour is sticky: once set, every matching call fails until it is
/// changed back to [`InstrumentedBehaviour::None`].
///
/// # Example
///
/// ```rust
/// use propalloc_memory::{Allocate, Global, Region, Require, storage_for};
/// use propalloc_test_utils::{Instrumented, InstrumentedBehaviour};
///
/// let alloc = Instrumented::new(Global::new()).require(storage_for::<u32>());
///
/// alloc.change_behaviour(InstrumentedBehaviour::FailAtAllocate);
/// assert!(alloc.allocate(Region::EMPTY, 4).is_err());
///
/// alloc.change_behaviour(InstrumentedBehaviour::None);
/// let region = alloc.allocate(Region::EMPTY, 4).expect("Failed to allocate(..)");
///
/// // SAFETY: region was just returned by `alloc`.
/// unsafe { alloc.deallocate(region) };
/// assert_eq!(alloc.stats().live_regions(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstrumentedBehaviour {
    /// Normal behaviour - no injected failures.
    #[default]
    None,
    /// `allocate()` fails with `OutOfMemory`.
    FailAtAllocate,
    /// `reallocate()` fails with `OutOfMemory`.
    FailAtReallocate,
    /// Both `allocate()` and `reallocate()` fail.
    FailAtAny,
}

/// Call counters shared by an [`Instrumented`] allocator and everything
/// adapted from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstrumentedStats {
    /// Successful `allocate()` calls.
    pub allocations: usize,
    /// Successful `reallocate()` calls.
    pub reallocations: usize,
    /// `deallocate()` calls.
    pub deallocations: usize,
    /// Calls that returned an error, injected or not.
    pub failures: usize,
}

impl InstrumentedStats {
    /// Regions handed out and not yet released.
    pub fn live_regions(&self) -> usize {
        self.allocations - self.deallocations
    }
}

#[derive(Debug, Default)]
struct Probe {
    stats: Cell<InstrumentedStats>,
    behaviour: Cell<InstrumentedBehaviour>,
}

impl Probe {
    fn record(&self, f: impl FnOnce(&mut InstrumentedStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

/// Allocator wrapper that counts calls and injects failures.
///
/// Negotiating on an `Instrumented` allocator produces another
/// `Instrumented` sharing the same counters and behaviour, so a container's
/// internal negotiations stay observable from the test.
///
/// With `REALLOCATION = false` the wrapper hides the inner allocator's
/// reallocation capability, forcing containers onto their allocate-and-move
/// path even for bitwise-relocatable element types.
#[derive(Debug, Clone)]
pub struct Instrumented<A, const REALLOCATION: bool = true> {
    inner: A,
    probe: Rc<Probe>,
}

impl<A> Instrumented<A> {
    /// Wraps `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            probe: Rc::default(),
        }
    }
}

impl<A> Instrumented<A, false> {
    /// Wraps `inner`, reporting reallocation as unsupported.
    pub fn without_reallocation(inner: A) -> Self {
        Self {
            inner,
            probe: Rc::default(),
        }
    }
}

impl<A, const REALLOCATION: bool> Instrumented<A, REALLOCATION> {
    /// The wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> InstrumentedStats {
        self.probe.stats.get()
    }

    /// Resets every counter to zero.
    pub fn reset_stats(&self) {
        self.probe.stats.set(InstrumentedStats::default());
    }

    /// Changes failure injection for this allocator and all allocators
    /// sharing its counters.
    pub fn change_behaviour(&self, behaviour: InstrumentedBehaviour) {
        self.probe.behaviour.set(behaviour);
    }

    fn adapted<B>(&self, inner: B) -> Instrumented<B, REALLOCATION> {
        Instrumented {
            inner,
            probe: Rc::clone(&self.probe),
        }
    }

    fn injected(&self, count: usize, at: InstrumentedBehaviour) -> Result<(), AllocError> {
        let behaviour = self.probe.behaviour.get();

        if behaviour == at || behaviour == InstrumentedBehaviour::FailAtAny {
            log::debug!("injected failure ({behaviour:?}) for {count} elements");
            self.probe.record(|stats| stats.failures += 1);
            return Err(AllocError::OutOfMemory { count });
        }

        Ok(())
    }
}

impl<A, P, const REALLOCATION: bool> Require<P> for Instrumented<A, REALLOCATION>
where
    A: Require<P>,
    P: Requirable,
{
    type Output = Instrumented<A::Output, REALLOCATION>;

    fn require(&self, property: P) -> Self::Output {
        self.adapted(self.inner.require(property))
    }
}

impl<A, P, const REALLOCATION: bool> Prefer<P> for Instrumented<A, REALLOCATION>
where
    A: Prefer<P>,
    P: Preferable,
{
    type Output = Instrumented<A::Output, REALLOCATION>;

    fn prefer(&self, property: P) -> Self::Output {
        self.adapted(self.inner.prefer(property))
    }
}

impl<A, U, const ALIGN: usize, const REALLOCATION: bool> Query<Layout<U, ALIGN>>
    for Instrumented<A, REALLOCATION>
where
    A: Query<Layout<U, ALIGN>>,
{
    const SATISFIED: bool = A::SATISFIED;
}

impl<A, const REALLOCATION: bool> Query<Reallocation> for Instrumented<A, REALLOCATION>
where
    A: Query<Reallocation>,
{
    const SATISFIED: bool = REALLOCATION && A::SATISFIED;
}

impl<A, const REALLOCATION: bool> Query<Overallocation> for Instrumented<A, REALLOCATION>
where
    A: Query<Overallocation>,
{
    const SATISFIED: bool = A::SATISFIED;
}

impl<A, const REALLOCATION: bool> Allocate for Instrumented<A, REALLOCATION>
where
    A: Allocate,
{
    fn allocate(&self, hint: Region, count: usize) -> Result<Region, AllocError> {
        self.injected(count, InstrumentedBehaviour::FailAtAllocate)?;

        match self.inner.allocate(hint, count) {
            Ok(region) => {
                self.probe.record(|stats| stats.allocations += 1);
                Ok(region)
            }
            Err(err) => {
                self.probe.record(|stats| stats.failures += 1);
                Err(err)
            }
        }
    }

    unsafe fn reallocate(&self, region: Region, count: usize) -> Result<Region, AllocError> {
        if !REALLOCATION {
            return Err(AllocError::Unsupported);
        }

        self.injected(count, InstrumentedBehaviour::FailAtReallocate)?;

        // SAFETY (PRECONDITIONS ARE MET): forwarded from the caller.
        match unsafe { self.inner.reallocate(region, count) } {
            Ok(region) => {
                self.probe.record(|stats| stats.reallocations += 1);
                Ok(region)
            }
            Err(err) => {
                self.probe.record(|stats| stats.failures += 1);
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, region: Region) {
        self.probe.record(|stats| stats.deallocations += 1);

        // SAFETY (PRECONDITIONS ARE MET): forwarded from the caller.
        unsafe { self.inner.deallocate(region) };
    }
}

impl<A: Default> Default for Instrumented<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}
