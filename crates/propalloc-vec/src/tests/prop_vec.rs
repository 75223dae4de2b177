// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use propalloc_memory::{Global, Mallocator};
use propalloc_test_utils::{Instrumented, Tracked};

use crate::{PropVec, VecError};

// =============================================================================
// new(), new_in(), default()
// =============================================================================

#[test]
fn test_new() {
    let vec: PropVec<u8> = PropVec::new();

    assert_eq!(vec.len(), 0);
    assert_eq!(vec.capacity(), 0);
    assert!(vec.is_empty());
    assert!(vec.as_ptr().is_null());
    assert_eq!(vec.as_slice(), &[] as &[u8]);
}

#[test]
fn test_new_in_does_not_allocate() {
    let alloc = Instrumented::new(Global::new());
    let vec: PropVec<u64, _> = PropVec::new_in(alloc.clone());
    drop(vec);

    assert_eq!(alloc.stats().allocations, 0);
    assert_eq!(alloc.stats().deallocations, 0);
}

#[test]
fn test_default() {
    let vec: PropVec<String, Mallocator> = PropVec::default();

    assert!(vec.is_empty());
    assert_eq!(vec.allocator(), &Mallocator::new());
}

// =============================================================================
// from_slice(), from_slice_in(), from_iter_exact_in()
// =============================================================================

#[test]
fn test_from_slice_reserves_exact() {
    let vec = PropVec::from_slice(&[1u16, 2, 3]).expect("Failed to from_slice(..)");

    assert_eq!(vec.as_slice(), &[1, 2, 3]);
    assert_eq!(vec.capacity(), 3);
}

#[test]
fn test_from_slice_empty_does_not_allocate() {
    let alloc = Instrumented::new(Global::new());
    let vec = PropVec::<u8, _>::from_slice_in(&[], alloc.clone())
        .expect("Failed to from_slice_in(..)");

    assert!(vec.as_ptr().is_null());
    assert_eq!(alloc.stats().allocations, 0);
}

#[test]
fn test_from_slice_in_clones_each_element_once() {
    Tracked::reset();
    let source = [Tracked::new(1), Tracked::new(2)];

    let vec = PropVec::from_slice_in(&source, Mallocator::new())
        .expect("Failed to from_slice_in(..)");

    assert_eq!(vec.len(), 2);
    assert_eq!(Tracked::stats().clones, 2);
}

#[test]
fn test_from_iter_exact_in() {
    let vec = PropVec::from_iter_exact_in((1..5u32).map(|i| i * 10), Global::new())
        .expect("Failed to from_iter_exact_in(..)");

    assert_eq!(vec.as_slice(), &[10, 20, 30, 40]);
    assert_eq!(vec.capacity(), 4);
}

#[test]
fn test_from_iter_exact_in_over_max_size_never_allocates() {
    let alloc = Instrumented::new(Global::new());
    let result = PropVec::from_iter_exact_in((0..usize::MAX).map(|_| [0u8; 1024]), alloc.clone());

    let max = isize::MAX as usize / 1024;
    assert!(matches!(
        result,
        Err(VecError::LengthLimit { requested: usize::MAX, max: m }) if m == max
    ));
    assert_eq!(alloc.stats().allocations, 0);
    assert_eq!(alloc.stats().failures, 0);
}

// =============================================================================
// try_clone(), clone()
// =============================================================================

#[test]
fn test_try_clone_is_deep() {
    let source = PropVec::from_slice(&[String::from("a"), String::from("b")])
        .expect("Failed to from_slice(..)");
    let mut copy = source.try_clone().expect("Failed to try_clone()");

    copy[0].push('!');

    assert_eq!(source.as_slice(), &["a", "b"]);
    assert_eq!(copy.as_slice(), &["a!", "b"]);
    assert_ne!(source.as_ptr(), copy.as_ptr());
}

#[test]
fn test_clone_shares_allocator_counters() {
    let alloc = Instrumented::new(Global::new());
    let source = PropVec::from_slice_in(&[1u32, 2, 3], alloc.clone())
        .expect("Failed to from_slice_in(..)");

    let copy = source.clone();

    assert_eq!(copy, source);
    assert_eq!(alloc.stats().allocations, 2);
}

#[test]
fn test_clone_empty() {
    let source: PropVec<u8> = PropVec::new();
    let copy = source.clone();

    assert!(copy.as_ptr().is_null());
    assert_eq!(copy.capacity(), 0);
}

// =============================================================================
// try_clone_from(), clone_from()
// =============================================================================

#[test]
fn test_try_clone_from_replaces_contents() {
    let mut target = PropVec::from_slice(&[9u8; 16]).expect("Failed to from_slice(..)");
    let source = PropVec::from_slice(&[1u8, 2]).expect("Failed to from_slice(..)");

    target
        .try_clone_from(&source)
        .expect("Failed to try_clone_from(..)");

    assert_eq!(target.as_slice(), &[1, 2]);
    assert_eq!(target.capacity(), 2);
}

#[test]
fn test_try_clone_from_other_allocator() {
    let mut target: PropVec<u32, Mallocator> = PropVec::default();
    let source = PropVec::from_slice(&[5u32, 6]).expect("Failed to from_slice(..)");

    target
        .try_clone_from(&source)
        .expect("Failed to try_clone_from(..)");

    assert_eq!(target, source);
}

#[test]
fn test_clone_from_drops_previous_elements() {
    Tracked::reset();

    let mut target = PropVec::new();
    target.push_back(Tracked::new(1)).expect("Failed to push_back(..)");
    target.push_back(Tracked::new(2)).expect("Failed to push_back(..)");

    let mut source = PropVec::new();
    source.push_back(Tracked::new(3)).expect("Failed to push_back(..)");

    target.clone_from(&source);

    assert_eq!(target.len(), 1);
    assert_eq!(target[0].value(), 3);
    assert_eq!(Tracked::stats().drops, 2);
    assert_eq!(Tracked::stats().live(), 2);
}

// =============================================================================
// take(), swap()
// =============================================================================

#[test]
fn test_take_transfers_everything() {
    let mut source = PropVec::from_slice(&[1u64, 2, 3]).expect("Failed to from_slice(..)");
    let ptr = source.as_ptr();

    let taken = source.take();

    assert_eq!(taken.as_slice(), &[1, 2, 3]);
    assert_eq!(taken.capacity(), 3);
    assert_eq!(taken.as_ptr(), ptr);

    assert_eq!(source.len(), 0);
    assert_eq!(source.capacity(), 0);
    assert!(source.as_ptr().is_null());
}

#[test]
fn test_take_does_not_touch_allocator() {
    let alloc = Instrumented::new(Global::new());
    let mut source = PropVec::from_slice_in(&[1u8], alloc.clone())
        .expect("Failed to from_slice_in(..)");
    alloc.reset_stats();

    let taken = source.take();

    assert_eq!(alloc.stats().allocations, 0);
    drop(source);
    assert_eq!(alloc.stats().deallocations, 0);
    drop(taken);
    assert_eq!(alloc.stats().deallocations, 1);
}

#[test]
fn test_swap() {
    let mut a = PropVec::from_slice(&[1i32]).expect("Failed to from_slice(..)");
    let mut b = PropVec::from_slice(&[2i32, 3]).expect("Failed to from_slice(..)");

    a.swap(&mut b);

    assert_eq!(a.as_slice(), &[2, 3]);
    assert_eq!(b.as_slice(), &[1]);
}

// =============================================================================
// as_ptr(), as_mut_ptr(), as_slice(), as_mut_slice(), deref
// =============================================================================

#[test]
fn test_as_mut_slice_and_deref() {
    let mut vec = PropVec::from_slice(&[3u8, 1, 2]).expect("Failed to from_slice(..)");

    vec.as_mut_slice().sort_unstable();
    vec[0] = 10;

    assert_eq!(&*vec, &[10, 2, 3]);
    assert_eq!(vec.iter().copied().sum::<u8>(), 15);
}

#[test]
fn test_as_mut_ptr_null_without_buffer() {
    let mut vec: PropVec<u8> = PropVec::new();

    assert!(vec.as_mut_ptr().is_null());
    assert!(vec.as_mut_slice().is_empty());
}

// =============================================================================
// max_size()
// =============================================================================

#[test]
fn test_max_size() {
    let bytes: PropVec<u8> = PropVec::new();
    let words: PropVec<u32> = PropVec::new();
    let units: PropVec<()> = PropVec::new();

    assert_eq!(bytes.max_size(), isize::MAX as usize);
    assert_eq!(words.max_size(), isize::MAX as usize / 4);
    assert_eq!(units.max_size(), usize::MAX);
}

// =============================================================================
// emplace_back(), emplace_back_with(), try_emplace_back_with(), push_back()
// =============================================================================

#[test]
fn test_emplace_back_returns_new_element() {
    let mut vec = PropVec::new();

    let slot = vec
        .emplace_back(String::from("x"))
        .expect("Failed to emplace_back(..)");
    slot.push('y');

    assert_eq!(vec.as_slice(), &["xy"]);
}

#[test]
fn test_emplace_back_with() {
    let mut vec = PropVec::new_in(Mallocator::new());
    let mut next = 0u32;

    for _ in 0..4 {
        vec.emplace_back_with(|| {
            next += 1;
            next
        })
        .expect("Failed to emplace_back_with(..)");
    }

    assert_eq!(vec.as_slice(), &[1, 2, 3, 4]);
}

#[test]
fn test_try_emplace_back_with_error_leaves_vec_unchanged() {
    let mut vec = PropVec::from_slice(&[1u8]).expect("Failed to from_slice(..)");

    let result: Result<&mut u8, VecError> = vec.try_emplace_back_with(|| {
        Err(VecError::LengthLimit {
            requested: 0,
            max: 0,
        })
    });

    assert!(result.is_err());
    assert_eq!(vec.as_slice(), &[1]);
}

#[test]
fn test_push_back() {
    let mut vec = PropVec::new();

    for i in 0..100u64 {
        vec.push_back(i).expect("Failed to push_back(..)");
    }

    assert_eq!(vec.len(), 100);
    assert!(vec.iter().copied().eq(0..100));
}

#[test]
fn test_push_back_zero_sized() {
    let alloc = Instrumented::new(Global::new());
    let mut vec = PropVec::new_in(alloc.clone());

    for _ in 0..3 {
        vec.push_back(()).expect("Failed to push_back(..)");
    }

    assert_eq!(vec.len(), 3);
    assert_eq!(vec.capacity(), usize::MAX);
    assert!(!vec.as_ptr().is_null());

    drop(vec);
    assert_eq!(alloc.stats(), Default::default());
}

// =============================================================================
// pop()
// =============================================================================

#[test]
fn test_pop() {
    let mut vec = PropVec::from_slice(&[1u8, 2]).expect("Failed to from_slice(..)");

    assert_eq!(vec.pop(), Some(2));
    assert_eq!(vec.pop(), Some(1));
    assert_eq!(vec.pop(), None);
    assert_eq!(vec.capacity(), 2);
}

#[test]
fn test_pop_transfers_ownership() {
    Tracked::reset();

    let mut vec = PropVec::new();
    vec.push_back(Tracked::new(5)).expect("Failed to push_back(..)");

    let popped = vec.pop().expect("Failed to pop()");
    drop(vec);
    assert_eq!(Tracked::stats().drops, 0);

    drop(popped);
    assert_eq!(Tracked::stats().drops, 1);
}

// =============================================================================
// try_extend_from_slice()
// =============================================================================

#[test]
fn test_try_extend_from_slice_grows_once() {
    let alloc = Instrumented::new(Global::new());
    let mut vec = PropVec::new_in(alloc.clone());
    vec.push_back(0u8).expect("Failed to push_back(..)");
    alloc.reset_stats();

    vec.try_extend_from_slice(&[1; 10])
        .expect("Failed to try_extend_from_slice(..)");

    assert_eq!(vec.len(), 11);
    assert_eq!(vec.capacity(), 11);
    assert_eq!(alloc.stats().reallocations, 1);
}

#[test]
fn test_try_extend_from_slice_uses_growth_factor() {
    let mut vec = PropVec::from_slice(&[0u8; 4]).expect("Failed to from_slice(..)");

    vec.try_extend_from_slice(&[1]).expect("Failed to try_extend_from_slice(..)");

    assert_eq!(vec.capacity(), 8);
}

// =============================================================================
// reserve()
// =============================================================================

#[test]
fn test_reserve_is_exact() {
    let mut vec: PropVec<u32> = PropVec::new();

    vec.reserve(7).expect("Failed to reserve(..)");
    assert_eq!(vec.capacity(), 7);

    vec.reserve(3).expect("Failed to reserve(..)");
    assert_eq!(vec.capacity(), 7);
}

#[test]
fn test_reserve_zero_does_not_allocate() {
    let alloc = Instrumented::new(Global::new());
    let mut vec: PropVec<u32, _> = PropVec::new_in(alloc.clone());

    vec.reserve(0).expect("Failed to reserve(..)");

    assert!(vec.as_ptr().is_null());
    assert_eq!(alloc.stats().allocations, 0);
}

#[test]
fn test_reserve_over_max_size() {
    let alloc = Instrumented::new(Global::new());
    let mut vec: PropVec<u64, _> = PropVec::new_in(alloc.clone());
    let max = vec.max_size();

    assert_eq!(
        vec.reserve(max + 1),
        Err(VecError::LengthLimit {
            requested: max + 1,
            max,
        })
    );
    assert_eq!(alloc.stats(), Default::default());
}

// =============================================================================
// resize(), resize_default(), resize_with(), truncate()
// =============================================================================

#[test]
fn test_resize_grows_with_clones() {
    let mut vec = PropVec::from_slice(&[String::from("a")]).expect("Failed to from_slice(..)");

    vec.resize(3, String::from("z")).expect("Failed to resize(..)");

    assert_eq!(vec.as_slice(), &["a", "z", "z"]);
    assert_eq!(vec.capacity(), 3);
}

#[test]
fn test_resize_default() {
    let mut vec: PropVec<u16> = PropVec::new();

    vec.resize_default(4).expect("Failed to resize_default(..)");

    assert_eq!(vec.as_slice(), &[0, 0, 0, 0]);
}

#[test]
fn test_resize_with() {
    let mut vec: PropVec<usize> = PropVec::new();
    let mut counter = 0;

    vec.resize_with(3, || {
        counter += 1;
        counter * 2
    })
    .expect("Failed to resize_with(..)");

    assert_eq!(vec.as_slice(), &[2, 4, 6]);
}

#[test]
fn test_resize_shrink_keeps_capacity() {
    Tracked::reset();

    let mut vec = PropVec::new();
    for i in 0..6 {
        vec.push_back(Tracked::new(i)).expect("Failed to push_back(..)");
    }
    let capacity = vec.capacity();

    vec.resize(2, Tracked::new(99)).expect("Failed to resize(..)");

    assert_eq!(vec.len(), 2);
    assert_eq!(vec.capacity(), capacity);
    // 4 trailing elements plus the unused fill value.
    assert_eq!(Tracked::stats().drops, 5);
}

#[test]
fn test_truncate_drops_exactly_tail() {
    Tracked::reset();

    let mut vec = PropVec::new();
    for i in 0..5 {
        vec.push_back(Tracked::new(i)).expect("Failed to push_back(..)");
    }

    vec.truncate(5);
    assert_eq!(Tracked::stats().drops, 0);

    vec.truncate(1);
    assert_eq!(Tracked::stats().drops, 4);
    assert_eq!(vec[0].value(), 0);
}

// =============================================================================
// clear(), release(), drop()
// =============================================================================

#[test]
fn test_clear_keeps_buffer() {
    let mut vec = PropVec::from_slice(&[1u8, 2, 3]).expect("Failed to from_slice(..)");
    let ptr = vec.as_ptr();

    vec.clear();

    assert!(vec.is_empty());
    assert_eq!(vec.capacity(), 3);
    assert_eq!(vec.as_ptr(), ptr);
}

#[test]
fn test_release_returns_buffer() {
    let alloc = Instrumented::new(Global::new());
    let mut vec = PropVec::from_slice_in(&[1u8, 2, 3], alloc.clone())
        .expect("Failed to from_slice_in(..)");

    vec.release();

    assert_eq!(vec.capacity(), 0);
    assert!(vec.as_ptr().is_null());
    assert_eq!(alloc.stats().live_regions(), 0);

    // Usable again.
    vec.push_back(4).expect("Failed to push_back(..)");
    assert_eq!(vec.as_slice(), &[4]);
}

#[test]
fn test_drop_releases_everything() {
    Tracked::reset();
    let alloc = Instrumented::new(Global::new());

    {
        let mut vec = PropVec::new_in(alloc.clone());
        for i in 0..10 {
            vec.push_back(Tracked::new(i)).expect("Failed to push_back(..)");
        }
    }

    assert_eq!(Tracked::stats().live(), 0);
    assert_eq!(alloc.stats().live_regions(), 0);
}

// =============================================================================
// Debug, PartialEq
// =============================================================================

#[test]
fn test_debug_lists_elements() {
    let vec = PropVec::from_slice(&[1u8, 2]).expect("Failed to from_slice(..)");

    assert_eq!(format!("{vec:?}"), "[1, 2]");
}

#[test]
fn test_eq_across_allocators() {
    let a = PropVec::from_slice(&[1u32, 2]).expect("Failed to from_slice(..)");
    let b = PropVec::from_slice_in(&[1u32, 2], Mallocator::new())
        .expect("Failed to from_slice_in(..)");
    let c = PropVec::from_slice_in(&[1u32], Mallocator::new())
        .expect("Failed to from_slice_in(..)");

    assert!(a == b);
    assert!(a != c);
}

// =============================================================================
// VecError
// =============================================================================

#[test]
fn test_error_display() {
    let err = VecError::LengthLimit {
        requested: 10,
        max: 4,
    };

    assert_eq!(
        err.to_string(),
        "Length limit exceeded: 10 elements requested, at most 4 representable"
    );
}
