// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: the same lifecycle suite run against every element width.
//!
//! Each suite allocates, fills, resets, copies, splits, grows, and clears a
//! vector against a root allocator, then checks that every byte made it back
//! to the allocator before closing it.

use memory_manager::{BufferAllocator, ErrorKind, MemoryBudget, RoundingPolicy};
use vector_core::{
    BigIntVector, FixedWidth, Float4Vector, Float8Vector, IntVector, SmallIntVector,
    INITIAL_VALUE_ALLOCATION,
};

const TEST_SIZE_SMALL: usize = 10;
const TEST_SIZE_LARGE: usize = 1000;

macro_rules! width_suite {
    ($module:ident, $vector:ty, $elem:ty) => {
        mod $module {
            use super::*;

            fn value(i: usize) -> $elem {
                i as $elem
            }

            fn root() -> BufferAllocator {
                BufferAllocator::new(MemoryBudget::from_mb(64))
            }

            #[test]
            fn insertion() {
                let allocator = root();
                let mut v = <$vector>::new("insert", &allocator);
                v.allocate_new_with_capacity(TEST_SIZE_SMALL).unwrap();
                let len = v.value_capacity();
                assert!(len >= TEST_SIZE_SMALL);

                let mut m = v.mutator();
                for i in 0..len {
                    m.set(i, value(len - (1 + i))).unwrap();
                }
                let r = v.accessor();
                for i in 0..len {
                    assert_eq!(r.get(i).unwrap(), value(len - (1 + i)));
                }

                v.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn reset_zeroes_everything() {
                let allocator = root();
                let mut v = <$vector>::new("reset", &allocator);
                v.allocate_new().unwrap();
                let len = v.value_capacity();
                assert_eq!(len, INITIAL_VALUE_ALLOCATION);

                let mut m = v.mutator();
                for i in 0..len {
                    m.set(i, value(len - (1 + i))).unwrap();
                }
                v.reset().unwrap();
                v.reset().unwrap();
                assert_eq!(v.value_capacity(), len);
                let zeros = v.accessor().to_vec().unwrap();
                assert!(zeros.iter().all(|x| *x == <$elem>::default()));

                v.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn copy_including_growth() {
                let allocator = root();
                let mut source = <$vector>::new("source", &allocator);
                source.allocate_new_with_capacity(TEST_SIZE_SMALL).unwrap();
                let len = source.value_capacity();
                for i in 0..TEST_SIZE_SMALL {
                    source.mutator().set(i, value(i * 2)).unwrap();
                }

                let mut copy = <$vector>::new("copy", &allocator);
                copy.allocate_new().unwrap();
                let copy_len = copy.value_capacity();
                let copy_idx = len / 2;

                copy.copy_from(copy_idx, 1, &source).unwrap();
                assert_eq!(
                    copy.accessor().get(1).unwrap(),
                    source.accessor().get(copy_idx).unwrap()
                );

                // Past the end: the destination doubles and keeps index 1.
                copy.copy_from(copy_idx, copy_len + 1, &source).unwrap();
                assert_eq!(copy.value_capacity(), copy_len * 2);
                assert_eq!(
                    copy.accessor().get(copy_len + 1).unwrap(),
                    source.accessor().get(copy_idx).unwrap()
                );
                assert_eq!(
                    copy.accessor().get(1).unwrap(),
                    source.accessor().get(copy_idx).unwrap()
                );

                copy.close().unwrap();
                source.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn split_and_transfer() {
                let allocator = root();
                let mut source = <$vector>::new("source", &allocator);
                source.allocate_new_with_capacity(TEST_SIZE_LARGE).unwrap();
                let len = source.value_capacity();
                let mut m = source.mutator();
                for i in 0..len {
                    m.set(i, value(i * 2)).unwrap();
                }

                let mut split = <$vector>::new("split", &allocator);
                split.allocate_new().unwrap();
                source.split_and_transfer_to(0, len / 2, &mut split).unwrap();
                assert_eq!(split.value_capacity(), len / 2);

                let (r, s) = (source.accessor(), split.accessor());
                for i in 0..split.value_capacity() {
                    assert_eq!(r.get(i).unwrap(), s.get(i).unwrap());
                }

                split.close().unwrap();
                source.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn clear_drops_capacity() {
                let allocator = root();
                let mut v = <$vector>::new("clear", &allocator);
                v.allocate_new_with_capacity(TEST_SIZE_SMALL).unwrap();
                v.clear().unwrap();
                assert_eq!(v.value_capacity(), 0);
                assert_eq!(v.accessor().get(0).unwrap_err().kind(), ErrorKind::IndexOutOfBounds);
                assert_eq!(
                    v.mutator().set(0, value(1)).unwrap_err().kind(),
                    ErrorKind::IndexOutOfBounds
                );
                assert_eq!(allocator.reserved_bytes(), 0);
                allocator.close().unwrap();
            }

            #[test]
            fn alloc_then_realloc() {
                let allocator = root();
                let mut v = <$vector>::new("realloc", &allocator);
                v.allocate_new().unwrap();
                assert_eq!(v.value_capacity(), INITIAL_VALUE_ALLOCATION);
                v.mutator().set(INITIAL_VALUE_ALLOCATION - 1, value(7)).unwrap();

                v.re_alloc().unwrap();
                assert_eq!(v.value_capacity(), INITIAL_VALUE_ALLOCATION * 2);
                assert_eq!(
                    v.accessor().get(INITIAL_VALUE_ALLOCATION - 1).unwrap(),
                    value(7)
                );

                v.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn set_and_get() {
                let allocator = root();
                let mut v = <$vector>::new("set_get", &allocator);
                v.allocate_new_with_capacity(TEST_SIZE_LARGE).unwrap();
                let len = v.value_capacity();
                for i in 0..len {
                    v.mutator().set(i, value(len - (1 + i))).unwrap();
                }
                for i in 0..len {
                    assert_eq!(v.accessor().get(i).unwrap(), value(len - (1 + i)));
                }
                v.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn allocation_under_changing_limit() {
                let allocator = BufferAllocator::new(MemoryBudget::from_bytes(0));
                let mut v = <$vector>::new("limited", &allocator);

                let max = <$elem as FixedWidth>::max_value_count();
                let err = v.allocate_new_with_capacity(max).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::AllocationExceeded);
                assert_eq!(v.value_capacity(), 0);

                let err = v.allocate_new_with_capacity(max + 1).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

                allocator.set_limit(MemoryBudget::from_bytes(5000));
                v.allocate_new_with_capacity(256).unwrap();
                assert_eq!(v.value_capacity(), 256);

                let len = v.value_capacity();
                for i in 0..len {
                    v.mutator().set(i, value(len - (1 + i))).unwrap();
                }
                for i in 0..len {
                    assert_eq!(v.accessor().get(i).unwrap(), value(len - (1 + i)));
                }

                v.close().unwrap();
                allocator.close().unwrap();
            }

            fn exact(elements: usize) -> BufferAllocator {
                let bytes = elements * <$elem as FixedWidth>::WIDTH;
                BufferAllocator::with_policy("exact", MemoryBudget::from_bytes(bytes), RoundingPolicy::Exact)
            }

            #[test]
            fn allocate_replaces_at_budget_edge() {
                let allocator = exact(1024);
                let mut v = <$vector>::new("edge", &allocator);
                v.allocate_new_with_capacity(1024).unwrap();
                v.allocate_new_with_capacity(1024).unwrap();
                assert_eq!(v.value_capacity(), 1024);
                v.mutator().set(1023, value(7)).unwrap();

                // Too big even once the current buffer is returned.
                let err = v.allocate_new_with_capacity(2048).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::AllocationExceeded);
                assert_eq!(v.value_capacity(), 1024);
                assert_eq!(v.accessor().get(1023).unwrap(), value(7));

                v.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn failed_growth_keeps_capacity() {
                let allocator = exact(128);
                let mut v = <$vector>::new("growth", &allocator);
                v.allocate_new_with_capacity(64).unwrap();
                v.mutator().set(10, value(10)).unwrap();

                let err = v.mutator().set_safe(200, value(1)).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::AllocationExceeded);
                assert_eq!(v.value_capacity(), 64);
                assert_eq!(v.accessor().get(10).unwrap(), value(10));

                let mut source = <$vector>::new("source", &allocator);
                source.allocate_new_with_capacity(1).unwrap();
                let err = v.copy_from(0, 200, &source).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::AllocationExceeded);
                assert_eq!(v.value_capacity(), 64);

                source.close().unwrap();
                v.close().unwrap();
                allocator.close().unwrap();
            }

            #[test]
            fn leaked_vector_blocks_clean_close() {
                let allocator = root();
                let mut v = <$vector>::new("leak", &allocator);
                v.allocate_new_with_capacity(TEST_SIZE_SMALL).unwrap();

                let err = allocator.close().unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidState);
                v.close().unwrap();
            }
        }
    };
}

width_suite!(small_int, SmallIntVector, i16);
width_suite!(int, IntVector, i32);
width_suite!(big_int, BigIntVector, i64);
width_suite!(float4, Float4Vector, f32);
width_suite!(float8, Float8Vector, f64);

#[test]
fn vectors_from_sibling_allocators() {
    let root = BufferAllocator::new(MemoryBudget::from_mb(1));
    let scan = root.new_child("scan", MemoryBudget::from_kb(16)).unwrap();
    let agg = root.new_child("agg", MemoryBudget::from_kb(16)).unwrap();

    let mut source = IntVector::new("scan.col", &scan);
    source.allocate_new_with_capacity(1024).unwrap();
    for i in 0..1024 {
        source.mutator().set(i, i as i32).unwrap();
    }

    let mut target = IntVector::new("agg.col", &agg);
    source.split_and_transfer_to(512, 512, &mut target).unwrap();
    assert_eq!(target.accessor().get(0).unwrap(), 512);
    assert_eq!(target.allocator().name(), "agg");

    // The child budget caps growth independently of the root.
    let mut big = IntVector::new("agg.big", &agg);
    let err = big.allocate_new_with_capacity(8192).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AllocationExceeded);

    target.close().unwrap();
    source.close().unwrap();
    drop(big);
    scan.close().unwrap();
    agg.close().unwrap();
    root.close().unwrap();
}
