// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property-based tests for vector capacity, growth, copy, and split.

use memory_manager::{BufferAllocator, MemoryBudget, RoundingPolicy};
use proptest::prelude::*;
use vector_core::{BigIntVector, Float8Vector, IntVector, SmallIntVector};

fn exact_allocator() -> BufferAllocator {
    BufferAllocator::with_policy("exact", MemoryBudget::from_mb(16), RoundingPolicy::Exact)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// With exact rounding, a byte budget that is a multiple of the width
    /// yields exactly budget / width elements.
    #[test]
    fn capacity_matches_byte_budget(elements in 1usize..8192) {
        let allocator = exact_allocator();
        let mut v = BigIntVector::new("cap", &allocator);
        v.allocate_new_with_capacity(elements).unwrap();
        prop_assert_eq!(v.value_capacity(), elements);
        prop_assert_eq!(v.buffer_capacity_bytes(), elements * 8);
    }

    /// Power-of-two rounding never hands out fewer elements than requested.
    #[test]
    fn rounded_capacity_covers_request(elements in 1usize..100_000) {
        let allocator = BufferAllocator::new(MemoryBudget::from_mb(16));
        let mut v = SmallIntVector::new("cap", &allocator);
        v.allocate_new_with_capacity(elements).unwrap();
        prop_assert!(v.value_capacity() >= elements);
        prop_assert!(v.value_capacity() < elements * 2);
    }

    /// Reset zeroes every element, whatever was written before.
    #[test]
    fn reset_zeroes(values in prop::collection::vec(any::<i32>(), 1..512)) {
        let allocator = BufferAllocator::new(MemoryBudget::from_mb(16));
        let mut v = IntVector::new("reset", &allocator);
        v.allocate_new_with_capacity(values.len()).unwrap();
        for (i, x) in values.iter().enumerate() {
            v.mutator().set(i, *x).unwrap();
        }
        v.reset().unwrap();
        let zeros = v.accessor().to_vec().unwrap();
        prop_assert!(zeros.iter().all(|x| *x == 0));
        v.reset().unwrap();
        prop_assert_eq!(v.accessor().to_vec().unwrap(), zeros);
    }

    /// Doubling keeps every value at its index and zero-fills the new half.
    #[test]
    fn re_alloc_preserves_prefix(values in prop::collection::vec(any::<i64>(), 1..512)) {
        let allocator = exact_allocator();
        let mut v = BigIntVector::new("grow", &allocator);
        v.allocate_new_with_capacity(values.len()).unwrap();
        for (i, x) in values.iter().enumerate() {
            v.mutator().set(i, *x).unwrap();
        }
        v.re_alloc().unwrap();
        prop_assert_eq!(v.value_capacity(), values.len() * 2);
        let after = v.accessor().to_vec().unwrap();
        prop_assert_eq!(&after[..values.len()], &values[..]);
        prop_assert!(after[values.len()..].iter().all(|x| *x == 0));
    }

    /// Copies land at the destination index, growing it when needed.
    #[test]
    fn copy_reads_back(
        values in prop::collection::vec(any::<i32>(), 1..256),
        pick in any::<prop::sample::Index>(),
        dest_index in 0usize..2048,
    ) {
        let allocator = BufferAllocator::new(MemoryBudget::from_mb(16));
        let mut source = IntVector::new("source", &allocator);
        source.allocate_new_with_capacity(values.len()).unwrap();
        for (i, x) in values.iter().enumerate() {
            source.mutator().set(i, *x).unwrap();
        }

        let mut dest = IntVector::new("dest", &allocator);
        dest.allocate_new_with_capacity(16).unwrap();
        dest.mutator().set(0, -1).unwrap();

        let from = pick.index(values.len());
        dest.copy_from(from, dest_index, &source).unwrap();
        prop_assert!(dest.value_capacity() > dest_index);
        prop_assert_eq!(dest.accessor().get(dest_index).unwrap(), values[from]);
        if dest_index != 0 {
            prop_assert_eq!(dest.accessor().get(0).unwrap(), -1);
        }
    }

    /// A split target reads the source range as of the call.
    #[test]
    fn split_matches_source_range(
        len in 1usize..1024,
        start_frac in 0.0f64..1.0,
        length_frac in 0.0f64..1.0,
    ) {
        let allocator = exact_allocator();
        let mut source = Float8Vector::new("source", &allocator);
        source.allocate_new_with_capacity(len).unwrap();
        for i in 0..len {
            source.mutator().set(i, i as f64 * 2.0).unwrap();
        }

        let start = ((len as f64) * start_frac) as usize;
        let length = (((len - start) as f64) * length_frac) as usize;
        let mut target = Float8Vector::new("target", &allocator);
        source.split_and_transfer_to(start, length, &mut target).unwrap();

        prop_assert_eq!(target.value_capacity(), length);
        for i in 0..length {
            prop_assert_eq!(
                target.accessor().get(i).unwrap(),
                source.accessor().get(start + i).unwrap()
            );
        }

        // Writes on either side stay private after the split.
        if length > 0 {
            target.mutator().set(0, -1.0).unwrap();
            prop_assert_eq!(source.accessor().get(start).unwrap(), start as f64 * 2.0);
        }
    }

    /// Every byte returns to the allocator once the vectors are gone.
    #[test]
    fn accounting_returns_to_zero(ops in prop::collection::vec(0u8..4, 1..32)) {
        let allocator = BufferAllocator::new(MemoryBudget::from_mb(16));
        {
            let mut a = IntVector::new("a", &allocator);
            let mut b = IntVector::new("b", &allocator);
            for op in ops {
                match op {
                    0 => a.allocate_new_with_capacity(64).unwrap(),
                    1 => {
                        if a.value_capacity() < 1 << 16 {
                            a.re_alloc().unwrap();
                        }
                    }
                    2 => {
                        let half = a.value_capacity() / 2;
                        a.split_and_transfer_to(0, half, &mut b).unwrap();
                    }
                    _ => b.clear().unwrap(),
                }
            }
        }
        prop_assert_eq!(allocator.reserved_bytes(), 0);
        prop_assert!(allocator.close().is_ok());
    }
}
