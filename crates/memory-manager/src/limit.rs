// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-allocator byte accounting.

use crate::MemoryBudget;

/// Tracks the ceiling and currently reserved bytes for one allocator scope.
///
/// `reserved_bytes <= max_bytes` holds after every successful
/// [`try_reserve`](AllocationLimit::try_reserve). Lowering the ceiling with
/// [`set_max`](AllocationLimit::set_max) may leave `reserved_bytes` above it;
/// that only blocks further reservations until enough bytes are released.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AllocationLimit {
    max: MemoryBudget,
    reserved_bytes: usize,
    peak_reserved_bytes: usize,
}

impl AllocationLimit {
    /// Creates a limit with nothing reserved.
    pub fn new(max: MemoryBudget) -> Self {
        Self {
            max,
            reserved_bytes: 0,
            peak_reserved_bytes: 0,
        }
    }

    /// The configured ceiling.
    pub fn max(&self) -> MemoryBudget {
        self.max
    }

    /// The ceiling in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max.as_bytes()
    }

    /// Bytes currently reserved.
    pub fn reserved_bytes(&self) -> usize {
        self.reserved_bytes
    }

    /// Highest value `reserved_bytes` has reached.
    pub fn peak_reserved_bytes(&self) -> usize {
        self.peak_reserved_bytes
    }

    /// Bytes that can still be reserved under this ceiling alone.
    pub fn headroom(&self) -> usize {
        self.max.as_bytes().saturating_sub(self.reserved_bytes)
    }

    /// Returns `true` if `bytes` more could be reserved.
    pub fn can_reserve(&self, bytes: usize) -> bool {
        match self.reserved_bytes.checked_add(bytes) {
            Some(total) => total <= self.max.as_bytes(),
            None => false,
        }
    }

    /// Reserves `bytes`, or returns `false` and leaves the limit unchanged.
    pub fn try_reserve(&mut self, bytes: usize) -> bool {
        if !self.can_reserve(bytes) {
            return false;
        }
        self.reserved_bytes += bytes;
        self.peak_reserved_bytes = self.peak_reserved_bytes.max(self.reserved_bytes);
        true
    }

    /// Returns `bytes` to the limit.
    pub fn release(&mut self, bytes: usize) {
        debug_assert!(
            bytes <= self.reserved_bytes,
            "releasing {bytes} bytes with only {} reserved",
            self.reserved_bytes
        );
        self.reserved_bytes = self.reserved_bytes.saturating_sub(bytes);
    }

    /// Replaces the ceiling. Existing reservations are untouched.
    pub fn set_max(&mut self, max: MemoryBudget) {
        self.max = max;
    }
}
