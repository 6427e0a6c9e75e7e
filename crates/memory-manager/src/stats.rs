// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for diagnostics.
//!
//! [`AllocationStats`] tracks cumulative metrics about how an allocator is
//! being used: request counts, rounding overhead, rejected requests, and how
//! often shared storage had to be detached on write.

/// Cumulative statistics about allocator usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Total number of acquire requests, successful or not. Copy-on-write
    /// detaches count as acquisitions.
    pub total_acquisitions: u64,
    /// Number of requests rejected by a budget.
    pub rejected_acquisitions: u64,
    /// Number of allocations returned to the allocator.
    pub total_releases: u64,
    /// Bytes callers asked for across successful requests.
    pub requested_bytes: u64,
    /// Bytes actually reserved after rounding.
    pub reserved_bytes: u64,
    /// Zero-copy slices handed out of existing allocations.
    pub shared_slices: u64,
    /// Writes that had to copy a shared slice into a private allocation.
    pub copy_on_write_detaches: u64,
}

impl AllocationStats {
    /// Ratio of reserved to requested bytes; `1.0` means no rounding waste.
    ///
    /// Returns `1.0` if nothing has been requested.
    pub fn rounding_overhead(&self) -> f64 {
        if self.requested_bytes == 0 {
            return 1.0;
        }
        self.reserved_bytes as f64 / self.requested_bytes as f64
    }

    /// Allocations acquired and not yet released.
    pub fn live_allocations(&self) -> u64 {
        (self.total_acquisitions - self.rejected_acquisitions).saturating_sub(self.total_releases)
    }

    pub(crate) fn record_acquisition(&mut self, requested: usize, reserved: usize) {
        self.total_acquisitions += 1;
        self.requested_bytes += requested as u64;
        self.reserved_bytes += reserved as u64;
    }

    pub(crate) fn record_rejection(&mut self) {
        self.total_acquisitions += 1;
        self.rejected_acquisitions += 1;
    }

    pub(crate) fn record_release(&mut self) {
        self.total_releases += 1;
    }

    pub(crate) fn record_shared_slice(&mut self) {
        self.shared_slices += 1;
    }

    pub(crate) fn record_detach(&mut self, bytes: usize) {
        self.copy_on_write_detaches += 1;
        self.record_acquisition(bytes, bytes);
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Acquisitions: {} total ({} rejected, {} live), {} releases, \
             {} bytes requested / {} reserved ({:.2}x), {} shared slices, {} detaches",
            self.total_acquisitions,
            self.rejected_acquisitions,
            self.live_allocations(),
            self.total_releases,
            self.requested_bytes,
            self.reserved_bytes,
            self.rounding_overhead(),
            self.shared_slices,
            self.copy_on_write_detaches,
        )
    }
}
