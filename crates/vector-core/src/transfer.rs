// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Moving values between vectors of the same element type.
//!
//! - [`copy_from`](FixedWidthVector::copy_from) copies one element, growing
//!   the destination if needed.
//! - [`split_and_transfer_to`](FixedWidthVector::split_and_transfer_to)
//!   hands a range of the source's storage to a target without copying. Both
//!   vectors stay independently usable: the first write to either side moves
//!   that side onto a private copy, so neither sees the other's later writes.
//! - [`transfer_to`](FixedWidthVector::transfer_to) moves the whole buffer and
//!   leaves the source unbound.
//!
//! In every case the target's allocator takes over the handle it receives
//! (release checks and copy-on-write charges). Bytes stay charged to the
//! allocator that issued the storage until the last handle onto it is gone.

use crate::{FixedWidth, FixedWidthVector, VectorError};

impl<T: FixedWidth> FixedWidthVector<T> {
    /// Copies `from[from_index]` into `self[this_index]`.
    ///
    /// If `this_index` is beyond the current capacity, the buffer first grows
    /// by the smallest doubling that fits it; existing values keep their
    /// indices. If that growth fails the destination is unchanged.
    pub fn copy_from(
        &mut self,
        from_index: usize,
        this_index: usize,
        from: &FixedWidthVector<T>,
    ) -> Result<(), VectorError> {
        self.ensure_open()?;
        from.check_index(from_index)?;

        let mut raw = [0u8; 8];
        let offset = from_index * T::WIDTH;
        from.data()?.get_bytes(offset, &mut raw[..T::WIDTH])?;

        self.grow_to_fit(this_index)?;
        self.data_mut()?
            .set_bytes(this_index * T::WIDTH, &raw[..T::WIDTH])?;
        Ok(())
    }

    /// Gives `target` the elements `start..start + length` of this vector
    /// without copying bytes.
    ///
    /// `target` releases its own buffer first and ends up with a value
    /// capacity of exactly `length` (unbound when `length == 0`). This vector
    /// keeps its buffer, capacity, and values.
    pub fn split_and_transfer_to(
        &self,
        start: usize,
        length: usize,
        target: &mut FixedWidthVector<T>,
    ) -> Result<(), VectorError> {
        self.ensure_open()?;
        target.ensure_open()?;
        let capacity = self.value_capacity();
        match start.checked_add(length) {
            Some(end) if end <= capacity => {}
            _ => {
                return Err(VectorError::RangeOutOfBounds {
                    start,
                    length,
                    capacity,
                })
            }
        }

        target.clear()?;
        if length == 0 {
            return Ok(());
        }

        let mut slice = self.data()?.slice(start * T::WIDTH, length * T::WIDTH)?;
        slice.transfer_ownership(target.allocator());
        tracing::debug!(
            from = %self.name(),
            to = %target.name(),
            start,
            length,
            "split and transferred"
        );
        target.set_allocation_size_bytes(length * T::WIDTH);
        target.bind(slice);
        Ok(())
    }

    /// Moves this vector's whole buffer into `target`, leaving this vector
    /// unbound. `target` releases its own buffer first.
    pub fn transfer_to(&mut self, target: &mut FixedWidthVector<T>) -> Result<(), VectorError> {
        self.ensure_open()?;
        target.ensure_open()?;
        target.clear()?;

        let allocation_size_bytes = self.allocation_size_bytes();
        if let Some(mut buffer) = self.unbind() {
            buffer.transfer_ownership(target.allocator());
            tracing::debug!(
                from = %self.name(),
                to = %target.name(),
                bytes = buffer.capacity(),
                "transferred"
            );
            target.set_allocation_size_bytes(allocation_size_bytes);
            target.bind(buffer);
        }
        Ok(())
    }

    /// Pairs this vector with `target` for repeated transfers.
    pub fn make_transfer_pair<'a>(
        &'a mut self,
        target: &'a mut FixedWidthVector<T>,
    ) -> TransferPair<'a, T> {
        TransferPair { from: self, to: target }
    }
}

/// A source and target vector bound together for transfers and copies.
pub struct TransferPair<'a, T: FixedWidth> {
    from: &'a mut FixedWidthVector<T>,
    to: &'a mut FixedWidthVector<T>,
}

impl<'a, T: FixedWidth> TransferPair<'a, T> {
    /// Moves the source's whole buffer to the target.
    pub fn transfer(&mut self) -> Result<(), VectorError> {
        self.from.transfer_to(self.to)
    }

    /// Shares `start..start + length` of the source with the target.
    pub fn split_and_transfer(&mut self, start: usize, length: usize) -> Result<(), VectorError> {
        self.from.split_and_transfer_to(start, length, self.to)
    }

    /// Copies `from[from_index]` into `to[to_index]`, growing the target.
    pub fn copy_value_safe(&mut self, from_index: usize, to_index: usize) -> Result<(), VectorError> {
        self.to.copy_from(from_index, to_index, self.from)
    }

    /// The source vector.
    pub fn source(&self) -> &FixedWidthVector<T> {
        self.from
    }

    /// The target vector.
    pub fn target(&self) -> &FixedWidthVector<T> {
        self.to
    }
}
