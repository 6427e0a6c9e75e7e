// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocator-backed fixed-width vector.

use crate::{Accessor, FixedWidth, MinorType, Mutator, VectorError};
use memory_manager::{Buffer, BufferAllocator};
use std::marker::PhantomData;

/// A sequence of fixed-width values stored in one allocator-issued [`Buffer`].
///
/// # States
/// ```text
///            allocate_new*          clear
///  Unbound ───────────────► Bound ───────► Unbound
///     │                      │
///     └──────── close ───────┴──────────► Closed (terminal)
/// ```
///
/// Capacity is the only bound on reads and writes: every index in
/// `0..value_capacity()` is readable and writable, and freshly allocated or
/// [`reset`](Self::reset) elements read as zero.
///
/// # Examples
/// ```
/// use memory_manager::{BufferAllocator, MemoryBudget};
/// use vector_core::IntVector;
///
/// let allocator = BufferAllocator::new(MemoryBudget::from_mb(1));
/// let mut v = IntVector::new("ints", &allocator);
/// v.allocate_new_with_capacity(10).unwrap();
/// assert_eq!(v.value_capacity(), 16); // 40 bytes rounded to 64
///
/// v.mutator().set(3, -7).unwrap();
/// assert_eq!(v.accessor().get(3).unwrap(), -7);
/// ```
pub struct FixedWidthVector<T: FixedWidth> {
    name: String,
    allocator: BufferAllocator,
    data: Option<Buffer>,
    value_capacity: usize,
    /// Byte size of the most recent allocation request, reused by `re_alloc`
    /// when the vector is unbound.
    allocation_size_bytes: usize,
    closed: bool,
    _element: PhantomData<T>,
}

impl<T: FixedWidth> FixedWidthVector<T> {
    /// Creates an unbound vector that will allocate from `allocator`.
    pub fn new(name: impl Into<String>, allocator: &BufferAllocator) -> Self {
        Self {
            name: name.into(),
            allocator: allocator.clone(),
            data: None,
            value_capacity: 0,
            allocation_size_bytes: T::INITIAL_VALUE_ALLOCATION * T::WIDTH,
            closed: false,
            _element: PhantomData,
        }
    }

    /// Returns the vector's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the logical element type.
    pub fn minor_type(&self) -> MinorType {
        T::MINOR_TYPE
    }

    /// Returns the allocator this vector draws from.
    pub fn allocator(&self) -> &BufferAllocator {
        &self.allocator
    }

    /// Number of elements the bound buffer can hold; `0` when unbound or closed.
    pub fn value_capacity(&self) -> usize {
        self.value_capacity
    }

    /// Capacity of the bound buffer in bytes; `0` when unbound.
    pub fn buffer_capacity_bytes(&self) -> usize {
        self.data.as_ref().map_or(0, Buffer::capacity)
    }

    /// Returns `true` if a buffer is bound.
    pub fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    /// Returns `true` after [`close`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read-only view.
    pub fn accessor(&self) -> Accessor<'_, T> {
        Accessor::new(self)
    }

    /// Write-only view.
    pub fn mutator(&mut self) -> Mutator<'_, T> {
        Mutator::new(self)
    }

    /// Allocates room for [`FixedWidth::INITIAL_VALUE_ALLOCATION`] elements.
    pub fn allocate_new(&mut self) -> Result<(), VectorError> {
        self.allocate_new_with_capacity(T::INITIAL_VALUE_ALLOCATION)
    }

    /// Allocates room for at least `value_count` elements, replacing any
    /// bound buffer.
    ///
    /// The allocator may round up, so `value_capacity()` can end up larger
    /// than requested. The old buffer is released before the new one is
    /// acquired, so a same-size replacement fits a budget sized for one
    /// buffer. A request that cannot fit even after that release is rejected
    /// up front and keeps the old buffer; if the acquire still fails once the
    /// old buffer is gone, the vector is left unbound.
    pub fn allocate_new_with_capacity(&mut self, value_count: usize) -> Result<(), VectorError> {
        self.ensure_open()?;
        if value_count == 0 {
            return Err(VectorError::ZeroSizedAllocation);
        }
        let bytes = Self::checked_byte_size(value_count)?;
        self.allocate_bytes(bytes)
    }

    /// Zero-fills the bound buffer. Capacity is unchanged; no-op when unbound.
    pub fn reset(&mut self) -> Result<(), VectorError> {
        self.ensure_open()?;
        if let Some(buffer) = self.data.as_mut() {
            buffer.fill(0)?;
        }
        Ok(())
    }

    /// Doubles the buffer, keeping every element at its index.
    ///
    /// An unbound vector allocates its last requested size instead. On
    /// failure the vector is left as it was.
    pub fn re_alloc(&mut self) -> Result<(), VectorError> {
        self.ensure_open()?;
        if !self.is_bound() {
            return self.allocate_bytes(self.allocation_size_bytes);
        }

        let old_bytes = self.buffer_capacity_bytes();
        let new_bytes = old_bytes
            .checked_mul(2)
            .filter(|&n| n <= T::MAX_ALLOCATION_SIZE)
            .ok_or(VectorError::CapacityExceeded {
                requested_elements: (old_bytes / T::WIDTH).saturating_mul(2),
                max_elements: T::max_value_count(),
            })?;
        self.grow_to(new_bytes)
    }

    /// Grows the buffer until `index` is addressable, in a single allocation.
    ///
    /// The new size is the smallest doubling of the current one (or of the
    /// last requested size, when unbound) that covers `index`. On failure
    /// capacity and values are unchanged.
    pub(crate) fn grow_to_fit(&mut self, index: usize) -> Result<(), VectorError> {
        self.ensure_open()?;
        if index < self.value_capacity {
            return Ok(());
        }
        let exceeded = || VectorError::CapacityExceeded {
            requested_elements: index.saturating_add(1),
            max_elements: T::max_value_count(),
        };

        let mut new_bytes = if self.is_bound() {
            self.buffer_capacity_bytes().saturating_mul(2)
        } else {
            self.allocation_size_bytes
        }
        .max(T::WIDTH);
        while new_bytes / T::WIDTH <= index {
            new_bytes = new_bytes.checked_mul(2).ok_or_else(exceeded)?;
        }
        if new_bytes > T::MAX_ALLOCATION_SIZE {
            return Err(exceeded());
        }

        if self.is_bound() {
            self.grow_to(new_bytes)
        } else {
            self.allocate_bytes(new_bytes)
        }
    }

    /// Releases the bound buffer. No-op when unbound.
    pub fn clear(&mut self) -> Result<(), VectorError> {
        self.ensure_open()?;
        self.release_data()
    }

    /// Clears the vector and makes it unusable. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), VectorError> {
        if self.closed {
            return Ok(());
        }
        self.release_data()?;
        self.closed = true;
        tracing::debug!(vector = %self.name, "vector closed");
        Ok(())
    }

    pub(crate) fn ensure_open(&self) -> Result<(), VectorError> {
        if self.closed {
            return Err(VectorError::Closed {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), VectorError> {
        self.ensure_open()?;
        if index >= self.value_capacity {
            return Err(VectorError::IndexOutOfBounds {
                index,
                capacity: self.value_capacity,
            });
        }
        Ok(())
    }

    /// The bound buffer, once `check_index` has passed.
    pub(crate) fn data(&self) -> Result<&Buffer, VectorError> {
        self.data.as_ref().ok_or(VectorError::IndexOutOfBounds {
            index: 0,
            capacity: 0,
        })
    }

    pub(crate) fn data_mut(&mut self) -> Result<&mut Buffer, VectorError> {
        self.data.as_mut().ok_or(VectorError::IndexOutOfBounds {
            index: 0,
            capacity: 0,
        })
    }

    pub(crate) fn get_value(&self, index: usize) -> Result<T, VectorError> {
        self.check_index(index)?;
        let offset = index * T::WIDTH;
        let bytes = self.data()?.as_slice()?;
        Ok(T::read_le(&bytes[offset..offset + T::WIDTH]))
    }

    pub(crate) fn set_value(&mut self, index: usize, value: T) -> Result<(), VectorError> {
        self.check_index(index)?;
        let mut raw = [0u8; 8];
        value.write_le(&mut raw[..T::WIDTH]);
        self.data_mut()?.set_bytes(index * T::WIDTH, &raw[..T::WIDTH])?;
        Ok(())
    }

    /// Binds `buffer`. Callers release the previous buffer first.
    pub(crate) fn bind(&mut self, buffer: Buffer) {
        self.value_capacity = buffer.capacity() / T::WIDTH;
        self.data = Some(buffer);
    }

    /// Removes the bound buffer without releasing it.
    pub(crate) fn unbind(&mut self) -> Option<Buffer> {
        self.value_capacity = 0;
        self.data.take()
    }

    pub(crate) fn allocation_size_bytes(&self) -> usize {
        self.allocation_size_bytes
    }

    pub(crate) fn set_allocation_size_bytes(&mut self, bytes: usize) {
        self.allocation_size_bytes = bytes;
    }

    fn checked_byte_size(value_count: usize) -> Result<usize, VectorError> {
        value_count
            .checked_mul(T::WIDTH)
            .filter(|&bytes| bytes <= T::MAX_ALLOCATION_SIZE)
            .ok_or(VectorError::CapacityExceeded {
                requested_elements: value_count,
                max_elements: T::max_value_count(),
            })
    }

    fn allocate_bytes(&mut self, bytes: usize) -> Result<(), VectorError> {
        let reclaimable = self.data.as_ref().map_or(0, Buffer::reclaimable_bytes);
        self.allocator.check_acquire(bytes, reclaimable)?;
        self.release_data()?;

        let buffer = self.allocator.acquire(bytes)?;
        tracing::debug!(
            vector = %self.name,
            minor_type = %T::MINOR_TYPE,
            requested_bytes = bytes,
            capacity_bytes = buffer.capacity(),
            "vector allocated"
        );
        self.allocation_size_bytes = bytes;
        self.bind(buffer);
        Ok(())
    }

    /// Moves the bound values into a new buffer of `new_bytes`. The old
    /// buffer is held until the copy is done.
    fn grow_to(&mut self, new_bytes: usize) -> Result<(), VectorError> {
        let old_bytes = self.buffer_capacity_bytes();
        let mut grown = self.allocator.acquire(new_bytes)?;
        grown.set_bytes(0, self.data()?.as_slice()?)?;
        tracing::debug!(
            vector = %self.name,
            old_bytes,
            new_bytes = grown.capacity(),
            "vector re-allocated"
        );
        self.allocation_size_bytes = new_bytes;
        self.release_data()?;
        self.bind(grown);
        Ok(())
    }

    fn release_data(&mut self) -> Result<(), VectorError> {
        if let Some(mut buffer) = self.unbind() {
            self.allocator.release(&mut buffer)?;
        }
        Ok(())
    }
}

impl<T: FixedWidth> std::fmt::Debug for FixedWidthVector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedWidthVector")
            .field("name", &self.name)
            .field("minor_type", &T::MINOR_TYPE)
            .field("value_capacity", &self.value_capacity)
            .field("allocator", &self.allocator.name())
            .field("closed", &self.closed)
            .finish()
    }
}
