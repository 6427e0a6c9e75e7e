// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Read and write capability views over a [`FixedWidthVector`].
//!
//! Views are zero-cost borrows. An [`Accessor`] holds `&FixedWidthVector`
//! and can only read; a [`Mutator`] holds `&mut FixedWidthVector` and can
//! only write. The borrow checker keeps a mutator from coexisting with any
//! other view of the same vector.

use crate::{FixedWidth, FixedWidthVector, VectorError};

/// Read-only view of a vector.
pub struct Accessor<'a, T: FixedWidth> {
    vector: &'a FixedWidthVector<T>,
}

impl<'a, T: FixedWidth> Accessor<'a, T> {
    pub(crate) fn new(vector: &'a FixedWidthVector<T>) -> Self {
        Self { vector }
    }

    /// Reads the element at `index`.
    ///
    /// Fails with `IndexOutOfBounds` unless `index < value_capacity()`, and
    /// with `Closed` on a closed vector.
    pub fn get(&self, index: usize) -> Result<T, VectorError> {
        self.vector.get_value(index)
    }

    /// Number of readable elements.
    pub fn value_capacity(&self) -> usize {
        self.vector.value_capacity()
    }

    /// Iterates over every element in `0..value_capacity()`.
    pub fn iter(&self) -> Result<impl Iterator<Item = T> + 'a, VectorError> {
        let vector = self.vector;
        vector.ensure_open()?;
        let capacity = vector.value_capacity();
        let bytes: &'a [u8] = if capacity == 0 {
            &[]
        } else {
            &vector.data()?.as_slice()?[..capacity * T::WIDTH]
        };
        Ok(bytes.chunks_exact(T::WIDTH).map(T::read_le))
    }

    /// Copies every element in `0..value_capacity()` into a `Vec`.
    pub fn to_vec(&self) -> Result<Vec<T>, VectorError> {
        Ok(self.iter()?.collect())
    }
}

/// Write-only view of a vector.
pub struct Mutator<'a, T: FixedWidth> {
    vector: &'a mut FixedWidthVector<T>,
}

impl<'a, T: FixedWidth> Mutator<'a, T> {
    pub(crate) fn new(vector: &'a mut FixedWidthVector<T>) -> Self {
        Self { vector }
    }

    /// Writes `value` at `index`.
    ///
    /// Any index below `value_capacity()` is writable; there is no separate
    /// logical length.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), VectorError> {
        self.vector.set_value(index, value)
    }

    /// Writes `value` at `index`, first growing the buffer by the smallest
    /// doubling that fits `index`. A failed growth changes nothing.
    pub fn set_safe(&mut self, index: usize, value: T) -> Result<(), VectorError> {
        self.vector.grow_to_fit(index)?;
        self.vector.set_value(index, value)
    }

    /// Number of writable elements.
    pub fn value_capacity(&self) -> usize {
        self.vector.value_capacity()
    }
}
