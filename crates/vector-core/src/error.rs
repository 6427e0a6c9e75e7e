// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for vector operations.

use memory_manager::{ErrorKind, MemoryError};

/// Errors that can occur during vector operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VectorError {
    /// The allocator rejected a request, or a buffer operation failed.
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    /// The request exceeds the type's fixed allocation ceiling.
    #[error("requested {requested_elements} elements, but at most {max_elements} fit in one allocation")]
    CapacityExceeded {
        requested_elements: usize,
        max_elements: usize,
    },

    /// An element index lies outside the value capacity.
    #[error("index {index} out of bounds for value capacity {capacity}")]
    IndexOutOfBounds { index: usize, capacity: usize },

    /// An element range lies outside the value capacity.
    #[error("range {start}..{start}+{length} out of bounds for value capacity {capacity}")]
    RangeOutOfBounds {
        start: usize,
        length: usize,
        capacity: usize,
    },

    /// The vector has been closed.
    #[error("vector '{name}' is closed")]
    Closed { name: String },

    /// `allocate_new_with_capacity(0)` was requested.
    #[error("cannot allocate a vector with zero capacity")]
    ZeroSizedAllocation,
}

impl VectorError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VectorError::Memory(e) => e.kind(),
            VectorError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            VectorError::IndexOutOfBounds { .. } | VectorError::RangeOutOfBounds { .. } => {
                ErrorKind::IndexOutOfBounds
            }
            VectorError::Closed { .. } => ErrorKind::InvalidState,
            VectorError::ZeroSizedAllocation => ErrorKind::InvalidArgument,
        }
    }
}
