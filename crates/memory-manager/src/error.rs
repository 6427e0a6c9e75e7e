// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for memory management.

use std::fmt;

/// Coarse classification shared by every error in the workspace.
///
/// Callers that only care about *what kind* of failure happened (rather than
/// the allocator name or byte counts) match on this instead of the concrete
/// error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A reservation would exceed an allocator's (or an ancestor's) budget.
    AllocationExceeded,
    /// A vector request exceeds the type's fixed allocation ceiling.
    CapacityExceeded,
    /// An index or range lies outside the current capacity.
    IndexOutOfBounds,
    /// The object is closed, released, or otherwise unusable.
    InvalidState,
    /// The caller passed a malformed argument or configuration value.
    InvalidArgument,
}

impl ErrorKind {
    /// Returns a stable label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AllocationExceeded => "allocation-exceeded",
            ErrorKind::CapacityExceeded => "capacity-exceeded",
            ErrorKind::IndexOutOfBounds => "index-out-of-bounds",
            ErrorKind::InvalidState => "invalid-state",
            ErrorKind::InvalidArgument => "invalid-argument",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during buffer allocation and management.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// The requested allocation would exceed the budget of `allocator`.
    #[error("allocator '{allocator}': requested {requested_bytes} bytes, but only {available_bytes} available (limit: {limit_bytes})")]
    AllocationExceeded {
        allocator: String,
        requested_bytes: usize,
        available_bytes: usize,
        limit_bytes: usize,
    },

    /// A byte-level read or write fell outside the buffer.
    #[error("byte range {offset}..{offset}+{len} is outside buffer of {capacity} bytes")]
    OutOfRange {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    /// The buffer was already released back to its allocator.
    #[error("buffer already released")]
    AlreadyReleased,

    /// A buffer was handed to an allocator that did not issue it.
    #[error("buffer owned by allocator '{owner}' cannot be released through '{allocator}'")]
    ForeignBuffer { owner: String, allocator: String },

    /// The allocator has been closed.
    #[error("allocator '{allocator}' is closed")]
    AllocatorClosed { allocator: String },

    /// Buffers or child allocators were still outstanding at close.
    #[error("allocator '{allocator}' closed with {outstanding_bytes} bytes still reserved and {open_children} open child allocator(s)")]
    Leak {
        allocator: String,
        outstanding_bytes: usize,
        open_children: usize,
    },

    /// A budget string could not be parsed.
    #[error("invalid budget: {0}")]
    InvalidBudget(String),

    /// Allocator configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MemoryError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MemoryError::AllocationExceeded { .. } => ErrorKind::AllocationExceeded,
            MemoryError::OutOfRange { .. } => ErrorKind::IndexOutOfBounds,
            MemoryError::AlreadyReleased
            | MemoryError::ForeignBuffer { .. }
            | MemoryError::AllocatorClosed { .. }
            | MemoryError::Leak { .. } => ErrorKind::InvalidState,
            MemoryError::InvalidBudget(_) | MemoryError::Config(_) => ErrorKind::InvalidArgument,
        }
    }
}
