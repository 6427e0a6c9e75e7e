// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! A hierarchical, budget-enforcing buffer allocator for columnar vectors.
//!
//! # Key Components
//!
//! - [`MemoryBudget`]: a byte ceiling with human-readable parsing
//!   (`"512M"`, `"1G"`, `"unbounded"`).
//! - [`AllocationLimit`]: the ceiling plus currently reserved bytes for one
//!   allocator scope.
//! - [`BufferAllocator`]: issues buffers against its limit and, transitively,
//!   every ancestor's limit. Limits can be changed at runtime.
//! - [`Buffer`]: a fixed-capacity byte span. Buffers return their bytes when
//!   released or dropped, and can be sliced without copying.
//! - [`AllocationStats`]: cumulative allocator metrics.
//! - [`AllocatorConfig`]: TOML-loadable allocator settings.
//!
//! # Ownership Model
//!
//! ```text
//! BufferAllocator::acquire(size)
//!       │
//!       ▼
//!   Buffer ──► Arc<Storage> ──► Lease (holds Arc<AllocatorInner>)
//!       │            ▲
//!       │ slice()    │ shared, zero-copy
//!       ▼            │
//!   Buffer ──────────┘
//!
//!   last handle dropped ──► Lease::drop ──► limit released up the chain
//! ```
//!
//! # Example
//! ```
//! use memory_manager::{BufferAllocator, MemoryBudget};
//!
//! let root = BufferAllocator::new(MemoryBudget::from_kb(64));
//! let child = root.new_child("scan", MemoryBudget::from_kb(16)).unwrap();
//!
//! let a = child.acquire(4096).unwrap();
//! assert_eq!(root.reserved_bytes(), 4096);
//!
//! drop(a);
//! assert_eq!(root.reserved_bytes(), 0);
//! child.close().unwrap();
//! root.close().unwrap();
//! ```

mod allocator;
mod budget;
mod buffer;
mod config;
mod error;
mod limit;
mod stats;

pub use allocator::{BufferAllocator, RoundingPolicy};
pub use budget::MemoryBudget;
pub use buffer::Buffer;
pub use config::AllocatorConfig;
pub use error::{ErrorKind, MemoryError};
pub use limit::AllocationLimit;
pub use stats::AllocationStats;
