// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # vector-core
//!
//! Fixed-width columnar vectors for numeric data.
//!
//! This crate provides:
//! - [`FixedWidthVector`], a sequence of fixed-width values living in one
//!   buffer drawn from a [`memory_manager::BufferAllocator`].
//! - [`FixedWidth`], implemented for `i16`, `i32`, `i64`, `f32`, and `f64`,
//!   with the aliases [`SmallIntVector`], [`IntVector`], [`BigIntVector`],
//!   [`Float4Vector`], and [`Float8Vector`].
//! - [`Accessor`] and [`Mutator`] capability views for reading and writing.
//! - Transfer between vectors: single-value copies, zero-copy range splits,
//!   and whole-buffer moves via [`TransferPair`].
//!
//! # Design Goals
//! - Every byte a vector holds is charged to its allocator's budget.
//! - Splits share storage; writes after a split copy on demand.
//! - Failed allocations leave the vector exactly as it was.

mod element;
mod error;
mod transfer;
mod vector;
mod view;

pub use element::{FixedWidth, MinorType, INITIAL_VALUE_ALLOCATION, MAX_ALLOCATION_SIZE};
pub use error::VectorError;
pub use memory_manager::ErrorKind;
pub use transfer::TransferPair;
pub use vector::FixedWidthVector;
pub use view::{Accessor, Mutator};

/// Vector of 16-bit signed integers.
pub type SmallIntVector = FixedWidthVector<i16>;
/// Vector of 32-bit signed integers.
pub type IntVector = FixedWidthVector<i32>;
/// Vector of 64-bit signed integers.
pub type BigIntVector = FixedWidthVector<i64>;
/// Vector of 32-bit floats.
pub type Float4Vector = FixedWidthVector<f32>;
/// Vector of 64-bit floats.
pub type Float8Vector = FixedWidthVector<f64>;
