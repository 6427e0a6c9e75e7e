// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported fixed-width element types.

use std::fmt;

/// Default number of elements reserved by
/// [`allocate_new`](crate::FixedWidthVector::allocate_new).
pub const INITIAL_VALUE_ALLOCATION: usize = 4096;

/// Default ceiling, in bytes, on a single vector buffer.
pub const MAX_ALLOCATION_SIZE: usize = 1 << 31;

/// Enumerates the logical types a [`crate::FixedWidthVector`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinorType {
    /// 16-bit signed integer.
    SmallInt,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit IEEE 754 floating point.
    Float4,
    /// 64-bit IEEE 754 floating point.
    Float8,
}

impl MinorType {
    /// Every supported type, narrowest first.
    pub const ALL: [MinorType; 5] = [
        MinorType::SmallInt,
        MinorType::Int,
        MinorType::Float4,
        MinorType::BigInt,
        MinorType::Float8,
    ];

    /// Returns the size of a single element in bytes.
    pub fn width(self) -> usize {
        match self {
            MinorType::SmallInt => 2,
            MinorType::Int | MinorType::Float4 => 4,
            MinorType::BigInt | MinorType::Float8 => 8,
        }
    }

    /// Returns `true` for the IEEE 754 types.
    pub fn is_floating_point(self) -> bool {
        matches!(self, MinorType::Float4 | MinorType::Float8)
    }

    /// Returns a human-readable label for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            MinorType::SmallInt => "smallint",
            MinorType::Int => "int",
            MinorType::BigInt => "bigint",
            MinorType::Float4 => "float4",
            MinorType::Float8 => "float8",
        }
    }
}

impl fmt::Display for MinorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MinorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smallint" | "i16" => Ok(MinorType::SmallInt),
            "int" | "i32" => Ok(MinorType::Int),
            "bigint" | "i64" => Ok(MinorType::BigInt),
            "float4" | "f32" => Ok(MinorType::Float4),
            "float8" | "f64" => Ok(MinorType::Float8),
            other => Err(format!(
                "unknown type '{other}'; expected smallint, int, bigint, float4, or float8"
            )),
        }
    }
}

/// A primitive that can be stored in a [`crate::FixedWidthVector`].
///
/// Values are stored little-endian, `WIDTH` bytes each. Integers are signed;
/// floats keep their exact IEEE 754 bit pattern.
pub trait FixedWidth: Copy + PartialEq + Default + fmt::Debug + Send + Sync + 'static {
    /// Size of one element in bytes.
    const WIDTH: usize;
    /// Logical type tag.
    const MINOR_TYPE: MinorType;
    /// Element count used by `allocate_new()`.
    const INITIAL_VALUE_ALLOCATION: usize = INITIAL_VALUE_ALLOCATION;
    /// Largest buffer, in bytes, a vector of this type may request.
    const MAX_ALLOCATION_SIZE: usize = MAX_ALLOCATION_SIZE;

    /// Decodes a value from exactly `WIDTH` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encodes the value into exactly `WIDTH` bytes.
    fn write_le(self, out: &mut [u8]);

    /// Largest element count a single allocation may request.
    fn max_value_count() -> usize {
        Self::MAX_ALLOCATION_SIZE / Self::WIDTH
    }
}

macro_rules! impl_fixed_width {
    ($ty:ty, $minor:ident) => {
        impl FixedWidth for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const MINOR_TYPE: MinorType = MinorType::$minor;

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }

            fn write_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_fixed_width!(i16, SmallInt);
impl_fixed_width!(i32, Int);
impl_fixed_width!(i64, BigInt);
impl_fixed_width!(f32, Float4);
impl_fixed_width!(f64, Float8);
