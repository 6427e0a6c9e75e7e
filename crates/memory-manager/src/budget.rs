// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte budget values and parsing.
//!
//! A [`MemoryBudget`] is the ceiling an allocator enforces. It supports
//! human-readable string parsing so limits can be written in configuration
//! files as `"512M"` or `"unbounded"`.

use crate::MemoryError;
use std::fmt;

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

/// A byte ceiling for an allocator scope.
///
/// # Parsing
/// Supports human-readable strings with binary suffixes:
/// - `"512M"` or `"512MB"` → 512 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"2048K"` or `"2048KB"` → 2048 × 1024 bytes
/// - `"5000"` → raw byte count (zero is a valid, fully closed budget)
/// - `"unbounded"` / `"unlimited"` → no ceiling
///
/// # Examples
/// ```
/// use memory_manager::MemoryBudget;
///
/// let b = MemoryBudget::parse("1G").unwrap();
/// assert_eq!(b.as_mb(), 1024);
///
/// assert!(MemoryBudget::parse("unbounded").unwrap().is_unbounded());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct MemoryBudget {
    /// Budget in bytes. `usize::MAX` means unbounded.
    bytes: usize,
}

impl MemoryBudget {
    /// Creates a budget from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a budget from kilobytes.
    pub fn from_kb(kb: usize) -> Self {
        Self::from_bytes(kb.saturating_mul(KB))
    }

    /// Creates a budget from megabytes.
    pub fn from_mb(mb: usize) -> Self {
        Self::from_bytes(mb.saturating_mul(MB))
    }

    /// Creates a budget from gigabytes.
    pub fn from_gb(gb: usize) -> Self {
        Self::from_bytes(gb.saturating_mul(GB))
    }

    /// A budget with no ceiling.
    pub fn unbounded() -> Self {
        Self { bytes: usize::MAX }
    }

    /// Returns `true` for the unbounded sentinel.
    pub fn is_unbounded(&self) -> bool {
        self.bytes == usize::MAX
    }

    /// Returns the budget in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the budget in megabytes (truncated).
    pub fn as_mb(&self) -> usize {
        self.bytes / MB
    }

    /// Parses a human-readable budget string.
    ///
    /// Accepted formats: `"512M"`, `"512MB"`, `"1G"`, `"1GB"`, `"2048K"`,
    /// `"2048KB"`, `"64B"`, a plain byte count, or `"unbounded"`.
    /// Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MemoryError::InvalidBudget("empty budget string".into()));
        }

        let s_upper = s.to_uppercase();
        if matches!(s_upper.as_str(), "UNBOUNDED" | "UNLIMITED" | "MAX") {
            return Ok(Self::unbounded());
        }

        let (num_str, multiplier) = if s_upper.ends_with("GB") {
            (&s[..s.len() - 2], GB)
        } else if s_upper.ends_with('G') {
            (&s[..s.len() - 1], GB)
        } else if s_upper.ends_with("MB") {
            (&s[..s.len() - 2], MB)
        } else if s_upper.ends_with('M') {
            (&s[..s.len() - 1], MB)
        } else if s_upper.ends_with("KB") {
            (&s[..s.len() - 2], KB)
        } else if s_upper.ends_with('K') {
            (&s[..s.len() - 1], KB)
        } else if s_upper.ends_with('B') {
            (&s[..s.len() - 1], 1)
        } else {
            (s, 1)
        };

        let value: usize = num_str.trim().parse().map_err(|_| {
            MemoryError::InvalidBudget(format!(
                "'{s}': expected a number followed by an optional suffix (K, M, G) or 'unbounded'"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| MemoryError::InvalidBudget(format!("budget overflow: '{s}'")))?;

        Ok(Self { bytes })
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::str::FromStr for MemoryBudget {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "unbounded")
        } else if self.bytes >= GB && self.bytes % GB == 0 {
            write!(f, "{} GB", self.bytes / GB)
        } else if self.bytes >= MB && self.bytes % MB == 0 {
            write!(f, "{} MB", self.bytes / MB)
        } else if self.bytes >= KB && self.bytes % KB == 0 {
            write!(f, "{} KB", self.bytes / KB)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mb() {
        let b = MemoryBudget::from_mb(512);
        assert_eq!(b.as_bytes(), 512 * 1024 * 1024);
        assert_eq!(b.as_mb(), 512);
    }

    #[test]
    fn test_unbounded() {
        let b = MemoryBudget::unbounded();
        assert!(b.is_unbounded());
        assert_eq!(b, MemoryBudget::default());
        assert!(!MemoryBudget::from_gb(4).is_unbounded());
    }

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(MemoryBudget::parse("512M").unwrap().as_mb(), 512);
        assert_eq!(MemoryBudget::parse("512mb").unwrap().as_mb(), 512);
        assert_eq!(MemoryBudget::parse("1G").unwrap().as_mb(), 1024);
        assert_eq!(MemoryBudget::parse("2g").unwrap().as_mb(), 2048);
        assert_eq!(MemoryBudget::parse("1024K").unwrap().as_bytes(), 1024 * 1024);
        assert_eq!(MemoryBudget::parse("64B").unwrap().as_bytes(), 64);
    }

    #[test]
    fn test_parse_raw_and_zero() {
        assert_eq!(MemoryBudget::parse("5000").unwrap().as_bytes(), 5000);
        assert_eq!(MemoryBudget::parse("0").unwrap().as_bytes(), 0);
        assert_eq!(MemoryBudget::parse("  256K  ").unwrap().as_bytes(), 256 * 1024);
    }

    #[test]
    fn test_parse_unbounded() {
        assert!(MemoryBudget::parse("unbounded").unwrap().is_unbounded());
        assert!(MemoryBudget::parse("Unlimited").unwrap().is_unbounded());
        assert!("max".parse::<MemoryBudget>().unwrap().is_unbounded());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(MemoryBudget::parse("").is_err());
        assert!(MemoryBudget::parse("abc").is_err());
        assert!(MemoryBudget::parse("-4K").is_err());
        assert!(matches!(
            MemoryBudget::parse("99999999999999999999G"),
            Err(MemoryError::InvalidBudget(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", MemoryBudget::from_gb(1)), "1 GB");
        assert_eq!(format!("{}", MemoryBudget::from_mb(512)), "512 MB");
        assert_eq!(format!("{}", MemoryBudget::from_bytes(2048)), "2 KB");
        assert_eq!(format!("{}", MemoryBudget::from_bytes(5000)), "5000 B");
        assert_eq!(format!("{}", MemoryBudget::unbounded()), "unbounded");
    }

    #[test]
    fn test_serde_roundtrip() {
        let b = MemoryBudget::from_kb(5);
        let json = serde_json::to_string(&b).unwrap();
        let back: MemoryBudget = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
