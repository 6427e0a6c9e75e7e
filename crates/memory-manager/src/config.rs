// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocator configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! name = "root"
//! limit = "512M"
//! rounding = "power-of-two"
//! ```

use crate::{MemoryBudget, MemoryError, RoundingPolicy};
use std::path::Path;

/// Configuration for a root [`BufferAllocator`](crate::BufferAllocator).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AllocatorConfig {
    /// Diagnostic name of the allocator.
    #[serde(default = "default_name")]
    pub name: String,
    /// Byte ceiling (human-readable, e.g. `"512M"` or `"unbounded"`).
    #[serde(default = "default_limit")]
    pub limit: String,
    /// Rounding policy: `"power-of-two"` or `"exact"`.
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

fn default_name() -> String {
    "root".to_string()
}

fn default_limit() -> String {
    "unbounded".to_string()
}

impl AllocatorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MemoryError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MemoryError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, MemoryError> {
        toml::from_str(toml_str).map_err(|e| MemoryError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, MemoryError> {
        toml::to_string_pretty(self)
            .map_err(|e| MemoryError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the limit string into a [`MemoryBudget`].
    pub fn parse_limit(&self) -> Result<MemoryBudget, MemoryError> {
        MemoryBudget::parse(&self.limit)
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            limit: default_limit(),
            rounding: RoundingPolicy::default(),
        }
    }
}
