// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `colvec run` command: execute a scripted vector workload.
//!
//! The workload walks one vector through its whole lifecycle:
//! ```text
//! allocate → fill → re_alloc × N → split_and_transfer_to → copy_from → close
//! ```
//! and reports what the allocator saw along the way.
//!
//! # TOML Format
//! ```toml
//! minor_type = "float8"
//! elements = 1000
//! realloc_rounds = 2
//! split_start = 0
//! split_length = 500
//!
//! [allocator]
//! name = "workload"
//! limit = "64M"
//! rounding = "power-of-two"
//! ```

use anyhow::Context;
use memory_manager::{AllocationStats, AllocatorConfig, BufferAllocator};
use std::path::Path;
use vector_core::{FixedWidth, FixedWidthVector, MinorType};

/// A workload loaded from TOML.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WorkloadConfig {
    /// Root allocator settings.
    #[serde(default)]
    pub allocator: AllocatorConfig,
    /// Element type of the vectors.
    #[serde(default = "default_minor_type")]
    pub minor_type: MinorType,
    /// Elements requested by the first allocation.
    #[serde(default = "default_elements")]
    pub elements: usize,
    /// How many times the source doubles after being filled.
    #[serde(default)]
    pub realloc_rounds: u32,
    /// First source element handed to the split target.
    #[serde(default)]
    pub split_start: usize,
    /// Number of elements handed to the split target.
    #[serde(default)]
    pub split_length: usize,
}

fn default_minor_type() -> MinorType {
    MinorType::Int
}

fn default_elements() -> usize {
    vector_core::INITIAL_VALUE_ALLOCATION
}

impl WorkloadConfig {
    /// Loads a workload from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read workload '{}'", path.display()))?;
        Self::from_toml(&content)
    }

    /// Parses a workload from a TOML string.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("invalid workload TOML")
    }
}

/// What a finished workload observed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WorkloadReport {
    pub minor_type: MinorType,
    pub allocator: String,
    pub limit: String,
    pub initial_capacity: usize,
    pub final_capacity: usize,
    pub split_capacity: usize,
    pub split_verified: bool,
    pub copy_target_capacity: usize,
    pub peak_reserved_bytes: usize,
    pub stats: AllocationStats,
}

/// Element types the workload can generate values for.
trait WorkloadValue: FixedWidth {
    fn from_index(index: usize) -> Self;
}

macro_rules! impl_workload_value {
    ($($ty:ty),*) => {
        $(impl WorkloadValue for $ty {
            fn from_index(index: usize) -> Self {
                // Wraps for the narrow integer types.
                index as $ty
            }
        })*
    };
}

impl_workload_value!(i16, i32, i64, f32, f64);

pub fn execute(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = WorkloadConfig::from_file(config_path)?;
    tracing::info!(
        path = %config_path.display(),
        minor_type = %config.minor_type,
        elements = config.elements,
        "workload loaded"
    );

    let report = run_workload(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Runs `config` against a fresh root allocator.
pub fn run_workload(config: &WorkloadConfig) -> anyhow::Result<WorkloadReport> {
    let allocator = BufferAllocator::from_config(&config.allocator)
        .context("invalid allocator configuration")?;

    let report = match config.minor_type {
        MinorType::SmallInt => drive::<i16>(config, &allocator),
        MinorType::Int => drive::<i32>(config, &allocator),
        MinorType::BigInt => drive::<i64>(config, &allocator),
        MinorType::Float4 => drive::<f32>(config, &allocator),
        MinorType::Float8 => drive::<f64>(config, &allocator),
    }?;

    allocator
        .close()
        .context("allocator still held memory after the workload")?;
    Ok(report)
}

fn drive<T: WorkloadValue>(
    config: &WorkloadConfig,
    allocator: &BufferAllocator,
) -> anyhow::Result<WorkloadReport> {
    let mut source = FixedWidthVector::<T>::new("workload.source", allocator);
    source
        .allocate_new_with_capacity(config.elements)
        .with_context(|| format!("allocating {} {} elements", config.elements, T::MINOR_TYPE))?;
    let initial_capacity = source.value_capacity();

    let mut m = source.mutator();
    for i in 0..initial_capacity {
        m.set(i, T::from_index(i))?;
    }

    for round in 1..=config.realloc_rounds {
        source
            .re_alloc()
            .with_context(|| format!("re-allocation round {round}"))?;
    }
    let final_capacity = source.value_capacity();

    let mut split = FixedWidthVector::<T>::new("workload.split", allocator);
    source
        .split_and_transfer_to(config.split_start, config.split_length, &mut split)
        .context("split transfer")?;
    let mut split_verified = true;
    for i in 0..split.value_capacity() {
        if split.accessor().get(i)? != source.accessor().get(config.split_start + i)? {
            split_verified = false;
            break;
        }
    }

    // Move the split into a third vector, then copy the last filled source
    // value one past its end, forcing growth.
    let mut copy_target = FixedWidthVector::<T>::new("workload.copy", allocator);
    split
        .transfer_to(&mut copy_target)
        .context("whole-buffer transfer")?;
    copy_target
        .copy_from(initial_capacity - 1, config.split_length, &source)
        .context("copy past capacity")?;
    let copy_target_capacity = copy_target.value_capacity();

    source.close()?;
    split.close()?;
    copy_target.close()?;

    Ok(WorkloadReport {
        minor_type: T::MINOR_TYPE,
        allocator: allocator.name().to_string(),
        limit: allocator.limit().to_string(),
        initial_capacity,
        final_capacity,
        split_capacity: config.split_length,
        split_verified,
        copy_target_capacity,
        peak_reserved_bytes: allocator.peak_reserved_bytes(),
        stats: allocator.stats(),
    })
}

fn print_report(report: &WorkloadReport) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            colvec · Workload Report                 ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Vectors ────────────────────────────────────────────────
    println!("  Vectors ({})", report.minor_type);
    println!("   Initial capacity:  {}", report.initial_capacity);
    println!("   After re_alloc:    {}", report.final_capacity);
    println!(
        "   Split:             {} elements ({})",
        report.split_capacity,
        if report.split_verified { "verified" } else { "MISMATCH" }
    );
    println!("   Copy target:       {}", report.copy_target_capacity);
    println!();

    // ── Allocator ──────────────────────────────────────────────
    println!("  Allocator '{}'", report.allocator);
    println!("   Limit:             {}", report.limit);
    println!("   Peak reserved:     {} bytes", report.peak_reserved_bytes);
    println!("   {}", report.stats.summary());
}
