// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `colvec limits` command: print per-type allocation limits.

use vector_core::{MinorType, INITIAL_VALUE_ALLOCATION, MAX_ALLOCATION_SIZE};

#[derive(Debug, serde::Serialize)]
struct TypeLimits {
    minor_type: MinorType,
    width_bytes: usize,
    initial_value_allocation: usize,
    max_value_count: usize,
    max_allocation_bytes: usize,
}

fn table() -> Vec<TypeLimits> {
    MinorType::ALL
        .iter()
        .map(|&minor_type| TypeLimits {
            minor_type,
            width_bytes: minor_type.width(),
            initial_value_allocation: INITIAL_VALUE_ALLOCATION,
            max_value_count: MAX_ALLOCATION_SIZE / minor_type.width(),
            max_allocation_bytes: MAX_ALLOCATION_SIZE,
        })
        .collect()
}

pub fn execute(json: bool) -> anyhow::Result<()> {
    let rows = table();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("  {:<10} {:>6} {:>10} {:>14}", "Type", "Width", "Initial", "Max elements");
    println!("  {:-<10} {:->6} {:->10} {:->14}", "", "", "", "");
    for row in &rows {
        println!(
            "  {:<10} {:>6} {:>10} {:>14}",
            row.minor_type.as_str(),
            row.width_bytes,
            row.initial_value_allocation,
            row.max_value_count,
        );
    }
    println!();
    println!("  Ceiling per buffer: {MAX_ALLOCATION_SIZE} bytes");
    Ok(())
}
