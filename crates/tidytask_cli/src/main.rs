//! CLI probe for ordering key allocation.
//!
//! # Responsibility
//! - Verify `tidytask_core` linkage without the UI shell.
//! - Compute one key from neighbor keys given on the command line.
//!
//! Usage: `tidytask_cli [top|-] [next|-]` where `-` means no neighbor.

use std::process::ExitCode;
use tidytask_core::{allocate_key_with_thread_rng, OrderKey, SortKeyConfig};

fn main() -> ExitCode {
    println!("tidytask_core ping={}", tidytask_core::ping());
    println!("tidytask_core version={}", tidytask_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() > 2 {
        eprintln!("usage: tidytask_cli [top|-] [next|-]");
        return ExitCode::FAILURE;
    }

    let neighbors = args
        .iter()
        .map(|raw| parse_neighbor(raw))
        .collect::<Result<Vec<_>, _>>();
    let neighbors = match neighbors {
        Ok(value) => value,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let top = neighbors.first().copied().flatten();
    let next = neighbors.get(1).copied().flatten();

    match allocate_key_with_thread_rng(top, next, &SortKeyConfig::default()) {
        Ok(key) => {
            println!("task_sort={key}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn parse_neighbor(raw: &str) -> Result<Option<OrderKey>, tidytask_core::OrderKeyParseError> {
    if raw.trim() == "-" {
        return Ok(None);
    }
    raw.parse().map(Some)
}
