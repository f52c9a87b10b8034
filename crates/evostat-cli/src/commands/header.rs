//! Show the roster declared in a log header.

use anyhow::{Context, Result};
use colored::Colorize;
use evostat_core::prelude::*;
use evostat_runtime::ingest::{CsvLogReader, TableSource};
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let opened = CsvLogReader::default()
        .open_table(path)
        .with_context(|| format!("Failed to open log: {}", path.display()))?;
    let context = LogContext::from_header_line(path, &opened.header_line)?;

    println!("{} {}", "Log:".bold(), path.display());
    println!("  Problem: {}", context.problem.title().cyan());
    if let Some(common) = &context.header.common {
        print_parameter("Population size", common.population_size);
        print_parameter("Repetitions", common.total_repetitions);
        print_parameter("Iterations per run", common.iterations_per_run);
    }

    println!();
    println!("{} ({} algorithms)", "Roster".bold(), context.resolver.len());
    for (index, identity) in context.resolver.roster().iter().enumerate() {
        let style = DefaultStyles.style(identity);
        println!(
            "  {:>3}  {:<62} {} {}",
            index.to_string().cyan(),
            DefaultStyles.label(identity),
            style.color.dimmed(),
            style.symbol.dimmed()
        );
    }

    Ok(())
}

fn print_parameter(name: &str, value: Option<u64>) {
    if let Some(value) = value {
        println!("  {}: {}", name, value.to_string().cyan());
    }
}
