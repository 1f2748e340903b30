//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Builds the symbol table from both dumps
//! 2. Replays the trace into the exact call graph
//! 3. Reduces the graph to the requested sensitivity
//! 4. Builds the profile and render model
//! 5. Writes output files

use super::models::AnalyzeArgs;
use crate::graph::build_call_graph_from_file;
use crate::output::{generate_dot, generate_text_summary, to_profile, write_dot, write_profile, GraphProfile};
use crate::reduce::reduce;
use crate::stats::frequency_buckets;
use crate::symbols::SymbolTable;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// The profile that was written
///
/// # Errors
/// * Unreadable dumps or trace
/// * Malformed trace, stack underflow, unknown function address
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<GraphProfile> {
    let start_time = Instant::now();

    info!("Starting analysis of trace: {}", args.trace.display());

    // Step 1: Symbols
    info!("Step 1/5: Loading symbol table...");
    let symbols = SymbolTable::from_files(&args.debug_line, &args.symbols)
        .context("Failed to build symbol table")?;
    debug!(
        "Symbol table: {} functions, {} source ranges",
        symbols.len(),
        symbols.ranges().count()
    );

    // Step 2: Reconstruction
    info!("Step 2/5: Reconstructing call graph...");
    let mut graph = build_call_graph_from_file(symbols, &args.trace)
        .context("Failed to reconstruct call graph from trace")?;

    // Step 3: Reduction
    info!("Step 3/5: Reducing to context sensitivity {}...", args.sensitivity);
    let report = reduce(&mut graph, args.sensitivity);
    debug_assert!(graph.is_symmetric());

    // Step 4: Profile
    info!("Step 4/5: Building profile...");
    let buckets = frequency_buckets(graph.symbols(), args.frequency_step);
    let profile = to_profile(&graph, args.sensitivity, report, &buckets, args.top_nodes);
    info!(
        "Coverage: {} of {} functions ({}%)",
        profile.coverage.called,
        profile.coverage.total,
        profile.coverage.percentage()
    );

    // Step 5: Outputs
    info!("Step 5/5: Writing output files...");
    write_profile(&profile, &args.output_json).context("Failed to write profile JSON")?;
    info!("✓ Profile written to: {}", args.output_json.display());

    if let Some(dot_path) = &args.output_dot {
        let dot = generate_dot(&profile.graph, args.dot_config.as_ref());
        write_dot(&dot, dot_path).context("Failed to write DOT graph")?;
        info!("✓ DOT graph written to: {}", dot_path.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("CALL GRAPH SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Trace:       {}", args.trace.display());
        println!("Sensitivity: {}", args.sensitivity);
        println!("Reduction:   {}", profile.reduction.summary());
        println!("\n{}", generate_text_summary(&profile, 10));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(profile)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    for (what, path) in [
        ("Debug-line dump", &args.debug_line),
        ("Symbol-table dump", &args.symbols),
        ("Trace", &args.trace),
    ] {
        if path.as_os_str().is_empty() {
            anyhow::bail!("{} path cannot be empty", what);
        }
        if !path.is_file() {
            anyhow::bail!("{} not found: {}", what, path.display());
        }
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.frequency_step == 0 {
        anyhow::bail!("frequency_step must be greater than 0");
    }

    if args.top_nodes == 0 {
        anyhow::bail!("top_nodes must be greater than 0");
    }

    if args.top_nodes > 1000 {
        anyhow::bail!("top_nodes is too large (max 1000)");
    }

    Ok(())
}
