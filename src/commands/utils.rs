use crate::output::read_profile;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a profile JSON file
pub fn validate_profile_file(file_path: PathBuf) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let profile = read_profile(&file_path)
        .with_context(|| format!("Not a valid profile: {}", file_path.display()))?;

    if profile.version != SCHEMA_VERSION {
        anyhow::bail!(
            "Profile schema v{} does not match this build (v{})",
            profile.version,
            SCHEMA_VERSION
        );
    }

    println!("✓ Valid profile JSON");
    println!("  Version: {}", profile.version);
    println!("  Sensitivity: {}", profile.sensitivity);
    println!(
        "  Coverage: {} of {} ({}%)",
        profile.coverage.called,
        profile.coverage.total,
        profile.coverage.percentage()
    );
    println!("  Nodes: {}", profile.graph.nodes.len());
    println!("  Edges: {}", profile.graph.edges.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Callgraph Studio Profile Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  sensitivity: string      - full | merged | linked");
        println!("  coverage: object         - Called versus known functions");
        println!("    called: number         - Functions entered at least once");
        println!("    total: number          - Functions in the symbol table");
        println!("    uncalled: array        - prefix/name of functions never entered");
        println!("  reduction: object        - Merged groups, linked chains, node counts");
        println!("  summary: object          - Node kinds, edges, hottest nodes by self time");
        println!("  graph: object            - Render model");
        println!("    nodes: array           - label, kind, weight, color, timing, members");
        println!("    edges: array           - from/to keys and labels, successor visit order");
        println!("  generated_at: string     - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Callgraph Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Dynamic call graph reconstruction for -finstrument-functions traces.");
}
