//! Terminal text summary of a profile.

use super::schema::GraphProfile;

const RESET: &str = "\x1b[0m";

fn ansi_for_kind(kind: &str) -> &'static str {
    match kind {
        "merged" => "\x1b[35m", // Magenta
        "linked" => "\x1b[34m", // Blue
        _ => "\x1b[33m",        // Yellow
    }
}

/// Coverage report, uncalled functions and the hottest nodes table
///
/// **Public** - printed by `analyze --summary`
///
/// # Arguments
/// * `profile` - Profile to summarize
/// * `max_lines` - Maximum rows in the hottest nodes table
pub fn generate_text_summary(profile: &GraphProfile, max_lines: usize) -> String {
    let coverage = &profile.coverage;
    let mut lines = Vec::new();

    lines.push(format!(
        "  Coverage: {} out of {} ({}%).",
        coverage.called,
        coverage.total,
        coverage.percentage()
    ));
    lines.push(format!("  Function not invoked: {}", coverage.uncalled_count()));
    if !coverage.uncalled.is_empty() {
        lines.push("  Details:".to_string());
        for name in &coverage.uncalled {
            lines.push(format!("  \t{}", name));
        }
    }

    let summary = &profile.summary;
    lines.push(String::new());
    lines.push(format!(
        "  Nodes: {} ({} simple, {} merged, {} linked), edges: {}",
        summary.total_nodes(),
        summary.simple_nodes,
        summary.merged_nodes,
        summary.linked_nodes,
        summary.edges
    ));

    lines.push(String::new());
    lines.push("  🔥 HOTTEST NODES (self time)".to_string());
    lines.push("  ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━┳━━━━━━━━━┓".to_string());
    lines.push(format!(
        "  ┃ {:<42} ┃ {:^12} ┃ {:^12} ┃ {:^7} ┃",
        "Node (Hottest First)", "CALLS", "SELF (ns)", "%"
    ));
    lines.push("  ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━╋━━━━━━━━━┫".to_string());

    let total = summary.total_elapsed.max(1);
    for hot in summary.hottest.iter().take(max_lines) {
        let percentage = hot.self_time as f64 / total as f64 * 100.0;
        let kind = profile
            .graph
            .node(hot.key)
            .map(|n| n.kind.as_str())
            .unwrap_or("simple");
        let color = ansi_for_kind(kind);

        let label = if hot.label.chars().count() > 42 {
            let tail: String = hot
                .label
                .chars()
                .rev()
                .take(39)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("...{}", tail)
        } else {
            hot.label.clone()
        };

        lines.push(format!(
            "  ┃ {}{:<42}{} ┃ {:>12} ┃ {:>12} ┃ {:>6.1}% ┃",
            color, label, RESET, hot.call_count, hot.self_time, percentage
        ));
    }

    lines.push("  ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━┻━━━━━━━━━┛".to_string());

    let shown = summary.hottest.len().min(max_lines);
    if summary.total_nodes() > shown {
        lines.push(String::new());
        lines.push(format!(
            "   (Showing top {} of {} nodes)",
            shown,
            summary.total_nodes()
        ));
    }

    lines.join("\n")
}
