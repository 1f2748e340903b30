//! Context-sensitivity reduction of a reconstructed call graph.
//!
//! This module handles:
//! - Merging same-symbol nodes that converge on one successor (level 1)
//! - Linking maximal pass-through chains into one node (level 2)
//! - Reporting what each pass did, for logging

pub mod link;
pub mod merge;

// Re-export main functions
pub use link::{collect_chains, link_pass};
pub use merge::{apply_merge_groups, collect_merge_groups, merge_pass, MergeGroup};

use crate::graph::CallGraph;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How aggressively the graph is collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// One node per call site
    #[default]
    Full,
    /// Merge pass only
    Merged,
    /// Merge pass, then link pass
    Linked,
}

impl Sensitivity {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Full),
            1 => Some(Self::Merged),
            2 => Some(Self::Linked),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Self::Full => 0,
            Self::Merged => 1,
            Self::Linked => 2,
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Outcome of one or more reduction passes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionReport {
    /// Merged nodes created
    pub merged_groups: usize,
    /// Linked nodes created
    pub linked_chains: usize,
    /// Candidates that no longer qualified when applied
    pub skipped: usize,
    pub nodes_before: usize,
    pub nodes_after: usize,
}

impl ReductionReport {
    pub(crate) fn starting_from(graph: &CallGraph) -> Self {
        Self {
            nodes_before: graph.len(),
            nodes_after: graph.len(),
            ..Self::default()
        }
    }

    /// Add the counters of a later pass; node counts are left to `finish`
    pub(crate) fn absorb(&mut self, other: ReductionReport) {
        self.merged_groups += other.merged_groups;
        self.linked_chains += other.linked_chains;
        self.skipped += other.skipped;
    }

    pub(crate) fn finish(&mut self, graph: &CallGraph) {
        self.nodes_after = graph.len();
    }

    pub fn nodes_removed(&self) -> usize {
        self.nodes_before.saturating_sub(self.nodes_after)
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "{} -> {} nodes, {} removed ({} merged, {} linked, {} skipped)",
            self.nodes_before,
            self.nodes_after,
            self.nodes_removed(),
            self.merged_groups,
            self.linked_chains,
            self.skipped
        )
    }
}

/// Reduce `graph` in place to the requested sensitivity
///
/// **Public** - main entry point for reduction
///
/// # Arguments
/// * `graph` - Unreduced (or already reduced) call graph
/// * `sensitivity` - Target level; each level includes the previous one
///
/// # Returns
/// Combined report of the passes that ran. Candidates that fail their
/// precondition are skipped, never reported as errors.
pub fn reduce(graph: &mut CallGraph, sensitivity: Sensitivity) -> ReductionReport {
    let mut report = ReductionReport::starting_from(graph);

    if sensitivity >= Sensitivity::Merged {
        report.absorb(merge_pass(graph));
    }
    if sensitivity >= Sensitivity::Linked {
        report.absorb(link_pass(graph));
    }

    report.finish(graph);
    info!("Reduced to level {}: {}", sensitivity, report.summary());
    report
}
