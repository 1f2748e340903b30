//! JSON schema of the analysis profile.
//!
//! The profile is versioned so readers can reject files written by an
//! incompatible build.

use super::render::RenderGraph;
use crate::graph::CallGraph;
use crate::reduce::{ReductionReport, Sensitivity};
use crate::stats::{coverage, Coverage, FrequencyBuckets, GraphSummary};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphProfile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Context-sensitivity level the graph was reduced to
    pub sensitivity: Sensitivity,

    pub coverage: Coverage,

    /// What the reduction passes did
    pub reduction: ReductionReport,

    pub summary: GraphSummary,

    pub graph: RenderGraph,

    /// Timestamp when profile was generated
    pub generated_at: String,
}

/// Assemble a profile from a reduced graph
///
/// **Public** - main entry point for profile construction
///
/// # Arguments
/// * `graph` - Graph after reduction
/// * `sensitivity` - Level it was reduced to
/// * `reduction` - Report returned by `reduce`
/// * `buckets` - Frequency buckets for visual weights
/// * `top_n` - Number of hottest nodes to keep in the summary
pub fn to_profile(
    graph: &CallGraph,
    sensitivity: Sensitivity,
    reduction: ReductionReport,
    buckets: &FrequencyBuckets,
    top_n: usize,
) -> GraphProfile {
    GraphProfile {
        version: SCHEMA_VERSION.to_string(),
        sensitivity,
        coverage: coverage(graph.symbols()),
        reduction,
        summary: GraphSummary::from_graph(graph, top_n),
        graph: RenderGraph::from_graph(graph, buckets),
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}
