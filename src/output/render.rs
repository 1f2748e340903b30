//! Renderer-facing view of a call graph.
//!
//! Everything an external renderer needs is resolved here (labels, weights,
//! colors, caller names), so the writers never look at the arena again.

use crate::graph::{CallGraph, CallGraphNode, NodeKey};
use crate::stats::FrequencyBuckets;
use crate::utils::config::color_for;
use log::warn;
use serde::{Deserialize, Serialize};

/// One node as handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderNode {
    pub key: NodeKey,

    /// `prefix/name(count)#call_site`, `#Merged` or `#Linked`
    pub label: String,

    /// `simple`, `merged` or `linked`
    pub kind: String,

    /// Pen width, from the call-frequency bucket of the symbol
    pub weight: usize,

    pub color_index: usize,

    /// Fill color from the 16-entry table
    pub color: String,

    pub call_count: u64,
    pub visit_order: u32,
    pub elapsed: i64,
    pub self_time: i64,

    /// Function containing the call site (absent for the root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,

    /// Labels of folded nodes, in member order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

/// One edge as handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub from_label: String,
    pub to_label: String,
    /// Visit order of the successor
    pub label: String,
}

/// Nodes in visit order plus all edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    /// Resolve every node and edge of `graph`
    ///
    /// **Public** - main entry point for the render model
    ///
    /// # Arguments
    /// * `graph` - Call graph at any reduction level
    /// * `buckets` - Frequency buckets computed from the same symbol table
    ///
    /// # Returns
    /// Render model; nodes whose symbol cannot be resolved are dropped with
    /// a warning, together with their edges.
    pub fn from_graph(graph: &CallGraph, buckets: &FrequencyBuckets) -> Self {
        let mut nodes: Vec<RenderNode> = graph
            .nodes()
            .filter_map(|node| {
                let rendered = render_node(graph, buckets, node);
                if rendered.is_none() {
                    warn!("No symbol for node {}, leaving it out", node);
                }
                rendered
            })
            .collect();
        nodes.sort_by_key(|n| (n.visit_order, n.key));

        let edges = graph
            .edges()
            .filter_map(|(from, to)| {
                Some(RenderEdge {
                    from,
                    to,
                    from_label: graph.label(from)?,
                    to_label: graph.label(to)?,
                    label: graph.node(to)?.visit_order.to_string(),
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn node(&self, key: NodeKey) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.key == key)
    }
}

fn render_node(
    graph: &CallGraph,
    buckets: &FrequencyBuckets,
    node: &CallGraphNode,
) -> Option<RenderNode> {
    let symbol = graph.symbol_of(node)?;

    let members = node
        .members()
        .iter()
        .filter_map(|member| Some(member.label(graph.symbol_of(member)?)))
        .collect();

    Some(RenderNode {
        key: node.key(),
        label: node.label(symbol),
        kind: node.kind.name().to_string(),
        weight: buckets.visual_weight(symbol.call_count),
        color_index: symbol.ordinal,
        color: color_for(symbol.ordinal).to_string(),
        call_count: symbol.call_count,
        visit_order: node.visit_order,
        elapsed: node.elapsed(),
        self_time: graph.self_time(node.key())?,
        caller: graph.caller_of(node.key()).map(ToString::to_string),
        members,
    })
}
