//! Queries over a reconstructed or reduced call graph.
//!
//! This module handles:
//! - Function coverage of the trace
//! - Call-frequency buckets and visual weights
//! - Whole-graph summaries (node kinds, hottest nodes by self time)

pub mod coverage;
pub mod frequency;

// Re-export main types and functions
pub use coverage::{coverage, Coverage};
pub use frequency::{frequency_buckets, visual_weight, FrequencyBuckets};

use crate::graph::{CallGraph, NodeKey, NodeKind};
use serde::{Deserialize, Serialize};

/// One entry of the hottest-nodes list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotNode {
    pub key: NodeKey,
    pub label: String,
    pub self_time: i64,
    pub call_count: u64,
}

/// Shape and timing overview of a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub simple_nodes: usize,
    pub merged_nodes: usize,
    pub linked_nodes: usize,
    pub edges: usize,
    /// Elapsed time of the entry function
    pub total_elapsed: i64,
    /// Nodes with the largest self time, descending
    pub hottest: Vec<HotNode>,
}

impl GraphSummary {
    /// Summarize `graph`, keeping the `top_n` hottest nodes
    ///
    /// **Public** - used by the text summary and the JSON profile
    pub fn from_graph(graph: &CallGraph, top_n: usize) -> Self {
        let mut hottest: Vec<HotNode> = graph
            .nodes()
            .filter_map(|node| {
                Some(HotNode {
                    key: node.key(),
                    label: graph.label(node.key())?,
                    self_time: graph.self_time(node.key())?,
                    call_count: graph.symbol_of(node)?.call_count,
                })
            })
            .collect();
        hottest.sort_by(|a, b| b.self_time.cmp(&a.self_time).then(a.key.cmp(&b.key)));
        hottest.truncate(top_n);

        Self {
            simple_nodes: graph.count_kind(|kind| matches!(kind, NodeKind::Simple)),
            merged_nodes: graph.count_kind(|kind| matches!(kind, NodeKind::Merged { .. })),
            linked_nodes: graph.count_kind(|kind| matches!(kind, NodeKind::Linked { .. })),
            edges: graph.edge_count(),
            total_elapsed: graph.root().map(|root| root.elapsed()).unwrap_or(0),
            hottest,
        }
    }

    pub fn total_nodes(&self) -> usize {
        self.simple_nodes + self.merged_nodes + self.linked_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_call_graph;
    use crate::symbols::SymbolTable;

    #[test]
    fn test_summary() {
        let table = SymbolTable::from_dumps(
            "CU: ./m.c:\nhdr\nm.c 1 0x100\nm.c - 0x200\n",
            "0000000000000100 g     F .text  0000000000000020 main\n\
             0000000000000140 g     F .text  0000000000000020 work\n",
        )
        .unwrap();
        let trace = "0x100 0x0 E 0\n0x140 0x110 E 10\n0x140 0x110 X 90\n0x100 0x0 X 100\n";
        let graph = build_call_graph(table, trace).unwrap();

        let summary = GraphSummary::from_graph(&graph, 1);

        assert_eq!(summary.simple_nodes, 2);
        assert_eq!(summary.total_nodes(), 2);
        assert_eq!(summary.edges, 1);
        assert_eq!(summary.total_elapsed, 100);
        assert_eq!(summary.hottest.len(), 1);
        assert_eq!(summary.hottest[0].key, 0x110);
        assert_eq!(summary.hottest[0].self_time, 80);
        assert_eq!(summary.hottest[0].label, "m/work(1)#272");
    }
}
