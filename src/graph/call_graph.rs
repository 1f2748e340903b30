//! Arena-backed call graph.
//!
//! Nodes live in a map keyed by call site. Edges are stored on both ends as
//! neighbor keys: `b ∈ a.outgoing ⇔ a ∈ b.incoming`. Every mutation goes
//! through `link`/`unlink`, which update both sides together.

use super::node::{CallGraphNode, NodeKey, NodeKind};
use crate::symbols::{Symbol, SymbolTable};
use std::collections::{BTreeMap, BTreeSet};

/// Key of the process entry node
pub const ROOT_KEY: NodeKey = 0;

/// The mutable directed call graph, together with the symbols it refers to
#[derive(Debug, Clone)]
pub struct CallGraph {
    symbols: SymbolTable,
    nodes: BTreeMap<NodeKey, CallGraphNode>,
}

/// Node labels and labelled edges, for comparing graphs structurally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphShape {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<(String, String)>,
}

impl CallGraph {
    pub fn new(symbols: SymbolTable) -> Self {
        Self {
            symbols,
            nodes: BTreeMap::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    pub fn root(&self) -> Option<&CallGraphNode> {
        self.nodes.get(&ROOT_KEY)
    }

    pub fn node(&self, key: NodeKey) -> Option<&CallGraphNode> {
        self.nodes.get(&key)
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Option<&mut CallGraphNode> {
        self.nodes.get_mut(&key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Nodes in key order
    pub fn nodes(&self) -> impl Iterator<Item = &CallGraphNode> {
        self.nodes.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the node for `call_site`, creating a simple node for `symbol` if absent
    pub fn add_node(&mut self, symbol: u64, call_site: NodeKey) -> &mut CallGraphNode {
        self.nodes
            .entry(call_site)
            .or_insert_with(|| CallGraphNode::new(symbol, call_site))
    }

    pub(crate) fn insert(&mut self, node: CallGraphNode) {
        self.nodes.insert(node.key(), node);
    }

    /// Remove a node from the arena; the caller must have detached its edges
    pub(crate) fn retire(&mut self, key: NodeKey) -> Option<CallGraphNode> {
        let node = self.nodes.remove(&key)?;
        debug_assert!(
            node.incoming.is_empty() && node.outgoing.is_empty(),
            "retired node {} still has edges",
            key
        );
        Some(node)
    }

    /// Add the edge `from -> to` on both ends
    ///
    /// Returns false if either node is missing.
    pub fn link(&mut self, from: NodeKey, to: NodeKey) -> bool {
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.outgoing.insert(to);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.incoming.insert(from);
        }
        true
    }

    /// Remove the edge `from -> to` from both ends
    pub fn unlink(&mut self, from: NodeKey, to: NodeKey) {
        if let Some(node) = self.nodes.get_mut(&from) {
            node.outgoing.remove(&to);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.incoming.remove(&from);
        }
    }

    /// All edges as `(predecessor, successor)` in key order
    pub fn edges(&self) -> impl Iterator<Item = (NodeKey, NodeKey)> + '_ {
        self.nodes
            .values()
            .flat_map(|node| node.outgoing.iter().map(move |to| (node.key(), *to)))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.outgoing.len()).sum()
    }

    /// Edges whose two ends disagree, or that point at a missing node
    pub fn asymmetric_edges(&self) -> Vec<(NodeKey, NodeKey)> {
        let mut broken = Vec::new();
        for node in self.nodes.values() {
            for to in &node.outgoing {
                let ok = self
                    .nodes
                    .get(to)
                    .is_some_and(|succ| succ.incoming.contains(&node.key()));
                if !ok {
                    broken.push((node.key(), *to));
                }
            }
            for from in &node.incoming {
                let ok = self
                    .nodes
                    .get(from)
                    .is_some_and(|pred| pred.outgoing.contains(&node.key()));
                if !ok {
                    broken.push((*from, node.key()));
                }
            }
        }
        broken
    }

    pub fn is_symmetric(&self) -> bool {
        self.asymmetric_edges().is_empty()
    }

    pub fn symbol_of(&self, node: &CallGraphNode) -> Option<&Symbol> {
        self.symbols.get(node.symbol)
    }

    pub fn label(&self, key: NodeKey) -> Option<String> {
        let node = self.nodes.get(&key)?;
        Some(node.label(self.symbol_of(node)?))
    }

    /// Function containing the call site of `key`
    pub fn caller_of(&self, key: NodeKey) -> Option<&Symbol> {
        if key == ROOT_KEY {
            return None;
        }
        self.symbols.find_caller(key)
    }

    /// Elapsed time minus the elapsed time of every direct successor
    ///
    /// Saturates at the `i64` bounds when wrapped timestamps pile up.
    pub fn self_time(&self, key: NodeKey) -> Option<i64> {
        let node = self.nodes.get(&key)?;
        let children = node
            .outgoing
            .iter()
            .filter_map(|k| self.nodes.get(k))
            .map(CallGraphNode::elapsed)
            .fold(0i64, i64::saturating_add);
        Some(node.elapsed().saturating_sub(children))
    }

    pub fn count_kind(&self, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        self.nodes.values().filter(|n| predicate(&n.kind)).count()
    }

    /// Labels and labelled edges of the whole graph
    pub fn shape(&self) -> GraphShape {
        let label = |key: NodeKey| self.label(key).unwrap_or_else(|| format!("?#{}", key));
        GraphShape {
            nodes: self.nodes.keys().map(|k| label(*k)).collect(),
            edges: self.edges().map(|(a, b)| (label(a), label(b))).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBUG_LINE: &str = "CU: ./a.c:\nhdr\na.c 1 0x100\na.c - 0x200\n";
    const SYMBOLS: &str = "\
0000000000000100 g     F .text  0000000000000020 main
0000000000000140 g     F .text  0000000000000020 work
";

    fn graph() -> CallGraph {
        let table = SymbolTable::from_dumps(DEBUG_LINE, SYMBOLS).unwrap();
        let mut graph = CallGraph::new(table);
        graph.add_node(0x100, ROOT_KEY).visit_order = 1;
        graph.add_node(0x140, 0x110).visit_order = 2;
        graph.add_node(0x140, 0x118).visit_order = 3;
        graph
    }

    #[test]
    fn test_link_is_symmetric() {
        let mut graph = graph();
        assert!(graph.link(ROOT_KEY, 0x110));
        assert!(graph.link(ROOT_KEY, 0x118));
        assert!(graph.is_symmetric());
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.node(0x110).unwrap().incoming().contains(&ROOT_KEY));
    }

    #[test]
    fn test_link_missing_node() {
        let mut graph = graph();
        assert!(!graph.link(ROOT_KEY, 0x999));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_unlink_removes_both_sides() {
        let mut graph = graph();
        graph.link(ROOT_KEY, 0x110);
        graph.unlink(ROOT_KEY, 0x110);
        assert!(graph.root().unwrap().outgoing().is_empty());
        assert!(graph.node(0x110).unwrap().incoming().is_empty());
    }

    #[test]
    fn test_add_node_finds_existing() {
        let mut graph = graph();
        graph.add_node(0x140, 0x110).start_time = 42;
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.node(0x110).unwrap().start_time, 42);
    }

    #[test]
    fn test_asymmetric_edge_detected() {
        let mut graph = graph();
        graph.node_mut(ROOT_KEY).unwrap().outgoing.insert(0x110);
        assert_eq!(graph.asymmetric_edges(), vec![(ROOT_KEY, 0x110)]);
    }

    #[test]
    fn test_self_time() {
        let mut graph = graph();
        graph.link(ROOT_KEY, 0x110);
        graph.link(ROOT_KEY, 0x118);
        for (key, start, end) in [(ROOT_KEY, 0, 100), (0x110, 10, 40), (0x118, 50, 70)] {
            let node = graph.node_mut(key).unwrap();
            node.start_time = start;
            node.end_time = end;
        }
        assert_eq!(graph.self_time(ROOT_KEY), Some(50));
        assert_eq!(graph.self_time(0x110), Some(30));
    }

    #[test]
    fn test_self_time_saturates_on_wrapped_timestamps() {
        let mut graph = graph();
        let root = graph.node_mut(ROOT_KEY).unwrap();
        root.start_time = 1_700_000_000_000_000_000;
        root.end_time = 1_700_000_000_000_000_100;
        for key in 0x110..0x117 {
            graph.add_node(0x140, key).start_time = 1_700_000_000_000_000_010;
            graph.link(ROOT_KEY, key);
        }

        assert_eq!(graph.self_time(ROOT_KEY), Some(i64::MAX));
        assert_eq!(graph.self_time(0x110), Some(-1_700_000_000_000_000_010));
    }

    #[test]
    fn test_caller_of() {
        let graph = graph();
        assert_eq!(graph.caller_of(0x110).unwrap().name, "main");
        assert!(graph.caller_of(ROOT_KEY).is_none());
    }

    #[test]
    fn test_label() {
        let graph = graph();
        assert_eq!(graph.label(0x110).unwrap(), "a/work(0)#272");
        assert!(graph.label(0x999).is_none());
    }
}
