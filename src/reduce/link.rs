//! Link pass (context sensitivity 2).
//!
//! Maximal runs of pass-through nodes (one predecessor, one successor) are
//! collapsed into one `Linked` node keyed by the head of the run. Only the
//! run's outside edges survive; the internal order lives in the member list.

use super::ReductionReport;
use crate::graph::{CallGraph, CallGraphNode, NodeKey};
use log::debug;
use std::collections::BTreeSet;

/// Collapse every maximal pass-through chain of length two or more
pub fn link_pass(graph: &mut CallGraph) -> ReductionReport {
    let mut report = ReductionReport::starting_from(graph);

    for chain in collect_chains(graph) {
        if link_chain(graph, &chain).is_some() {
            report.linked_chains += 1;
        } else {
            report.skipped += 1;
        }
    }

    report.finish(graph);
    report
}

/// Maximal pass-through runs in the current graph, each in call order
///
/// Runs of a single node are not returned.
pub fn collect_chains(graph: &CallGraph) -> Vec<Vec<NodeKey>> {
    let mut candidates: BTreeSet<NodeKey> = graph
        .nodes()
        .filter(|node| node.is_pass_through() && !node.is_root())
        .map(CallGraphNode::key)
        .collect();

    let mut chains = Vec::new();
    while let Some(seed) = candidates.pop_first() {
        let mut chain = vec![seed];

        // Walk towards the head
        let mut current = seed;
        while let Some(pred) = graph.node(current).and_then(CallGraphNode::sole_predecessor) {
            if !candidates.remove(&pred) {
                break;
            }
            chain.insert(0, pred);
            current = pred;
        }

        // Walk towards the tail
        let mut current = seed;
        while let Some(succ) = graph.node(current).and_then(CallGraphNode::sole_successor) {
            if !candidates.remove(&succ) {
                break;
            }
            chain.push(succ);
            current = succ;
        }

        if chain.len() > 1 {
            chains.push(chain);
        }
    }

    chains
}

/// Replace `chain` with one linked node; returns its key
///
/// The graph is only touched once the aggregate has been built.
fn link_chain(graph: &mut CallGraph, chain: &[NodeKey]) -> Option<NodeKey> {
    let head = graph.node(*chain.first()?)?;
    let tail = graph.node(*chain.last()?)?;
    let (Some(entry), Some(exit)) = (head.sole_predecessor(), tail.sole_successor()) else {
        debug!("Chain {:?} lost its pass-through shape, skipping", chain);
        return None;
    };
    let distinct: BTreeSet<NodeKey> = chain.iter().copied().collect();
    if distinct.len() != chain.len() || distinct.contains(&entry) || distinct.contains(&exit) {
        debug!("Chain {:?} closes a cycle, skipping", chain);
        return None;
    }
    let connected = chain
        .windows(2)
        .all(|pair| graph.node(pair[0]).and_then(CallGraphNode::sole_successor) == Some(pair[1]));
    if !connected {
        debug!("Chain {:?} is not contiguous, skipping", chain);
        return None;
    }

    let members = chain
        .iter()
        .map(|key| graph.node(*key).map(|node| node.clone().into_member()))
        .collect::<Option<Vec<_>>>()?;
    let linked = CallGraphNode::linked(members)?;
    let key = linked.key();

    graph.unlink(entry, chain[0]);
    for pair in chain.windows(2) {
        graph.unlink(pair[0], pair[1]);
    }
    graph.unlink(chain[chain.len() - 1], exit);
    for member in chain {
        graph.retire(*member);
    }

    graph.insert(linked);
    graph.link(entry, key);
    graph.link(key, exit);

    debug!(
        "Linked {} nodes into {} ({} -> {})",
        chain.len(),
        key,
        entry,
        exit
    );
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeKind, ROOT_KEY};
    use crate::symbols::SymbolTable;

    const DEBUG_LINE: &str = "CU: ./a.c:\nhdr\na.c 1 0x100\na.c - 0x400\n";
    const SYMBOLS: &str = "\
0000000000000100 g     F .text  0000000000000020 main
0000000000000140 g     F .text  0000000000000020 a
0000000000000180 g     F .text  0000000000000020 b
00000000000001c0 g     F .text  0000000000000020 c
0000000000000200 g     F .text  0000000000000020 d
0000000000000240 g     F .text  0000000000000020 e
";

    fn empty_graph() -> CallGraph {
        CallGraph::new(SymbolTable::from_dumps(DEBUG_LINE, SYMBOLS).unwrap())
    }

    /// main -> a#1 -> b#2 -> c#3 -> d#4, with a and d branching
    fn chain_graph() -> CallGraph {
        let mut graph = empty_graph();
        graph.add_node(0x100, ROOT_KEY).visit_order = 1;
        for (order, (symbol, key)) in [(0x140, 1), (0x180, 2), (0x1c0, 3), (0x200, 4), (0x240, 5), (0x240, 6)]
            .into_iter()
            .enumerate()
        {
            graph.add_node(symbol, key).visit_order = order as u32 + 2;
        }
        graph.link(ROOT_KEY, 1);
        graph.link(1, 2);
        graph.link(2, 3);
        graph.link(3, 4);
        // a has a second successor, d has two successors
        graph.link(1, 5);
        graph.link(4, 5);
        graph.link(4, 6);
        graph
    }

    #[test]
    fn test_collect_chain() {
        let graph = chain_graph();
        assert_eq!(collect_chains(&graph), vec![vec![2, 3]]);
    }

    #[test]
    fn test_link_chain() {
        let mut graph = chain_graph();
        let report = link_pass(&mut graph);

        assert_eq!(report.linked_chains, 1);
        assert!(!graph.contains(3));
        let linked = graph.node(2).unwrap();
        assert!(matches!(linked.kind, NodeKind::Linked { .. }));
        let member_keys: Vec<_> = linked.members().iter().map(|m| m.key()).collect();
        assert_eq!(member_keys, vec![2, 3]);
        assert_eq!(linked.sole_predecessor(), Some(1));
        assert_eq!(linked.sole_successor(), Some(4));
        assert!(graph.node(4).unwrap().incoming().contains(&2));
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_single_pass_through_left_alone() {
        let mut graph = empty_graph();
        graph.add_node(0x100, ROOT_KEY).visit_order = 1;
        graph.add_node(0x140, 1).visit_order = 2;
        graph.add_node(0x180, 2).visit_order = 3;
        graph.link(ROOT_KEY, 1);
        graph.link(1, 2);
        graph.link(ROOT_KEY, 2);

        let report = link_pass(&mut graph);

        assert_eq!(report.linked_chains, 0);
        assert!(graph.node(1).unwrap().is_simple());
    }

    #[test]
    fn test_chain_between_root_and_fan_out() {
        // main -> a -> b -> c -> {d, e}
        let mut graph = empty_graph();
        graph.add_node(0x100, ROOT_KEY).visit_order = 1;
        for (order, (symbol, key)) in [(0x140, 1), (0x180, 2), (0x1c0, 3), (0x200, 4), (0x240, 5)]
            .into_iter()
            .enumerate()
        {
            graph.add_node(symbol, key).visit_order = order as u32 + 2;
        }
        graph.link(ROOT_KEY, 1);
        graph.link(1, 2);
        graph.link(2, 3);
        graph.link(3, 4);
        graph.link(3, 5);

        link_pass(&mut graph);

        let linked = graph.node(1).unwrap();
        assert_eq!(linked.members().len(), 2);
        assert_eq!(linked.sole_successor(), Some(3));
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn test_pure_cycle_skipped() {
        let mut graph = empty_graph();
        graph.add_node(0x140, 1).visit_order = 2;
        graph.add_node(0x180, 2).visit_order = 3;
        graph.link(1, 2);
        graph.link(2, 1);

        let report = link_pass(&mut graph);

        assert_eq!(report.linked_chains, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(graph.len(), 2);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_link_pass_is_idempotent() {
        let mut graph = chain_graph();
        link_pass(&mut graph);
        let once = graph.shape();
        let report = link_pass(&mut graph);
        assert_eq!(report.linked_chains, 0);
        assert_eq!(graph.shape(), once);
    }
}
