//! Merge pass (context sensitivity 1).
//!
//! Simple nodes that share a symbol and whose only outgoing edge points at
//! the same successor are folded into one `Merged` node. Groups are keyed by
//! successor, so every candidate belongs to at most one group.

use super::ReductionReport;
use crate::graph::{CallGraph, CallGraphNode, NodeKey};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Members sharing a symbol and a sole successor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    pub successor: NodeKey,
    pub members: Vec<NodeKey>,
}

/// Run the merge pass to a fixpoint
///
/// Merging can make two previously distinct successors one node, which can
/// create new groups; the pass repeats until none remain.
pub fn merge_pass(graph: &mut CallGraph) -> ReductionReport {
    let mut report = ReductionReport::starting_from(graph);
    loop {
        let groups = collect_merge_groups(graph);
        if groups.is_empty() {
            break;
        }
        let round = apply_merge_groups(graph, groups);
        let progressed = round.merged_groups > 0;
        report.absorb(round);
        if !progressed {
            break;
        }
    }
    report.finish(graph);
    report
}

/// Find every eligible group in the current graph
pub fn collect_merge_groups(graph: &CallGraph) -> Vec<MergeGroup> {
    let mut groups = Vec::new();

    for successor in graph.nodes() {
        if successor.incoming().len() < 2 {
            continue;
        }

        let mut by_symbol: BTreeMap<u64, Vec<NodeKey>> = BTreeMap::new();
        for pred_key in successor.incoming() {
            let Some(pred) = graph.node(*pred_key) else {
                continue;
            };
            if pred.is_simple() && pred.sole_successor() == Some(successor.key()) {
                by_symbol.entry(pred.symbol).or_default().push(pred.key());
            }
        }

        for (symbol, members) in by_symbol {
            if members.len() < 2 {
                continue;
            }
            if members.contains(&successor.key()) {
                debug!(
                    "Skipping merge of {:#x} into itself at {}",
                    symbol,
                    successor.key()
                );
                continue;
            }
            groups.push(MergeGroup {
                successor: successor.key(),
                members,
            });
        }
    }

    groups
}

/// Apply groups in the given order
///
/// Groups collected from one snapshot are disjoint; a successor retired by an
/// earlier group in the same batch is followed to the aggregate replacing it.
pub fn apply_merge_groups(graph: &mut CallGraph, groups: Vec<MergeGroup>) -> ReductionReport {
    let mut report = ReductionReport::default();
    let mut forwarded: HashMap<NodeKey, NodeKey> = HashMap::new();

    for group in groups {
        let successor = resolve(&forwarded, group.successor);
        match merge_group(graph, successor, &group.members) {
            Some(key) => {
                report.merged_groups += 1;
                for member in &group.members {
                    if *member != key {
                        forwarded.insert(*member, key);
                    }
                }
            }
            None => report.skipped += 1,
        }
    }

    report
}

fn resolve(forwarded: &HashMap<NodeKey, NodeKey>, mut key: NodeKey) -> NodeKey {
    while let Some(next) = forwarded.get(&key) {
        key = *next;
    }
    key
}

/// Check the group still qualifies against the live graph
fn eligible(graph: &CallGraph, successor: NodeKey, members: &[NodeKey]) -> bool {
    let distinct: BTreeSet<NodeKey> = members.iter().copied().collect();
    if distinct.len() < 2
        || distinct.len() != members.len()
        || distinct.contains(&successor)
        || !graph.contains(successor)
    {
        return false;
    }
    let mut symbol = None;
    members.iter().all(|key| {
        let Some(node) = graph.node(*key) else {
            return false;
        };
        let same_symbol = *symbol.get_or_insert(node.symbol) == node.symbol;
        same_symbol && node.is_simple() && node.sole_successor() == Some(successor)
    })
}

/// Replace `members` with one merged node; returns its key
///
/// The graph is only touched once the aggregate has been built.
fn merge_group(graph: &mut CallGraph, successor: NodeKey, members: &[NodeKey]) -> Option<NodeKey> {
    if !eligible(graph, successor, members) {
        debug!(
            "Merge candidate {:?} -> {} no longer qualifies, skipping",
            members, successor
        );
        return None;
    }

    let mut predecessors = Vec::new();
    let mut folded = Vec::with_capacity(members.len());
    for key in members {
        let node = graph.node(*key)?;
        for pred in node.incoming() {
            if !members.contains(pred) && !predecessors.contains(pred) {
                predecessors.push(*pred);
            }
        }
        folded.push(node.clone().into_member());
    }
    // The earliest-visited member is the representative
    folded.sort_by_key(|node| (node.visit_order, node.key()));
    let merged = CallGraphNode::merged(folded)?;
    let key = merged.key();

    for member in members {
        let incoming: Vec<NodeKey> = graph
            .node(*member)
            .map(|node| node.incoming().iter().copied().collect())
            .unwrap_or_default();
        for pred in incoming {
            graph.unlink(pred, *member);
        }
        graph.unlink(*member, successor);
        graph.retire(*member);
    }
    graph.insert(merged);

    for pred in predecessors {
        graph.link(pred, key);
    }
    graph.link(key, successor);

    debug!(
        "Merged {} nodes into {} -> {}",
        members.len(),
        key,
        successor
    );
    Some(key)
}
