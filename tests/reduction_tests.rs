use callgraph_studio::graph::{build_call_graph, CallGraph, NodeKind, ROOT_KEY};
use callgraph_studio::reduce::{
    apply_merge_groups, collect_merge_groups, link_pass, merge_pass, reduce, Sensitivity,
};
use callgraph_studio::symbols::SymbolTable;
use pretty_assertions::assert_eq;

const DEBUG_LINE: &str = "\
CU: ./src/main.c:
File name                            Line number    Starting address
main.c                                         3              0x1000
main.c                                         -              0x1100

CU: ./src/lib.c:
File name                            Line number    Starting address
lib.c                                          1              0x1100
lib.c                                          -              0x1400
";

const SYMBOLS: &str = "\
SYMBOL TABLE:
0000000000001000 g     F .text  0000000000000080 main
0000000000001100 g     F .text  0000000000000040 f
0000000000001140 g     F .text  0000000000000040 g
0000000000001180 g     F .text  0000000000000040 wrap
00000000000011c0 g     F .text  0000000000000040 inner
0000000000001200 g     F .text  0000000000000040 leaf
0000000000001240 g     F .text  0000000000000040 other
0000000000001280 g     F .text  0000000000000040 never
0000000000004010 g     O .data  0000000000000004 counter
";

/// main calls f three times from different call sites, every f calls g
/// from one site and g calls other once. Then main goes through
/// wrap -> inner -> leaf, and leaf calls both g and other.
const TRACE: &str = "\
0x1000 (nil) E 0
0x1100 0x1010 E 10
0x1140 0x1110 E 11
0x1240 0x1150 E 11
0x1240 0x1150 X 12
0x1140 0x1110 X 12
0x1100 0x1010 X 13
0x1100 0x1018 E 20
0x1140 0x1110 E 21
0x1140 0x1110 X 22
0x1100 0x1018 X 23
0x1100 0x1020 E 30
0x1140 0x1110 E 31
0x1140 0x1110 X 32
0x1100 0x1020 X 33
0x1180 0x1030 E 40
0x11c0 0x1190 E 41
0x1200 0x11d0 E 42
0x1140 0x1210 E 43
0x1140 0x1210 X 44
0x1240 0x1218 E 45
0x1240 0x1218 X 46
0x1200 0x11d0 X 47
0x11c0 0x1190 X 48
0x1180 0x1030 X 49
0x1000 (nil) X 100
";

fn unreduced() -> CallGraph {
    let table = SymbolTable::from_dumps(DEBUG_LINE, SYMBOLS).unwrap();
    build_call_graph(table, TRACE).unwrap()
}

fn reduced(sensitivity: Sensitivity) -> CallGraph {
    let mut graph = unreduced();
    reduce(&mut graph, sensitivity);
    graph
}

#[test]
fn test_unreduced_shape() {
    let graph = unreduced();

    assert_eq!(graph.len(), 11);
    assert_eq!(graph.root().unwrap().visit_order, 1);
    assert_eq!(graph.symbols().get(0x1100).unwrap().call_count, 3);
    assert_eq!(graph.symbols().get(0x1140).unwrap().call_count, 4);
    assert_eq!(graph.node(0x1110).unwrap().incoming().len(), 3);
}

#[test]
fn test_edge_symmetry_at_every_level() {
    for sensitivity in [Sensitivity::Full, Sensitivity::Merged, Sensitivity::Linked] {
        let graph = reduced(sensitivity);
        assert_eq!(graph.asymmetric_edges(), Vec::new(), "level {}", sensitivity);
    }
}

#[test]
fn test_level_zero_is_a_no_op() {
    assert_eq!(reduced(Sensitivity::Full).shape(), unreduced().shape());
}

#[test]
fn test_level_two_equals_level_one_then_link() {
    let mut stepwise = reduced(Sensitivity::Merged);
    link_pass(&mut stepwise);

    assert_eq!(reduced(Sensitivity::Linked).shape(), stepwise.shape());
}

#[test]
fn test_call_counts_conserved() {
    let before = unreduced().symbols().total_calls();
    for sensitivity in [Sensitivity::Merged, Sensitivity::Linked] {
        assert_eq!(reduced(sensitivity).symbols().total_calls(), before);
    }
}

#[test]
fn test_merge_pass_idempotent() {
    let mut graph = reduced(Sensitivity::Merged);
    let once = graph.shape();

    let report = merge_pass(&mut graph);

    assert_eq!(report.merged_groups, 0);
    assert_eq!(graph.shape(), once);
}

#[test]
fn test_merge_order_independent() {
    let graph = unreduced();
    let groups = collect_merge_groups(&graph);

    let mut forward = graph.clone();
    apply_merge_groups(&mut forward, groups.clone());
    let mut backward = graph.clone();
    apply_merge_groups(&mut backward, groups.into_iter().rev().collect());

    assert_eq!(forward.shape(), backward.shape());
}

#[test]
fn test_merge_scenario() {
    let graph = reduced(Sensitivity::Merged);

    let merged = graph.node(0x1010).unwrap();
    assert!(matches!(merged.kind, NodeKind::Merged { .. }));
    assert_eq!(merged.members().len(), 3);
    assert!(!graph.contains(0x1018));
    assert!(!graph.contains(0x1020));

    // g#0x1110 now has exactly one incoming edge, from the merged node
    let g = graph.node(0x1110).unwrap();
    assert_eq!(g.incoming().iter().copied().collect::<Vec<_>>(), vec![0x1010]);
    // and the former predecessor points at the merged node
    assert!(graph.root().unwrap().outgoing().contains(&0x1010));
    assert_eq!(graph.label(0x1010).unwrap(), "src/lib/f(3)#Merged");
}

#[test]
fn test_link_scenario() {
    let graph = reduced(Sensitivity::Linked);

    // main -> wrap -> inner -> leaf -> {g, other}: wrap and inner collapse
    let chain = graph.node(0x1030).unwrap();
    assert!(matches!(chain.kind, NodeKind::Linked { .. }));
    let members: Vec<_> = chain.members().iter().map(|m| m.key()).collect();
    assert_eq!(members, vec![0x1030, 0x1190]);
    assert_eq!(chain.sole_predecessor(), Some(ROOT_KEY));
    assert_eq!(chain.sole_successor(), Some(0x11d0));
    assert_eq!(graph.label(0x1030).unwrap(), "src/lib/wrap(1)#Linked");

    let leaf = graph.node(0x11d0).unwrap();
    assert!(leaf.is_simple());
    assert_eq!(leaf.outgoing().len(), 2);
}

#[test]
fn test_linked_chain_can_hold_a_merged_node() {
    let graph = reduced(Sensitivity::Linked);

    // main -> f(merged) -> g#0x1110 -> other#0x1150
    let chain = graph.node(0x1010).unwrap();
    assert!(matches!(chain.kind, NodeKind::Linked { .. }));
    let kinds: Vec<_> = chain.members().iter().map(|m| m.kind.name()).collect();
    assert_eq!(kinds, vec!["merged", "simple"]);
    assert_eq!(chain.members()[0].members().len(), 3);
    assert_eq!(chain.sole_successor(), Some(0x1150));
    assert!(!graph.contains(0x1110));
}

#[test]
fn test_reduction_report_counts() {
    let mut graph = unreduced();
    let report = reduce(&mut graph, Sensitivity::Linked);

    assert_eq!(report.nodes_before, 11);
    assert_eq!(report.nodes_after, graph.len());
    assert_eq!(report.merged_groups, 1);
    assert_eq!(report.linked_chains, 2);
}
