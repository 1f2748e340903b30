//! Rebuild the exact call graph by replaying a trace against a call stack.
//!
//! Nodes are keyed by call site, not by invocation: every enter at the same
//! call site lands on the same node. `call_count` on the symbol counts
//! invocations, while a node's timing reflects the most recent invocation.

use super::call_graph::{CallGraph, ROOT_KEY};
use super::node::NodeKey;
use crate::parser::{parse_trace, EventFlag, TraceEvent};
use crate::symbols::SymbolTable;
use crate::utils::error::TraceError;
use log::{debug, info, warn};
use std::path::Path;

/// Build the unreduced call graph from trace text
///
/// **Public** - main entry point for reconstruction
///
/// # Errors
/// * `TraceError::Empty` - no events at all
/// * `TraceError::Format` - malformed line
/// * `TraceError::Underflow` - exit with an empty stack
/// * `TraceError::UnknownSymbol` - enter into an address with no function symbol
pub fn build_call_graph(symbols: SymbolTable, trace: &str) -> Result<CallGraph, TraceError> {
    let mut events = parse_trace(trace);
    let first = events.next().ok_or(TraceError::Empty)??;

    let mut builder = Builder::start(symbols, first)?;
    for event in events {
        builder.apply(event?)?;
    }

    let graph = builder.finish();
    info!(
        "Reconstructed call graph: {} nodes, {} edges",
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Read a trace file and build the unreduced call graph
pub fn build_call_graph_from_file(
    symbols: SymbolTable,
    trace_path: impl AsRef<Path>,
) -> Result<CallGraph, TraceError> {
    let path = trace_path.as_ref();
    debug!("Reading trace: {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    build_call_graph(symbols, &text)
}

/// Replay state: the graph under construction and the active call stack
struct Builder {
    graph: CallGraph,
    stack: Vec<NodeKey>,
    next_order: u32,
}

impl Builder {
    /// The first event is the process entry, whatever callers it reports
    fn start(symbols: SymbolTable, first: TraceEvent) -> Result<Self, TraceError> {
        if first.flag == EventFlag::Exit {
            return Err(TraceError::Underflow { line: first.line });
        }
        if symbols.get(first.address).is_none() {
            return Err(TraceError::UnknownSymbol {
                line: first.line,
                address: first.address,
            });
        }

        let mut graph = CallGraph::new(symbols);
        let root = graph.add_node(first.address, ROOT_KEY);
        root.start_time = first.timestamp;
        root.visit_order = 1;
        graph.symbols_mut().record_call(first.address);

        Ok(Self {
            graph,
            stack: vec![ROOT_KEY],
            next_order: 2,
        })
    }

    fn apply(&mut self, event: TraceEvent) -> Result<(), TraceError> {
        match event.flag {
            EventFlag::Enter => self.enter(event),
            EventFlag::Exit => self.exit(event),
        }
    }

    fn enter(&mut self, event: TraceEvent) -> Result<(), TraceError> {
        if self.graph.symbols().get(event.address).is_none() {
            return Err(TraceError::UnknownSymbol {
                line: event.line,
                address: event.address,
            });
        }

        let caller = match self.stack.last() {
            Some(key) => *key,
            None => {
                warn!(
                    "Line {}: enter at {:#x} after the entry function returned, attaching to root",
                    event.line, event.address
                );
                ROOT_KEY
            }
        };

        let node = self.graph.add_node(event.address, event.call_site);
        if node.symbol != event.address {
            // Indirect call site reaching a different target; the node keeps its first symbol
            debug!(
                "Line {}: call site {:#x} already bound to {:#x}, entered {:#x}",
                event.line, event.call_site, node.symbol, event.address
            );
        }
        if node.visit_order == 0 {
            node.visit_order = self.next_order;
            self.next_order += 1;
        }
        node.start_time = event.timestamp;
        let key = node.key();

        self.graph.symbols_mut().record_call(event.address);
        self.graph.link(caller, key);
        self.stack.push(key);
        Ok(())
    }

    fn exit(&mut self, event: TraceEvent) -> Result<(), TraceError> {
        let key = self
            .stack
            .pop()
            .ok_or(TraceError::Underflow { line: event.line })?;
        if let Some(node) = self.graph.node_mut(key) {
            node.end_time = event.timestamp;
        }
        Ok(())
    }

    fn finish(self) -> CallGraph {
        if !self.stack.is_empty() {
            debug!(
                "{} calls still active at end of trace, leaving their end time unset",
                self.stack.len()
            );
        }
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBUG_LINE: &str = "CU: ./a.c:\nhdr\na.c 1 0x100\na.c - 0x200\n";
    const SYMBOLS: &str = "\
0000000000000100 g     F .text  0000000000000020 main
0000000000000140 g     F .text  0000000000000020 work
0000000000000180 g     F .text  0000000000000020 leaf
00000000000001c0 g     F .text  0000000000000020 unused
";

    fn table() -> SymbolTable {
        SymbolTable::from_dumps(DEBUG_LINE, SYMBOLS).unwrap()
    }

    #[test]
    fn test_simple_trace() {
        let trace = "\
0x100 (nil) E 1000
0x140 0x110 E 1100
0x180 0x150 E 1200
0x180 0x150 X 1300
0x140 0x110 X 1400
0x100 (nil) X 2000
";
        let graph = build_call_graph(table(), trace).unwrap();

        assert_eq!(graph.len(), 3);
        let root = graph.root().unwrap();
        assert_eq!(root.visit_order, 1);
        assert_eq!(root.elapsed(), 1000);
        assert_eq!(graph.node(0x110).unwrap().visit_order, 2);
        assert_eq!(graph.node(0x150).unwrap().visit_order, 3);
        assert!(graph.root().unwrap().outgoing().contains(&0x110));
        assert!(graph.node(0x150).unwrap().incoming().contains(&0x110));
        assert_eq!(graph.self_time(0x110), Some(200));
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_repeated_call_site_reuses_node() {
        let trace = "\
0x100 0x0 E 0
0x140 0x110 E 10
0x140 0x110 X 20
0x140 0x110 E 30
0x140 0x110 X 45
0x100 0x0 X 50
";
        let graph = build_call_graph(table(), trace).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.symbols().get(0x140).unwrap().call_count, 2);
        assert_eq!(graph.symbols().get(0x100).unwrap().call_count, 1);
        let node = graph.node(0x110).unwrap();
        assert_eq!(node.visit_order, 2);
        assert_eq!((node.start_time, node.end_time), (30, 45));
    }

    #[test]
    fn test_empty_trace() {
        assert!(matches!(
            build_call_graph(table(), "\n\n"),
            Err(TraceError::Empty)
        ));
    }

    #[test]
    fn test_exit_on_first_line_underflows() {
        let result = build_call_graph(table(), "0x100 0x0 X 0\n");
        assert!(matches!(result, Err(TraceError::Underflow { line: 1 })));
    }

    #[test]
    fn test_exit_after_root_returned_underflows() {
        let trace = "0x100 0x0 E 0\n0x100 0x0 X 5\n0x140 0x110 X 6\n";
        let result = build_call_graph(table(), trace);
        assert!(matches!(result, Err(TraceError::Underflow { line: 3 })));
    }

    #[test]
    fn test_malformed_line_aborts() {
        let trace = "0x100 0x0 E 0\n0x140 0x110 E\n";
        let result = build_call_graph(table(), trace);
        assert!(matches!(result, Err(TraceError::Format { line: 2, .. })));
    }

    #[test]
    fn test_unknown_address() {
        let trace = "0x100 0x0 E 0\n0x999 0x110 E 1\n";
        let result = build_call_graph(table(), trace);
        assert!(matches!(
            result,
            Err(TraceError::UnknownSymbol { line: 2, address: 0x999 })
        ));
    }

    #[test]
    fn test_enter_after_root_exit_attaches_to_root() {
        let trace = "0x100 0x0 E 0\n0x100 0x0 X 5\n0x180 0x1d0 E 6\n0x180 0x1d0 X 7\n";
        let graph = build_call_graph(table(), trace).unwrap();
        assert!(graph.root().unwrap().outgoing().contains(&0x1d0));
    }

    #[test]
    fn test_missing_file() {
        let result = build_call_graph_from_file(table(), "/nonexistent/finstrument.txt");
        assert!(matches!(result, Err(TraceError::Io { .. })));
    }
}
