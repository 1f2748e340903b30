//! Dynamic call graph: node variants, the arena, and trace reconstruction.

pub mod builder;
pub mod call_graph;
pub mod node;

// Re-export main types and functions
pub use builder::{build_call_graph, build_call_graph_from_file};
pub use call_graph::{CallGraph, GraphShape, ROOT_KEY};
pub use node::{CallGraphNode, NodeKey, NodeKind};
