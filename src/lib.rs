//! Callgraph Studio
//!
//! Dynamic call graph reconstruction and context-sensitivity reduction
//! for binaries built with `-finstrument-functions`.
//!
//! This crate provides the core implementation for the `callgraph` CLI
//! tool: symbol resolution from `objdump` text dumps, trace replay into an
//! exact per-call-site graph, merge and link reduction passes, coverage and
//! frequency queries, and JSON/DOT export.
//!
//! ## Getting Started
//!
//! ```bash
//! objdump -WL a.out > debug_line.objdump
//! objdump -t a.out > symbols.objdump
//! ./a.out   # writes finstrument.txt through the instrumentation shim
//! callgraph analyze --level 2 --dot graph.dot --summary
//! ```

pub mod commands;
pub mod graph;
pub mod output;
pub mod parser;
pub mod reduce;
pub mod stats;
pub mod symbols;
pub mod utils;
