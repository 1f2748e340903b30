//! Instrumentation trace parsing.
//!
//! This module handles:
//! - Tokenizing `address call_site flag timestamp` lines
//! - Decoding hex addresses and decimal timestamps
//! - Reporting malformed lines with their line number

pub mod trace;

// Re-export main types
pub use trace::{parse_address, parse_trace, parse_trace_line, EventFlag, TraceEvent};
