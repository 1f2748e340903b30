//! Static symbol information for the instrumented binary.
//!
//! This module handles:
//! - Parsing the decoded debug-line dump into per-source address ranges
//! - Parsing the symbol-table dump into function symbols
//! - Resolving an address to its owning source file or enclosing function

pub mod symbol;
pub mod table;

// Re-export main types
pub use symbol::{Symbol, SymbolScope};
pub use table::{AddressRange, SymbolTable};
