//! A single function symbol from the symbol-table dump.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Linkage scope of a symbol (`l` in the dump is local, anything else global)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolScope {
    Local,
    Global,
}

impl SymbolScope {
    pub fn from_flag(flag: &str) -> Self {
        if flag == "l" {
            Self::Local
        } else {
            Self::Global
        }
    }
}

/// A statically known function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Entry address
    pub address: u64,

    /// Length of the function body in bytes
    pub size: u64,

    pub scope: SymbolScope,

    pub section: String,

    /// Owning source file (without extension), or `Unknown`
    pub source_prefix: String,

    pub name: String,

    /// Allocation order within the owning table, used for stable coloring
    pub ordinal: usize,

    /// Number of times this function was entered in the trace
    pub call_count: u64,
}

impl Symbol {
    /// Whether `address` lies inside this function, both ends inclusive
    pub fn contains(&self, address: u64) -> bool {
        self.address <= address && address <= self.address.saturating_add(self.size)
    }

    pub fn is_called(&self) -> bool {
        self.call_count > 0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source_prefix, self.name)
    }
}
