//! Function coverage: how many known functions the trace entered.

use crate::symbols::SymbolTable;
use serde::{Deserialize, Serialize};

/// Called versus known functions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub called: usize,
    pub total: usize,
    /// `prefix/name` of every function never entered, in address order
    pub uncalled: Vec<String>,
}

impl Coverage {
    /// Called share in percent, rounded to two decimals
    ///
    /// An empty table reports 0%.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let raw = self.called as f64 / self.total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }

    pub fn uncalled_count(&self) -> usize {
        self.total - self.called
    }
}

/// Count functions with a non-zero call count
///
/// **Public** - coverage report for a traced run
pub fn coverage(symbols: &SymbolTable) -> Coverage {
    let mut result = Coverage {
        total: symbols.len(),
        ..Coverage::default()
    };

    for symbol in symbols.iter() {
        if symbol.is_called() {
            result.called += 1;
        } else {
            result.uncalled.push(symbol.to_string());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBUG_LINE: &str = "CU: ./lib.c:\nhdr\nlib.c 1 0x100\nlib.c - 0x400\n";
    const SYMBOLS: &str = "\
0000000000000100 g     F .text  0000000000000020 a
0000000000000140 g     F .text  0000000000000020 b
0000000000000180 g     F .text  0000000000000020 c
00000000000001c0 g     F .text  0000000000000020 d
0000000000000200 g     F .text  0000000000000020 e
";

    #[test]
    fn test_three_of_five() {
        let mut table = SymbolTable::from_dumps(DEBUG_LINE, SYMBOLS).unwrap();
        for address in [0x100, 0x100, 0x140, 0x200] {
            table.record_call(address);
        }

        let result = coverage(&table);

        assert_eq!((result.called, result.total), (3, 5));
        assert_eq!(result.percentage(), 60.0);
        assert_eq!(result.uncalled, vec!["lib/c", "lib/d"]);
        assert_eq!(result.uncalled_count(), 2);
    }

    #[test]
    fn test_empty_table() {
        let result = coverage(&SymbolTable::new());
        assert_eq!(result.total, 0);
        assert_eq!(result.percentage(), 0.0);
    }

    #[test]
    fn test_rounding() {
        let result = Coverage {
            called: 1,
            total: 3,
            uncalled: Vec::new(),
        };
        assert_eq!(result.percentage(), 33.33);
    }
}
