//! Symbol table built from `objdump -WL` and `objdump -t` text dumps.
//!
//! Address ranges must be loaded before symbols: a symbol's source prefix
//! is resolved against the ranges at the moment it is inserted.

use super::symbol::{Symbol, SymbolScope};
use crate::utils::config::{FUNCTION_KIND, SYMBOL_ROW_TOKENS, TEXT_SECTION, UNKNOWN_PREFIX};
use crate::utils::error::ResolutionError;
use log::{debug, warn};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

/// Half-open address range `[start, end)` covered by one compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u64,
    pub end: u64,
}

impl AddressRange {
    pub fn contains(&self, address: u64) -> bool {
        self.start <= address && address < self.end
    }
}

/// Mapping from entry address to function symbol, plus source ranges
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Source ranges in registration order; lookup is first-match
    ranges: Vec<(String, AddressRange)>,
    symbols: BTreeMap<u64, Symbol>,
    next_ordinal: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from both dump texts, in the required order
    pub fn from_dumps(debug_line: &str, symbols: &str) -> Result<Self, ResolutionError> {
        let mut table = Self::new();
        table.load_debug_lines(debug_line);
        table.load_symbols(symbols)?;
        Ok(table)
    }

    /// Read both dumps from disk and build a table
    pub fn from_files(
        debug_line_path: impl AsRef<Path>,
        symbols_path: impl AsRef<Path>,
    ) -> Result<Self, ResolutionError> {
        let debug_line = read_dump(debug_line_path.as_ref())?;
        let symbols = read_dump(symbols_path.as_ref())?;
        Self::from_dumps(&debug_line, &symbols)
    }

    /// Parse a decoded debug-line dump and register one range per unit
    ///
    /// Returns the number of ranges registered.
    pub fn load_debug_lines(&mut self, text: &str) -> usize {
        let mut registered = 0;
        let mut current: Option<UnitBuilder> = None;

        for line in text.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(first) = tokens.first() else {
                continue;
            };

            if first.starts_with("CU:") {
                if let Some(unit) = current.take() {
                    registered += self.register_unit(unit);
                }
                current = unit_name(&tokens).map(UnitBuilder::new);
                continue;
            }

            if let (Some(unit), Some(address)) = (current.as_mut(), row_address(&tokens)) {
                unit.observe(address);
            }
        }

        if let Some(unit) = current.take() {
            registered += self.register_unit(unit);
        }

        debug!("Registered {} source address ranges", registered);
        registered
    }

    fn register_unit(&mut self, unit: UnitBuilder) -> usize {
        match unit.range {
            Some(range) => {
                if self.ranges.iter().any(|(_, r)| overlaps(r, &range)) {
                    warn!(
                        "Address range of {} overlaps an earlier unit; earlier unit wins",
                        unit.name
                    );
                }
                debug!("{}: [{:#x}, {:#x})", unit.name, range.start, range.end);
                self.ranges.push((unit.name, range));
                1
            }
            None => {
                warn!("Compilation unit {} has no address rows, skipping", unit.name);
                0
            }
        }
    }

    /// Parse a symbol-table dump, keeping `.text` function symbols
    ///
    /// Returns the number of symbols inserted.
    ///
    /// # Errors
    /// * `ResolutionError::RangesNotLoaded` - no debug-line ranges are known yet
    pub fn load_symbols(&mut self, text: &str) -> Result<usize, ResolutionError> {
        if self.ranges.is_empty() {
            return Err(ResolutionError::RangesNotLoaded);
        }

        let mut inserted = 0;
        for line in text.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != SYMBOL_ROW_TOKENS
                || tokens[2] != FUNCTION_KIND
                || tokens[3] != TEXT_SECTION
            {
                continue;
            }

            let (Some(address), Some(size)) = (parse_hex(tokens[0]), parse_hex(tokens[4])) else {
                debug!("Skipping symbol row with bad numbers: {}", line.trim());
                continue;
            };

            if self.insert(address, size, tokens[1], tokens[3], tokens[5]) {
                inserted += 1;
            }
        }

        debug!("Loaded {} function symbols", inserted);
        Ok(inserted)
    }

    fn insert(&mut self, address: u64, size: u64, scope: &str, section: &str, name: &str) -> bool {
        let source_prefix = self.find_prefix(address).to_string();
        match self.symbols.entry(address) {
            Entry::Occupied(existing) => {
                debug!(
                    "Address {:#x} already belongs to {}, ignoring alias {}",
                    address,
                    existing.get().name,
                    name
                );
                false
            }
            Entry::Vacant(slot) => {
                let ordinal = self.next_ordinal;
                self.next_ordinal += 1;
                slot.insert(Symbol {
                    address,
                    size,
                    scope: SymbolScope::from_flag(scope),
                    section: section.to_string(),
                    source_prefix,
                    name: name.to_string(),
                    ordinal,
                    call_count: 0,
                });
                true
            }
        }
    }

    /// Name of the compilation unit covering `address`, or `Unknown`
    pub fn find_prefix(&self, address: u64) -> &str {
        self.ranges
            .iter()
            .find(|(_, range)| range.contains(address))
            .map(|(name, _)| name.as_str())
            .unwrap_or(UNKNOWN_PREFIX)
    }

    /// Function whose body contains `address`
    ///
    /// Walks down from the nearest entry at or below `address`, so a body
    /// that encloses a shorter symbol is still found past that symbol's end.
    pub fn find_caller(&self, address: u64) -> Option<&Symbol> {
        self.symbols
            .range(..=address)
            .rev()
            .map(|(_, symbol)| symbol)
            .find(|symbol| symbol.contains(address))
    }

    pub fn get(&self, address: u64) -> Option<&Symbol> {
        self.symbols.get(&address)
    }

    /// Count one entry into the function at `address`
    pub fn record_call(&mut self, address: u64) {
        if let Some(symbol) = self.symbols.get_mut(&address) {
            symbol.call_count += 1;
        }
    }

    pub fn ranges(&self) -> impl Iterator<Item = (&str, AddressRange)> {
        self.ranges.iter().map(|(name, range)| (name.as_str(), *range))
    }

    /// Symbols in address order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn total_calls(&self) -> u64 {
        self.symbols.values().map(|s| s.call_count).sum()
    }
}

/// Accumulates the address span of one compilation unit
struct UnitBuilder {
    name: String,
    range: Option<AddressRange>,
}

impl UnitBuilder {
    fn new(name: String) -> Self {
        Self { name, range: None }
    }

    fn observe(&mut self, address: u64) {
        self.range = Some(match self.range {
            None => AddressRange {
                start: address,
                end: address,
            },
            Some(r) => AddressRange {
                start: r.start.min(address),
                end: r.end.max(address),
            },
        });
    }
}

fn read_dump(path: &Path) -> Result<String, ResolutionError> {
    debug!("Reading dump: {}", path.display());
    std::fs::read_to_string(path).map_err(|source| ResolutionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `CU: ./test/example.c:` -> `test/example`
fn unit_name(tokens: &[&str]) -> Option<String> {
    // Some objdump builds glue the name onto the marker: `CU:./a.c:`
    let raw = match tokens.first()?.strip_prefix("CU:") {
        Some(glued) if !glued.is_empty() => glued,
        _ => *tokens.get(1)?,
    };
    let path = raw.trim_end_matches(':');
    let path = path.strip_prefix("./").unwrap_or(path);

    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    let stem = match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    };
    Some(stem.to_string())
}

/// The fixed address column (third token) of a line-table row
fn row_address(tokens: &[&str]) -> Option<u64> {
    tokens
        .get(2)
        .and_then(|t| t.strip_prefix("0x"))
        .and_then(|h| u64::from_str_radix(h, 16).ok())
}

fn parse_hex(token: &str) -> Option<u64> {
    let digits = token.strip_prefix("0x").unwrap_or(token);
    u64::from_str_radix(digits, 16).ok()
}

fn overlaps(a: &AddressRange, b: &AddressRange) -> bool {
    a.start < b.end && b.start < a.end
}
