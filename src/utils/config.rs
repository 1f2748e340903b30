//! Configuration and constants for the CLI.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Default file names produced by `objdump -t`, `objdump -WL` and the
// instrumentation shim.
pub const DEFAULT_SYMBOLS_FILE: &str = "symbols.objdump";
pub const DEFAULT_DEBUG_LINE_FILE: &str = "debug_line.objdump";
pub const DEFAULT_TRACE_FILE: &str = "finstrument.txt";

/// Source prefix for symbols outside every known compilation unit
pub const UNKNOWN_PREFIX: &str = "Unknown";

/// Number of frequency buckets used for visual weighting
pub const DEFAULT_FREQUENCY_STEP: usize = 10;

/// Symbol table row filters (`address scope kind section size name`)
pub const SYMBOL_ROW_TOKENS: usize = 6;
pub const FUNCTION_KIND: &str = "F";
pub const TEXT_SECTION: &str = ".text";

/// Fill colors, indexed by symbol ordinal modulo the table length
pub const COLOR_TABLE: [&str; 16] = [
    "#fc0303", "#fca103", "#fcfc03", "#8cfc03",
    "#14fc03", "#03fcad", "#03fcf8", "#03c6fc",
    "#0356fc", "#4e03fc", "#ad03fc", "#fc03f4",
    "#fc0398", "#fc0339", "#b1fc03", "#613387",
];

/// Look up the fill color for a color index
pub fn color_for(index: usize) -> &'static str {
    COLOR_TABLE[index % COLOR_TABLE.len()]
}
