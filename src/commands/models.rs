use crate::output::DotConfig;
use crate::reduce::Sensitivity;
use crate::utils::config::{
    DEFAULT_DEBUG_LINE_FILE, DEFAULT_FREQUENCY_STEP, DEFAULT_SYMBOLS_FILE, DEFAULT_TRACE_FILE,
};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Decoded debug-line dump (`objdump -WL`)
    pub debug_line: PathBuf,

    /// Symbol-table dump (`objdump -t`)
    pub symbols: PathBuf,

    /// Instrumentation trace
    pub trace: PathBuf,

    /// Reduction level
    pub sensitivity: Sensitivity,

    /// Output path for JSON profile
    pub output_json: PathBuf,

    /// Output path for DOT graph (optional)
    pub output_dot: Option<PathBuf>,

    /// DOT configuration
    pub dot_config: Option<DotConfig>,

    /// Number of call-frequency buckets
    pub frequency_step: usize,

    /// Number of hottest nodes kept in the summary
    pub top_nodes: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            debug_line: PathBuf::from(DEFAULT_DEBUG_LINE_FILE),
            symbols: PathBuf::from(DEFAULT_SYMBOLS_FILE),
            trace: PathBuf::from(DEFAULT_TRACE_FILE),
            sensitivity: Sensitivity::Full,
            output_json: PathBuf::from("profile.json"),
            output_dot: None,
            dot_config: None,
            frequency_step: DEFAULT_FREQUENCY_STEP,
            top_nodes: 20,
            print_summary: false,
        }
    }
}
