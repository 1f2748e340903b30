//! Callgraph Studio CLI
//!
//! Reconstructs the dynamic call graph of an instrumented binary from its
//! symbol dumps and a function enter/exit trace, then reduces it.

use anyhow::{Context, Result};
use callgraph_studio::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_profile_file,
    AnalyzeArgs,
};
use callgraph_studio::output::DotConfig;
use callgraph_studio::reduce::Sensitivity;
use callgraph_studio::utils::config::{
    DEFAULT_DEBUG_LINE_FILE, DEFAULT_FREQUENCY_STEP, DEFAULT_SYMBOLS_FILE, DEFAULT_TRACE_FILE,
};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Callgraph Studio - call graph reconstruction for instrumented binaries
#[derive(Parser, Debug)]
#[command(name = "callgraph")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconstruct, reduce and export a call graph
    Analyze {
        /// Decoded debug-line dump (`objdump -WL`)
        #[arg(long, env = "CALLGRAPH_DEBUG_LINE", default_value = DEFAULT_DEBUG_LINE_FILE)]
        debug_line: PathBuf,

        /// Symbol-table dump (`objdump -t`)
        #[arg(long, env = "CALLGRAPH_SYMBOLS", default_value = DEFAULT_SYMBOLS_FILE)]
        symbols: PathBuf,

        /// Instrumentation trace
        #[arg(long, env = "CALLGRAPH_TRACE", default_value = DEFAULT_TRACE_FILE)]
        trace: PathBuf,

        /// Context sensitivity: 0 = per call site, 1 = merge, 2 = merge and link
        #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=2))]
        level: u8,

        /// Output path for JSON profile
        #[arg(short, long, default_value = "profile.json")]
        output: PathBuf,

        /// Output path for DOT graph (optional)
        #[arg(short, long)]
        dot: Option<PathBuf>,

        /// DOT graph title
        #[arg(long)]
        title: Option<String>,

        /// DOT node font
        #[arg(long)]
        font: Option<String>,

        /// Number of call-frequency buckets for pen widths
        #[arg(long, default_value_t = DEFAULT_FREQUENCY_STEP)]
        frequency_step: usize,

        /// Number of hottest nodes to include
        #[arg(long, default_value = "20")]
        top_nodes: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a profile JSON file
    Validate {
        /// Path to profile JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            debug_line,
            symbols,
            trace,
            level,
            output,
            dot,
            title,
            font,
            frequency_step,
            top_nodes,
            summary,
        } => {
            let sensitivity = Sensitivity::from_level(level)
                .with_context(|| format!("Unsupported sensitivity level {}", level))?;

            // Create DOT config
            let dot_config = if dot.is_some() {
                let mut config = DotConfig::new();
                if let Some(title_str) = title {
                    config = config.with_title(title_str);
                }
                if let Some(font_name) = font {
                    config = config.with_font(font_name);
                }
                Some(config)
            } else {
                None
            };

            let args = AnalyzeArgs {
                debug_line,
                symbols,
                trace,
                sensitivity,
                output_json: output,
                output_dot: dot,
                dot_config,
                frequency_step,
                top_nodes,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
