//! Graphviz DOT output.
//!
//! The DOT text is the hand-off format for an external renderer; this crate
//! never produces images itself.

use super::render::RenderGraph;
use super::{create_parent_dirs, validate_output_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// DOT rendering configuration
#[derive(Debug, Clone)]
pub struct DotConfig {
    pub title: String,
    pub font: String,
    pub shape: String,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            title: "Call Graph".to_string(),
            font: "NanumSquare".to_string(),
            shape: "box".to_string(),
        }
    }
}

impl DotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }
}

/// Generate DOT text for a render graph
///
/// **Public** - main entry point for DOT generation
///
/// # Arguments
/// * `graph` - Render model
/// * `config` - Optional configuration (uses defaults if None)
///
/// # Returns
/// A strict digraph with one filled box per node. Pen width is the visual
/// weight; aggregates carry a `Merged Node`/`Linked Node` xlabel; edges are
/// labelled with the successor's visit order.
pub fn generate_dot(graph: &RenderGraph, config: Option<&DotConfig>) -> String {
    let default_config = DotConfig::default();
    let config = config.unwrap_or(&default_config);

    info!(
        "Generating DOT graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );

    let mut out = String::new();
    out.push_str(&format!("strict digraph \"{}\" {{\n", escape(&config.title)));
    out.push_str("    ordering=out;\n");
    out.push_str("    compound=true;\n");
    out.push_str(&format!("    label=\"{}\";\n", escape(&config.title)));

    for node in &graph.nodes {
        let xlabel = match node.kind.as_str() {
            "merged" => "Merged Node",
            "linked" => "Linked Node",
            _ => "",
        };
        out.push_str(&format!(
            "    n{} [label=\"{}\", xlabel=\"{}\", fontname=\"{}\", width=2, height=1, shape={}, penwidth={}, color=\"#ff0000\", style=filled, fillcolor=\"{}\"];\n",
            node.key,
            escape(&node.label),
            xlabel,
            escape(&config.font),
            config.shape,
            node.weight,
            node.color
        ));
    }

    for edge in &graph.edges {
        out.push_str(&format!(
            "    n{} -> n{} [label=\"{}\"];\n",
            edge.from, edge.to, edge.label
        ));
    }

    out.push_str("}\n");
    debug!("DOT graph generated: {} bytes", out.len());
    out
}

/// Write DOT content to a file
///
/// **Public** - main entry point for DOT output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_dot(dot_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing DOT to: {}", output_path.display());

    validate_output_path(output_path)?;
    if let Some(ext) = output_path.extension() {
        if ext != "dot" && ext != "gv" {
            debug!("File does not have a .dot extension: {}", output_path.display());
        }
    }
    create_parent_dirs(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(dot_content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!("DOT written successfully ({} bytes)", dot_content.len());
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
