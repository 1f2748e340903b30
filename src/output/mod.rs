//! Output writers for analysis results.
//!
//! This module handles:
//! - The render model handed to external renderers
//! - JSON profiles (write and read back)
//! - DOT graph text
//! - Terminal text summaries

pub mod dot;
pub mod json;
pub mod render;
pub mod schema;
pub mod summary;

// Re-export main functions
pub use dot::{generate_dot, write_dot, DotConfig};
pub use json::{profile_to_string, read_profile, write_profile};
pub use render::{RenderEdge, RenderGraph, RenderNode};
pub use schema::{to_profile, GraphProfile};
pub use summary::generate_text_summary;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Reject empty paths and existing directories
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn create_parent_dirs(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
