//! DIN Render - Interactive HTML view of a taxonomy tree
//!
//! Reads the JSON tree written by the extractor, validates its shape and
//! writes one self-contained HTML page. The page loads D3 from a CDN and
//! carries the tree in an inline JSON data block.
//!
//! Author: hephaex@gmail.com

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use din_core::{write_atomic, RenderConfig, Result, TaxonomyError, TaxonomyNode, TreeStats};

pub mod template;

pub use template::{embedded_tree, escape_html, PageContext};

/// Outcome of a render run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    /// Shape of the rendered tree
    pub stats: TreeStats,
    /// Size of the written page
    pub bytes: usize,
}

/// Renders taxonomy trees as HTML pages
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a renderer
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render `in_json` and write the page to `out_html`.
    ///
    /// Nothing is written unless the input is a valid tree.
    pub fn run(&self, in_json: &Path, out_html: &Path) -> Result<RenderSummary> {
        let (value, tree) = load_tree(in_json)?;
        let html = self.render(&value, &tree)?;
        write_atomic(out_html, html.as_bytes())?;

        let summary = RenderSummary {
            stats: tree.stats(),
            bytes: html.len(),
        };
        tracing::info!(
            path = %out_html.display(),
            nodes = summary.stats.node_count,
            bytes = summary.bytes,
            "wrote taxonomy HTML"
        );
        Ok(summary)
    }

    /// Render an already validated tree. `value` is embedded as given.
    pub fn render(&self, value: &Value, tree: &TaxonomyNode) -> Result<String> {
        let summary = page_summary(&tree.stats());
        let ctx = PageContext {
            title: &self.config.title,
            d3_url: &self.config.d3_url,
            summary: &summary,
            initial_depth: self.config.initial_depth,
            tree: value,
        };

        template::render_page(&ctx).map_err(|e| TaxonomyError::Other(e.into()))
    }
}

/// Header line shown above the chart
pub fn page_summary(stats: &TreeStats) -> String {
    format!(
        "{} nodes, {} levels deep, {} top-level classes",
        stats.node_count, stats.max_depth, stats.top_level_count
    )
}

/// Read and validate a tree file
pub fn load_tree(path: &Path) -> Result<(Value, TaxonomyNode)> {
    let location = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|e| {
        let reason = match e.kind() {
            std::io::ErrorKind::NotFound => "file does not exist".to_string(),
            _ => e.to_string(),
        };
        TaxonomyError::source_unavailable(&location, reason)
    })?;

    parse_tree(&json, &location)
}

/// Parse and validate tree JSON.
///
/// Returns the raw value alongside the typed tree so the page embeds
/// exactly what was read.
pub fn parse_tree(json: &str, location: &str) -> Result<(Value, TaxonomyNode)> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| TaxonomyError::malformed_tree(location, e))?;

    check_shape(&value, "$").map_err(|reason| TaxonomyError::malformed_tree(location, reason))?;

    let tree =
        TaxonomyNode::deserialize(&value).map_err(|e| TaxonomyError::malformed_tree(location, e))?;
    tree.validate()
        .map_err(|reason| TaxonomyError::malformed_tree(location, reason))?;

    tracing::debug!(location, nodes = tree.stats().node_count, "tree validated");
    Ok((value, tree))
}

/// Walk the value and report the first node not shaped like a tree node
fn check_shape(value: &Value, path: &str) -> std::result::Result<(), String> {
    let node = value
        .as_object()
        .ok_or_else(|| format!("{path} is not an object"))?;

    for key in ["id", "label"] {
        match node.get(key) {
            Some(Value::String(_)) => {}
            Some(_) => return Err(format!("{path}.{key} is not a string")),
            None => return Err(format!("{path} missing `{key}`")),
        }
    }

    for key in ["raw_fragment", "level_number", "level_type"] {
        match node.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(_) => return Err(format!("{path}.{key} is not a string")),
        }
    }

    let children = match node.get("children") {
        Some(Value::Array(children)) => children,
        Some(_) => return Err(format!("{path}.children is not an array")),
        None => return Err(format!("{path} missing `children`")),
    };

    children
        .iter()
        .enumerate()
        .try_for_each(|(i, child)| check_shape(child, &format!("{path}.children[{i}]")))
}
