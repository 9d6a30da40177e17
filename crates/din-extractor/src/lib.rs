//! DIN Extractor - Taxonomy tree extraction
//!
//! Converts parsed OWL classes into a single-rooted, acyclic taxonomy tree
//! and serializes it as JSON.
//!
//! Pipeline: load source -> parse classes -> resolve parents (first
//! declared superclass wins) -> reject cycles -> assemble and order the
//! tree -> write JSON atomically.

use std::path::Path;

use din_core::{write_atomic, ExtractConfig, Result, TaxonomyError, TaxonomyNode};
use din_parser::{OwlDocument, OwlSource};

pub mod builder;
pub mod hierarchy;
pub mod stats;

pub use builder::TreeBuilder;
pub use hierarchy::Hierarchy;
pub use stats::ExtractionStats;

/// Result of an extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The taxonomy tree
    pub tree: TaxonomyNode,
    /// Run statistics
    pub stats: ExtractionStats,
}

/// Runs the extraction step
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Create an extractor
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Load, parse and build the tree for a source
    pub async fn extract(&self, source: &OwlSource) -> Result<Extraction> {
        let doc = din_parser::load_document(source, &self.config).await?;
        self.build(&doc)
    }

    /// Build the tree for an already parsed document
    pub fn build(&self, doc: &OwlDocument) -> Result<Extraction> {
        let hierarchy = Hierarchy::resolve(doc)?;
        let tree = TreeBuilder::new(doc, &hierarchy)
            .with_root(&self.config.root_id, &self.config.root_label)
            .build();
        let stats = ExtractionStats::collect(doc, &hierarchy, &tree);

        tracing::info!(
            classes = stats.class_count,
            edges = stats.edge_count,
            leveled = stats.leveled_count,
            level_coverage = stats.level_coverage(),
            roots = stats.top_level_count,
            depth = stats.max_depth,
            "built taxonomy tree"
        );

        Ok(Extraction { tree, stats })
    }

    /// Extract `source` and write the tree to `out_json`
    pub async fn run(&self, source: &str, out_json: &Path) -> Result<Extraction> {
        let source = OwlSource::parse(source);
        let extraction = self.extract(&source).await?;
        write_json(&extraction.tree, out_json)?;

        tracing::info!(path = %out_json.display(), "wrote taxonomy JSON");
        Ok(extraction)
    }
}

/// Serialize a tree as pretty JSON with a trailing newline
pub fn to_json(tree: &TaxonomyNode) -> Result<String> {
    let mut json = serde_json::to_string_pretty(tree).map_err(|e| TaxonomyError::Other(e.into()))?;
    json.push('\n');
    Ok(json)
}

/// Write a tree to disk atomically
pub fn write_json(tree: &TaxonomyNode, path: &Path) -> Result<()> {
    write_atomic(path, to_json(tree)?.as_bytes())
}
