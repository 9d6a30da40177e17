//! Extraction statistics
//!
//! Counts reported after a run. They are logged and printed, never written
//! into the JSON tree.

use serde::{Deserialize, Serialize};

use din_core::TaxonomyNode;
use din_parser::OwlDocument;

use crate::hierarchy::Hierarchy;

/// Summary of one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Triples read from the source
    pub triple_count: usize,
    /// Distinct `owl:Class` declarations
    pub class_count: usize,
    /// Declared in-taxonomy subclass links
    pub edge_count: usize,
    /// Links kept in the tree
    pub tree_edge_count: usize,
    /// Superclass links pointing outside the taxonomy
    pub external_link_count: usize,
    /// Classes reduced to their first declared superclass
    pub multi_parent_count: usize,
    /// Classes directly below the synthetic root
    pub top_level_count: usize,
    /// Longest path below the root
    pub max_depth: usize,
    /// Classes with a DIN level number
    pub leveled_count: usize,
}

impl ExtractionStats {
    /// Collect statistics from the pipeline stages
    pub fn collect(doc: &OwlDocument, hierarchy: &Hierarchy, tree: &TaxonomyNode) -> Self {
        let shape = tree.stats();
        Self {
            triple_count: doc.triple_count,
            class_count: doc.len(),
            edge_count: hierarchy.declared_edge_count(),
            tree_edge_count: hierarchy.tree_edge_count(),
            external_link_count: doc.external_links,
            multi_parent_count: hierarchy.multi_parent().len(),
            top_level_count: shape.top_level_count,
            max_depth: shape.max_depth,
            leveled_count: doc.classes().iter().filter(|c| c.level.is_some()).count(),
        }
    }

    /// Share of classes carrying a DIN level number (0.0 - 1.0)
    pub fn level_coverage(&self) -> f32 {
        if self.class_count == 0 {
            0.0
        } else {
            self.leveled_count as f32 / self.class_count as f32
        }
    }
}

impl std::fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "node_count={}", self.class_count)?;
        writeln!(f, "edge_count={}", self.edge_count)?;
        writeln!(f, "tree_edge_count={}", self.tree_edge_count)?;
        writeln!(f, "multi_parent_count={}", self.multi_parent_count)?;
        writeln!(f, "external_link_count={}", self.external_link_count)?;
        writeln!(f, "leveled_count={}", self.leveled_count)?;
        writeln!(f, "roots={}", self.top_level_count)?;
        write!(f, "max_depth={}", self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;
    use din_core::OntologyClass;

    #[test]
    fn test_collect() {
        let ns = "http://example.org/din#";
        let doc = OwlDocument::from_classes(vec![
            OntologyClass::new(format!("{ns}Fertigungsverfahren")),
            OntologyClass::new(format!("{ns}Trennen"))
                .with_superclass(format!("{ns}Fertigungsverfahren"))
                .with_comment("Hauptgruppe 3"),
            OntologyClass::new(format!("{ns}Zerteilen"))
                .with_superclass(format!("{ns}Trennen"))
                .with_superclass(format!("{ns}Fertigungsverfahren")),
        ]);
        let hierarchy = Hierarchy::resolve(&doc).unwrap();
        let tree = TreeBuilder::new(&doc, &hierarchy).build();

        let stats = ExtractionStats::collect(&doc, &hierarchy, &tree);
        assert_eq!(stats.class_count, 3);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.tree_edge_count, 2);
        assert_eq!(stats.multi_parent_count, 1);
        assert_eq!(stats.top_level_count, 1);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.leveled_count, 1);
        assert!((stats.level_coverage() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_coverage() {
        assert_eq!(ExtractionStats::default().level_coverage(), 0.0);
    }

    #[test]
    fn test_summary_lines() {
        let stats = ExtractionStats {
            class_count: 12,
            leveled_count: 9,
            top_level_count: 1,
            ..Default::default()
        };
        let summary = stats.to_string();
        assert!(summary.starts_with("node_count=12\n"));
        assert!(summary.contains("\nleveled_count=9\n"));
        assert!(summary.contains("roots=1"));
    }
}
