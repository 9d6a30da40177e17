//! Tree assembly
//!
//! Hangs every class below its resolved parent and every parentless class
//! below a synthetic root. Sibling order is fixed so unchanged input always
//! yields byte-identical output.

use std::collections::HashMap;

use din_core::{level_sort_key, OntologyClass, TaxonomyNode};
use din_parser::OwlDocument;

use crate::hierarchy::Hierarchy;

/// Sibling ordering: DIN level number (numeric, missing last), then
/// lowercase label, lowercase fragment and finally the IRI.
pub fn sibling_key(class: &OntologyClass) -> (Vec<u32>, String, String, String) {
    (
        level_sort_key(class.level.as_ref().map(|l| l.number.as_str())),
        class.label.to_lowercase(),
        class.fragment.to_lowercase(),
        class.iri.clone(),
    )
}

/// Builds the output tree from a resolved hierarchy
pub struct TreeBuilder<'a> {
    doc: &'a OwlDocument,
    hierarchy: &'a Hierarchy,
    root_id: String,
    root_label: String,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder with the default synthetic root
    pub fn new(doc: &'a OwlDocument, hierarchy: &'a Hierarchy) -> Self {
        Self {
            doc,
            hierarchy,
            root_id: "urn:local:din8580:root".to_string(),
            root_label: "DIN8580".to_string(),
        }
    }

    /// Set the synthetic root identity
    pub fn with_root(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.root_id = id.into();
        self.root_label = label.into();
        self
    }

    /// Assemble the tree
    pub fn build(&self) -> TaxonomyNode {
        let mut children_of: HashMap<&str, Vec<&OntologyClass>> = HashMap::new();
        let mut top_level: Vec<&OntologyClass> = Vec::new();

        for class in self.doc.classes() {
            match self.hierarchy.parent(&class.iri) {
                Some(parent) => children_of.entry(parent).or_default().push(class),
                None => top_level.push(class),
            }
        }

        top_level.sort_by_cached_key(|c| sibling_key(c));
        for siblings in children_of.values_mut() {
            siblings.sort_by_cached_key(|c| sibling_key(c));
        }

        let mut root = TaxonomyNode::new(self.root_id.clone(), self.root_label.clone());
        root.raw_fragment = self.root_label.clone();
        root.children = top_level
            .into_iter()
            .map(|class| assemble(class, &children_of))
            .collect();

        debug_assert_eq!(root.stats().node_count, self.doc.len() + 1);
        root
    }
}

fn assemble(class: &OntologyClass, children_of: &HashMap<&str, Vec<&OntologyClass>>) -> TaxonomyNode {
    let mut node = TaxonomyNode::from_class(class);
    if let Some(children) = children_of.get(class.iri.as_str()) {
        node.children = children
            .iter()
            .map(|child| assemble(child, children_of))
            .collect();
    }
    node
}
