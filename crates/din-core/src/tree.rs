//! Taxonomy tree model
//!
//! The tree is the only artifact exchanged between the extractor and the
//! renderer. Field order here is the key order of the JSON file.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{LevelKind, OntologyClass};

/// A node of the rendered taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    /// Class IRI (or the synthetic root id)
    pub id: String,

    /// Display label
    pub label: String,

    /// IRI fragment, searchable in the HTML view
    #[serde(default)]
    pub raw_fragment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_type: Option<LevelKind>,

    /// Ordered child nodes
    pub children: Vec<TaxonomyNode>,
}

impl TaxonomyNode {
    /// Create a childless node
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        let raw_fragment = crate::extract_fragment(&id).to_string();
        Self {
            id,
            label: label.into(),
            raw_fragment,
            level_number: None,
            level_type: None,
            children: Vec::new(),
        }
    }

    /// Create a childless node from an ontology class
    pub fn from_class(class: &OntologyClass) -> Self {
        Self {
            id: class.iri.clone(),
            label: class.label.clone(),
            raw_fragment: class.fragment.clone(),
            level_number: class.level.as_ref().map(|l| l.number.clone()),
            level_type: class.level.as_ref().map(|l| l.kind),
            children: Vec::new(),
        }
    }

    /// Add a child
    pub fn with_child(mut self, child: TaxonomyNode) -> Self {
        self.children.push(child);
        self
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal of this node and all descendants
    pub fn iter(&self) -> impl Iterator<Item = &TaxonomyNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Find a node by id
    pub fn find(&self, id: &str) -> Option<&TaxonomyNode> {
        self.iter().find(|n| n.id == id)
    }

    /// Check the structural invariants the JSON shape cannot express:
    /// non-empty ids that are unique across the whole tree.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for node in self.iter() {
            if node.id.trim().is_empty() {
                return Err(format!("node labelled '{}' has an empty id", node.label));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate node id '{}'", node.id));
            }
        }
        Ok(())
    }

    /// Compute summary statistics
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            top_level_count: self.children.len(),
            ..Default::default()
        };

        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            stats.node_count += 1;
            stats.max_depth = stats.max_depth.max(depth);
            if node.is_leaf() {
                stats.leaf_count += 1;
            }
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }

        stats
    }
}

/// Shape of a taxonomy tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// All nodes including the root
    pub node_count: usize,

    /// Nodes without children
    pub leaf_count: usize,

    /// Longest root-to-leaf edge count
    pub max_depth: usize,

    /// Direct children of the root
    pub top_level_count: usize,
}
