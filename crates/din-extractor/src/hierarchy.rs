//! Parent resolution
//!
//! Turns the declared `rdfs:subClassOf` links into a single parent pointer
//! per class and rejects cyclic hierarchies.
//!
//! A class with several in-taxonomy superclasses keeps the first one in
//! document order; the others are dropped and counted.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use din_core::{Result, TaxonomyError};
use din_parser::OwlDocument;

/// Single-parent view of the class hierarchy
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    /// child IRI -> parent IRI
    parent_of: BTreeMap<String, String>,
    /// Classes that declared more than one superclass, sorted
    multi_parent: Vec<String>,
    /// Distinct declared (child, superclass) pairs
    declared_edges: usize,
}

impl Hierarchy {
    /// Resolve parents and verify the result is acyclic
    pub fn resolve(doc: &OwlDocument) -> Result<Self> {
        let mut hierarchy = Self::default();

        for class in doc.classes() {
            hierarchy.declared_edges += class.superclasses.len();

            let Some(first) = class.superclasses.first() else {
                continue;
            };
            if class.superclasses.len() > 1 {
                tracing::warn!(
                    class = %class.iri,
                    kept = %first,
                    dropped = class.superclasses.len() - 1,
                    "class has several superclasses, keeping the first declared"
                );
                hierarchy.multi_parent.push(class.iri.clone());
            }
            hierarchy
                .parent_of
                .insert(class.iri.clone(), first.clone());
        }

        hierarchy.multi_parent.sort();
        hierarchy.check_acyclic()?;

        tracing::debug!(
            tree_edges = hierarchy.parent_of.len(),
            declared_edges = hierarchy.declared_edges,
            multi_parent = hierarchy.multi_parent.len(),
            "resolved class hierarchy"
        );

        Ok(hierarchy)
    }

    /// Resolved parent of a class
    pub fn parent(&self, iri: &str) -> Option<&str> {
        self.parent_of.get(iri).map(String::as_str)
    }

    /// Classes that lost superclasses during resolution
    pub fn multi_parent(&self) -> &[String] {
        &self.multi_parent
    }

    /// Number of parent pointers (edges of the output tree below the top level)
    pub fn tree_edge_count(&self) -> usize {
        self.parent_of.len()
    }

    /// Number of declared in-taxonomy subclass links
    pub fn declared_edge_count(&self) -> usize {
        self.declared_edges
    }

    fn check_acyclic(&self) -> Result<()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (child, parent) in &self.parent_of {
            graph.add_edge(child.as_str(), parent.as_str(), ());
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => {
                let path = self.cycle_through(cycle.node_id());
                tracing::error!(cycle = %path.join(" -> "), "cyclic subclass hierarchy");
                Err(TaxonomyError::Cycle { path })
            }
        }
    }

    /// Follow parent pointers from `start` until a class repeats and return
    /// that loop, rotated to begin at its smallest IRI and closed with it.
    fn cycle_through(&self, start: &str) -> Vec<String> {
        let mut walked: Vec<&str> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut current = start;

        loop {
            if let Some(&at) = position.get(current) {
                let mut cycle: Vec<String> = walked[at..].iter().map(|s| s.to_string()).collect();
                let smallest = cycle
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.cmp(b.1))
                    .map_or(0, |(i, _)| i);
                cycle.rotate_left(smallest);
                cycle.push(cycle[0].clone());
                return cycle;
            }

            position.insert(current, walked.len());
            walked.push(current);

            match self.parent(current) {
                Some(parent) => current = parent,
                None => return walked.iter().map(|s| s.to_string()).collect(),
            }
        }
    }
}
