//! DIN Core - Domain models, errors and shared helpers
//!
//! This crate defines the core abstractions used throughout the pipeline:
//! - Ontology class model (IRI, fragment, label, DIN level)
//! - The output taxonomy tree
//! - Common error types
//! - Configuration management
//! - Atomic artifact output

pub mod config;
pub mod output;
pub mod tree;

pub use config::{AppConfig, ConfigError, ExtractConfig, LoggingConfig, RenderConfig};
pub use output::write_atomic;
pub use tree::{TaxonomyNode, TreeStats};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Failure kinds of an extraction or render run. All of them are fatal.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Source unavailable: {location}: {reason}")]
    SourceUnavailable { location: String, reason: String },

    #[error("Failed to parse {location}: {reason}")]
    Parse { location: String, reason: String },

    #[error("Cycle in subclass hierarchy: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Malformed taxonomy tree in {location}: {reason}")]
    MalformedTree { location: String, reason: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaxonomyError {
    pub fn source_unavailable(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed_tree(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedTree {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaxonomyError>;

// ============================================================================
// Ontology Models
// ============================================================================

/// DIN 8580 hierarchy level kinds as they appear in class comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    Hauptgruppe,
    Gruppe,
    Untergruppe,
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hauptgruppe => write!(f, "Hauptgruppe"),
            Self::Gruppe => write!(f, "Gruppe"),
            Self::Untergruppe => write!(f, "Untergruppe"),
        }
    }
}

static LEVEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Hauptgruppe|Gruppe|Untergruppe)\s*([0-9]+(?:\.[0-9]+)*)\b")
        .expect("level pattern is a valid regex")
});

/// Position of a class in the DIN numbering, e.g. `Untergruppe 3.2.1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinLevel {
    /// Dotted number such as `3.2.1`
    pub number: String,

    /// Level kind
    pub kind: LevelKind,
}

impl DinLevel {
    /// Detect a DIN level mention anywhere in a comment
    pub fn from_comment(comment: &str) -> Option<Self> {
        let normalized = comment.split_whitespace().collect::<Vec<_>>().join(" ");
        let captures = LEVEL_PATTERN.captures(&normalized)?;

        let kind = match captures[1].to_lowercase().as_str() {
            "hauptgruppe" => LevelKind::Hauptgruppe,
            "untergruppe" => LevelKind::Untergruppe,
            _ => LevelKind::Gruppe,
        };

        Some(Self {
            number: captures[2].to_string(),
            kind,
        })
    }

    /// Numeric sort key; `3.10` sorts after `3.9`
    pub fn sort_key(&self) -> Vec<u32> {
        level_sort_key(Some(&self.number))
    }
}

/// Numeric tuple for an optional dotted level number. Missing or
/// unparseable numbers sort after every real one.
pub fn level_sort_key(number: Option<&str>) -> Vec<u32> {
    number
        .and_then(|n| {
            n.split('.')
                .map(|part| part.parse::<u32>().ok())
                .collect::<Option<Vec<_>>>()
        })
        .unwrap_or_else(|| vec![u32::MAX])
}

/// An `owl:Class` declaration as read from the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyClass {
    /// Absolute IRI
    pub iri: String,

    /// Local name after the last `#` or `/`
    pub fragment: String,

    /// Display label
    pub label: String,

    /// First `rdfs:comment`
    pub comment: Option<String>,

    /// DIN level detected in the comments
    pub level: Option<DinLevel>,

    /// In-taxonomy superclasses in document order
    pub superclasses: Vec<String>,
}

impl OntologyClass {
    /// Create a class labelled with its humanized fragment
    pub fn new(iri: impl Into<String>) -> Self {
        let iri = iri.into();
        let fragment = extract_fragment(&iri).to_string();
        let label = humanize_fragment(&fragment);
        Self {
            iri,
            fragment,
            label,
            comment: None,
            level: None,
            superclasses: Vec::new(),
        }
    }

    /// Set label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add a superclass
    pub fn with_superclass(mut self, iri: impl Into<String>) -> Self {
        self.superclasses.push(iri.into());
        self
    }

    /// Set the comment and detect the DIN level from it
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.level = DinLevel::from_comment(&comment);
        self.comment = Some(comment);
        self
    }
}

/// Local name of an IRI: after the last `#`, else after the last `/`
pub fn extract_fragment(iri: &str) -> &str {
    match iri.rsplit_once('#') {
        Some((_, fragment)) => fragment,
        None => {
            let trimmed = iri.trim_end_matches('/');
            trimmed.rsplit_once('/').map_or(trimmed, |(_, last)| last)
        }
    }
}

/// Turn an identifier into a display label: underscores become spaces
pub fn humanize_fragment(fragment: &str) -> String {
    fragment.replace('_', " ").trim().to_string()
}

// ============================================================================
// Tests
// ============================================================================
