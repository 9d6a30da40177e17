//! DIN Parser - OWL source loading and parsing
//!
//! Reads an ontology from a local file or an HTTP(S) URL and extracts the
//! `owl:Class` declarations with their labels, comments and
//! `rdfs:subClassOf` links.
//!
//! The serialization is picked from the source extension; RDF/XML (the
//! usual `.owl` format) is the fallback.
//!
//! Author: hephaex@gmail.com

pub mod owl;
pub mod source;

pub use owl::{OwlDocument, OwlParser};
pub use source::{OwlSource, SourceLoader};

use din_core::{ExtractConfig, Result};

/// Load and parse a source in one step
pub async fn load_document(source: &OwlSource, config: &ExtractConfig) -> Result<OwlDocument> {
    let content = SourceLoader::new(config).load(source).await?;
    OwlParser::for_source(source, config).parse(&content, &source.location())
}
