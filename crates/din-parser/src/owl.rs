//! OWL class hierarchy parsing
//!
//! Only three things are read from the graph: `owl:Class` typing,
//! `rdfs:subClassOf` links between named classes, and `rdfs:label` /
//! `rdfs:comment` annotations. Everything else (restrictions, properties,
//! individuals) is ignored.

use std::collections::{HashMap, HashSet};

use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{NamedNodeRef, Subject, Term};
use oxrdfio::{RdfFormat, RdfParser};

use din_core::{DinLevel, ExtractConfig, OntologyClass, Result, TaxonomyError};

use crate::source::OwlSource;

const OWL_CLASS: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");

// ============================================================================
// Parsed document
// ============================================================================

/// The classes of one ontology, deduplicated by IRI, in declaration order
#[derive(Debug, Clone, Default)]
pub struct OwlDocument {
    classes: Vec<OntologyClass>,
    index: HashMap<String, usize>,
    /// Number of triples read
    pub triple_count: usize,
    /// Superclass links dropped because the target is not a declared class
    pub external_links: usize,
}

impl OwlDocument {
    /// Build a document from already-resolved classes. Later duplicates of
    /// an IRI are ignored.
    pub fn from_classes(classes: impl IntoIterator<Item = OntologyClass>) -> Self {
        let mut doc = Self::default();
        for class in classes {
            if !doc.index.contains_key(&class.iri) {
                doc.index.insert(class.iri.clone(), doc.classes.len());
                doc.classes.push(class);
            }
        }
        doc
    }

    /// All classes in declaration order
    pub fn classes(&self) -> &[OntologyClass] {
        &self.classes
    }

    /// Look up a class by IRI
    pub fn get(&self, iri: &str) -> Option<&OntologyClass> {
        self.index.get(iri).map(|&i| &self.classes[i])
    }

    /// Check whether an IRI is a declared class
    pub fn contains(&self, iri: &str) -> bool {
        self.index.contains_key(iri)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Annotations gathered for one subject while streaming triples
#[derive(Debug, Default)]
struct RawClass {
    superclasses: Vec<String>,
    labels: Vec<(String, Option<String>)>,
    comments: Vec<String>,
}

// ============================================================================
// Parser
// ============================================================================

/// Parser for OWL ontologies in any RDF serialization
#[derive(Debug, Clone)]
pub struct OwlParser {
    format: RdfFormat,
    base_iri: Option<String>,
    label_language: String,
}

impl OwlParser {
    /// Create a parser for a serialization, preferring German labels
    pub fn new(format: RdfFormat) -> Self {
        Self {
            format,
            base_iri: None,
            label_language: "de".to_string(),
        }
    }

    /// Create a parser matching a source and the extraction settings
    pub fn for_source(source: &OwlSource, config: &ExtractConfig) -> Self {
        let parser = Self::new(source.format()).with_label_language(&config.label_language);
        match source.base_iri() {
            Some(base) => parser.with_base_iri(base),
            None => parser,
        }
    }

    /// Set the base IRI for relative references
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Set the preferred label language (empty disables the preference)
    pub fn with_label_language(mut self, language: impl Into<String>) -> Self {
        self.label_language = language.into();
        self
    }

    /// Parse a complete document
    pub fn parse(&self, content: &[u8], location: &str) -> Result<OwlDocument> {
        let mut parser = RdfParser::from_format(self.format);
        if let Some(base) = &self.base_iri {
            parser = parser.with_base_iri(base).map_err(|e| {
                TaxonomyError::parse(location, format!("invalid base IRI {base}: {e}"))
            })?;
        }

        let mut declared: Vec<String> = Vec::new();
        let mut declared_set: HashSet<String> = HashSet::new();
        let mut raw: HashMap<String, RawClass> = HashMap::new();
        let mut triple_count = 0usize;

        for quad in parser.for_reader(content) {
            let quad = quad.map_err(|e| TaxonomyError::parse(location, e))?;
            triple_count += 1;

            let Subject::NamedNode(subject) = &quad.subject else {
                continue;
            };
            let subject = subject.as_str();
            let predicate = quad.predicate.as_ref();

            if predicate == rdf::TYPE {
                if let Term::NamedNode(object) = &quad.object {
                    if object.as_ref() == OWL_CLASS && declared_set.insert(subject.to_string()) {
                        declared.push(subject.to_string());
                    }
                }
            } else if predicate == rdfs::SUB_CLASS_OF {
                // blank-node objects are restrictions or anonymous class expressions
                if let Term::NamedNode(object) = &quad.object {
                    let entry = raw.entry(subject.to_string()).or_default();
                    entry.superclasses.push(object.as_str().to_string());
                }
            } else if predicate == rdfs::LABEL {
                if let Term::Literal(literal) = &quad.object {
                    let entry = raw.entry(subject.to_string()).or_default();
                    entry.labels.push((
                        literal.value().to_string(),
                        literal.language().map(str::to_string),
                    ));
                }
            } else if predicate == rdfs::COMMENT {
                if let Term::Literal(literal) = &quad.object {
                    let entry = raw.entry(subject.to_string()).or_default();
                    entry.comments.push(literal.value().to_string());
                }
            }
        }

        tracing::debug!(location, triple_count, classes = declared.len(), "parsed ontology triples");

        if declared.is_empty() {
            return Err(TaxonomyError::parse(
                location,
                "no owl:Class declarations found",
            ));
        }

        let mut external_links = 0usize;
        let mut classes = Vec::with_capacity(declared.len());

        for iri in declared {
            let annotations = raw.remove(&iri).unwrap_or_default();
            let mut class = OntologyClass::new(iri);

            if let Some(label) = preferred_label(&annotations.labels, &self.label_language) {
                class.label = label;
            }
            if class.label.is_empty() {
                return Err(TaxonomyError::parse(
                    location,
                    format!("class {} has an empty label", class.iri),
                ));
            }

            class.comment = annotations
                .comments
                .first()
                .map(|c| c.trim().to_string());
            class.level = annotations
                .comments
                .iter()
                .find_map(|c| DinLevel::from_comment(c));

            let mut seen = HashSet::new();
            for superclass in annotations.superclasses {
                if !declared_set.contains(&superclass) {
                    tracing::debug!(class = %class.iri, %superclass, "ignoring superclass outside the taxonomy");
                    external_links += 1;
                    continue;
                }
                if seen.insert(superclass.clone()) {
                    class.superclasses.push(superclass);
                }
            }

            classes.push(class);
        }

        let mut doc = OwlDocument::from_classes(classes);
        doc.triple_count = triple_count;
        doc.external_links = external_links;

        tracing::info!(
            location,
            classes = doc.len(),
            external_links,
            "extracted class declarations"
        );

        Ok(doc)
    }
}

/// Pick the display label: first non-empty label in the preferred
/// language, else the first non-empty label, else `None` (the caller keeps
/// the humanized fragment).
fn preferred_label(labels: &[(String, Option<String>)], language: &str) -> Option<String> {
    let candidates: Vec<(&str, Option<&str>)> = labels
        .iter()
        .map(|(text, lang)| (text.trim(), lang.as_deref()))
        .filter(|(text, _)| !text.is_empty())
        .collect();

    if !language.is_empty() {
        let localized = candidates
            .iter()
            .find(|(_, lang)| lang.is_some_and(|l| l.eq_ignore_ascii_case(language)));
        if let Some((text, _)) = localized {
            return Some(text.to_string());
        }
    }

    candidates.first().map(|(text, _)| text.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://www.hsu-ifa.de/ontologies/DIN8580#";

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns="http://www.hsu-ifa.de/ontologies/DIN8580#"
     xml:base="http://www.hsu-ifa.de/ontologies/DIN8580"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
    <owl:Ontology rdf:about="http://www.hsu-ifa.de/ontologies/DIN8580"/>
    <owl:Class rdf:about="http://www.hsu-ifa.de/ontologies/DIN8580#Fertigungsverfahren">
        <rdfs:label xml:lang="en">Manufacturing process</rdfs:label>
        <rdfs:label xml:lang="de">Fertigungsverfahren</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://www.hsu-ifa.de/ontologies/DIN8580#Trennen">
        <rdfs:subClassOf rdf:resource="http://www.hsu-ifa.de/ontologies/DIN8580#Fertigungsverfahren"/>
        <rdfs:comment>DIN 8580 Hauptgruppe 3</rdfs:comment>
    </owl:Class>
    <owl:Class rdf:about="http://www.hsu-ifa.de/ontologies/DIN8580#Spanen_mit_geometrisch_bestimmter_Schneide">
        <rdfs:subClassOf rdf:resource="http://www.hsu-ifa.de/ontologies/DIN8580#Trennen"/>
        <rdfs:subClassOf>
            <owl:Restriction>
                <owl:onProperty rdf:resource="http://www.hsu-ifa.de/ontologies/DIN8580#hasTool"/>
                <owl:someValuesFrom rdf:resource="http://www.hsu-ifa.de/ontologies/DIN8580#Schneide"/>
            </owl:Restriction>
        </rdfs:subClassOf>
        <rdfs:comment>Gruppe 3.2</rdfs:comment>
    </owl:Class>
    <owl:Class rdf:about="http://www.hsu-ifa.de/ontologies/DIN8580#Fuegen">
        <rdfs:subClassOf rdf:resource="http://www.hsu-ifa.de/ontologies/DIN8580#Fertigungsverfahren"/>
        <rdfs:subClassOf rdf:resource="http://www.w3.org/2002/07/owl#Thing"/>
        <rdfs:label>  Fügen </rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://www.hsu-ifa.de/ontologies/DIN8580#Fuegen">
        <rdfs:subClassOf rdf:resource="http://www.hsu-ifa.de/ontologies/DIN8580#Fertigungsverfahren"/>
    </owl:Class>
</rdf:RDF>
"#;

    fn parse(content: &str) -> Result<OwlDocument> {
        OwlParser::new(RdfFormat::RdfXml).parse(content.as_bytes(), "sample.owl")
    }

    #[test]
    fn test_relative_iris_resolve_against_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.owl");
        std::fs::write(
            &path,
            r##"<?xml version="1.0"?>
<rdf:RDF xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
    <owl:Class rdf:about="#Fertigungsverfahren"/>
    <owl:Class rdf:about="#Trennen">
        <rdfs:subClassOf rdf:resource="#Fertigungsverfahren"/>
        <rdfs:label xml:lang="de">Trennen</rdfs:label>
    </owl:Class>
</rdf:RDF>
"##,
        )
        .unwrap();

        let source = OwlSource::File(path.clone());
        let content = std::fs::read(&path).unwrap();
        let doc = OwlParser::for_source(&source, &ExtractConfig::default())
            .parse(&content, "local.owl")
            .unwrap();

        assert_eq!(doc.len(), 2);
        let trennen = &doc.classes()[1];
        assert!(trennen.iri.starts_with("file:///"));
        assert!(trennen.iri.ends_with("local.owl#Trennen"));
        assert_eq!(trennen.fragment, "Trennen");
        assert_eq!(trennen.label, "Trennen");
        assert_eq!(trennen.superclasses, vec![doc.classes()[0].iri.clone()]);
    }

    #[test]
    fn test_parse_classes_in_declaration_order() {
        let doc = parse(SAMPLE).unwrap();
        let fragments: Vec<_> = doc.classes().iter().map(|c| c.fragment.as_str()).collect();
        assert_eq!(
            fragments,
            vec![
                "Fertigungsverfahren",
                "Trennen",
                "Spanen_mit_geometrisch_bestimmter_Schneide",
                "Fuegen"
            ]
        );
    }

    #[test]
    fn test_label_preference() {
        let doc = parse(SAMPLE).unwrap();
        let label = |fragment: &str| doc.get(&format!("{NS}{fragment}")).unwrap().label.clone();

        // preferred language wins over document order
        assert_eq!(label("Fertigungsverfahren"), "Fertigungsverfahren");
        // untagged label, trimmed
        assert_eq!(label("Fuegen"), "Fügen");
        // no label: humanized fragment
        assert_eq!(
            label("Spanen_mit_geometrisch_bestimmter_Schneide"),
            "Spanen mit geometrisch bestimmter Schneide"
        );
    }

    #[test]
    fn test_label_language_is_configurable() {
        let doc = OwlParser::new(RdfFormat::RdfXml)
            .with_label_language("en")
            .parse(SAMPLE.as_bytes(), "sample.owl")
            .unwrap();
        let class = doc.get(&format!("{NS}Fertigungsverfahren")).unwrap();
        assert_eq!(class.label, "Manufacturing process");
    }

    #[test]
    fn test_superclasses_filtered_and_deduplicated() {
        let doc = parse(SAMPLE).unwrap();

        let spanen = doc
            .get(&format!("{NS}Spanen_mit_geometrisch_bestimmter_Schneide"))
            .unwrap();
        assert_eq!(spanen.superclasses, vec![format!("{NS}Trennen")]);

        // owl:Thing dropped, repeated declaration merged
        let fuegen = doc.get(&format!("{NS}Fuegen")).unwrap();
        assert_eq!(fuegen.superclasses, vec![format!("{NS}Fertigungsverfahren")]);
        assert_eq!(doc.external_links, 1);
    }

    #[test]
    fn test_level_from_comment() {
        let doc = parse(SAMPLE).unwrap();
        let trennen = doc.get(&format!("{NS}Trennen")).unwrap();
        let level = trennen.level.as_ref().unwrap();
        assert_eq!(level.number, "3");
        assert_eq!(level.kind, din_core::LevelKind::Hauptgruppe);
        assert_eq!(trennen.comment.as_deref(), Some("DIN 8580 Hauptgruppe 3"));
    }

    #[test]
    fn test_turtle_source() {
        let ttl = r#"
            @prefix owl: <http://www.w3.org/2002/07/owl#> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            @prefix din: <http://example.org/din#> .

            din:Umformen rdfs:subClassOf din:Fertigungsverfahren ; a owl:Class .
            din:Fertigungsverfahren a owl:Class .
        "#;
        let doc = OwlParser::new(RdfFormat::Turtle)
            .parse(ttl.as_bytes(), "sample.ttl")
            .unwrap();

        assert_eq!(doc.len(), 2);
        let umformen = doc.get("http://example.org/din#Umformen").unwrap();
        assert_eq!(
            umformen.superclasses,
            vec!["http://example.org/din#Fertigungsverfahren".to_string()]
        );
    }

    #[test]
    fn test_malformed_markup() {
        let err = parse("<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"><oops").unwrap_err();
        assert!(matches!(err, TaxonomyError::Parse { .. }));
    }

    #[test]
    fn test_no_classes() {
        let err = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:owl="http://www.w3.org/2002/07/owl#">
                 <owl:Ontology rdf:about="http://example.org/empty"/>
               </rdf:RDF>"#,
        )
        .unwrap_err();

        match err {
            TaxonomyError::Parse { location, reason } => {
                assert_eq!(location, "sample.owl");
                assert!(reason.contains("no owl:Class"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_label_rejected() {
        let err = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:owl="http://www.w3.org/2002/07/owl#">
                 <owl:Class rdf:about="http://example.org/din#__"/>
               </rdf:RDF>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty label"));
    }
}
