//! OWL ontology loading and the `OntologyProvider` implementation

use crate::compact::compact_graph;
use crate::context::{ContextTerms, TermDef, TermKind};
use crate::OntologyError;
use kgweave_domain::{OntologyInfo, OntologyProvider};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{Graph, Term, Triple};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";

/// Base IRI used when the ontology declares neither an ontology IRI nor any terms
pub const DEFAULT_BASE_IRI: &str = "http://example.org/ontology#";

/// RDF syntax of an ontology source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OntologyFormat {
    /// RDF/XML (`.owl`, `.rdf`, `.xml`)
    RdfXml,
    /// Turtle (`.ttl`)
    Turtle,
    /// N-Triples (`.nt`)
    NTriples,
}

impl OntologyFormat {
    /// Pick the syntax from a file extension
    pub fn from_path(path: &Path) -> Result<Self, OntologyError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "owl" | "rdf" | "xml" => Ok(Self::RdfXml),
            "ttl" => Ok(Self::Turtle),
            "nt" => Ok(Self::NTriples),
            _ => Err(OntologyError::UnsupportedFormat(format!(
                "{} (expected .owl, .rdf, .xml, .ttl or .nt)",
                path.display()
            ))),
        }
    }

    fn rdf_format(self) -> RdfFormat {
        match self {
            Self::RdfXml => RdfFormat::RdfXml,
            Self::Turtle => RdfFormat::Turtle,
            Self::NTriples => RdfFormat::NTriples,
        }
    }
}

/// An OWL ontology exposed as a closed JSON-LD vocabulary
#[derive(Debug, Clone)]
pub struct OwlOntology {
    info: OntologyInfo,
    terms: ContextTerms,
    context: Value,
    owl_content: String,
}

impl OwlOntology {
    /// Load an ontology file, choosing the syntax from its extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OntologyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OntologyError::NotFound(path.display().to_string()));
        }

        let format = OntologyFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        let ontology = Self::from_source(&content, format)?;

        info!(
            "Loaded ontology {} ({} classes, {} object properties, {} data properties)",
            path.display(),
            ontology.info.classes.len(),
            ontology.info.object_properties.len(),
            ontology.info.data_properties.len()
        );
        Ok(ontology)
    }

    /// Build an ontology from source text in the given syntax
    pub fn from_source(content: &str, format: OntologyFormat) -> Result<Self, OntologyError> {
        let graph = parse_graph(content.as_bytes(), format.rdf_format(), None)
            .map_err(OntologyError::Parse)?;

        let mut defs = Vec::new();
        let mut ontology_iri = None;
        for triple in graph.iter() {
            let triple = triple.into_owned();
            if triple.predicate.as_str() != rdf::TYPE.as_str() {
                continue;
            }
            let (Term::NamedNode(subject), Term::NamedNode(class)) =
                (Term::from(triple.subject), triple.object)
            else {
                continue;
            };

            let kind = match class.as_str() {
                OWL_CLASS => TermKind::Class,
                OWL_OBJECT_PROPERTY => TermKind::ObjectProperty,
                OWL_DATATYPE_PROPERTY => TermKind::DataProperty,
                OWL_ONTOLOGY => {
                    ontology_iri = Some(subject.as_str().to_string());
                    continue;
                }
                _ => continue,
            };

            let iri = subject.as_str().to_string();
            let name = local_name(&iri);
            if name.is_empty() {
                continue;
            }
            defs.push(TermDef {
                name: name.to_string(),
                iri,
                kind,
            });
        }
        defs.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.iri.cmp(&b.iri)));

        let base_iri = match ontology_iri {
            Some(iri) if iri.ends_with('#') || iri.ends_with('/') => iri,
            Some(iri) => format!("{}#", iri),
            None => defs
                .first()
                .map(|def| namespace(&def.iri).to_string())
                .unwrap_or_else(|| DEFAULT_BASE_IRI.to_string()),
        };

        let names = |kind: TermKind| -> Vec<String> {
            defs.iter()
                .filter(|d| d.kind == kind)
                .map(|d| d.name.clone())
                .collect()
        };
        let info = OntologyInfo {
            classes: names(TermKind::Class),
            object_properties: names(TermKind::ObjectProperty),
            data_properties: names(TermKind::DataProperty),
            base_iri: base_iri.clone(),
        };

        let terms = ContextTerms::new(base_iri, &defs);
        let context = terms.to_context();
        debug!("Built JSON-LD context with {} terms", defs.len());

        Ok(Self {
            info,
            terms,
            context,
            owl_content: content.to_string(),
        })
    }

    /// Parse `data` under the authoritative context into an RDF graph
    pub fn to_graph(&self, data: &Value) -> Result<Graph, OntologyError> {
        let document = self.with_context(data)?;
        let bytes = serde_json::to_vec(&document)?;
        let format = RdfFormat::from_extension("jsonld").ok_or_else(|| {
            OntologyError::InvalidJsonLd("JSON-LD parsing is not available".to_string())
        })?;

        parse_graph(&bytes, format, Some(&self.info.base_iri)).map_err(OntologyError::InvalidJsonLd)
    }

    fn with_context(&self, data: &Value) -> Result<Value, OntologyError> {
        let context = self.context["@context"].clone();
        match data {
            Value::Object(map) => {
                // The streaming JSON-LD parser needs @context before any other key
                let mut document = Map::new();
                document.insert("@context".to_string(), context);
                for (key, value) in map.iter().filter(|(k, _)| k.as_str() != "@context") {
                    document.insert(key.clone(), value.clone());
                }
                Ok(Value::Object(document))
            }
            Value::Array(items) => Ok(json!({ "@context": context, "@graph": items })),
            _ => Err(OntologyError::InvalidJsonLd(
                "JSON-LD document must be an object or an array of nodes".to_string(),
            )),
        }
    }
}

impl OntologyProvider for OwlOntology {
    type Error = OntologyError;

    fn info(&self) -> &OntologyInfo {
        &self.info
    }

    fn context(&self) -> &Value {
        &self.context
    }

    fn owl_content(&self) -> &str {
        &self.owl_content
    }

    fn validate_jsonld(&self, data: &Value) -> Result<(), OntologyError> {
        self.terms.check_terms(data, "")?;
        self.to_graph(data)?;
        Ok(())
    }

    fn normalize_jsonld(&self, data: &Value) -> Result<Value, OntologyError> {
        let graph = self.to_graph(data)?;
        let nodes = compact_graph(&graph, &self.terms);
        debug!("Normalized {} statements into {} nodes", graph.len(), nodes.len());

        Ok(json!({
            "@context": self.context["@context"].clone(),
            "@graph": nodes,
        }))
    }
}

fn parse_graph(data: &[u8], format: RdfFormat, base_iri: Option<&str>) -> Result<Graph, String> {
    let mut parser = RdfParser::from_format(format);
    if let Some(base) = base_iri {
        parser = parser.with_base_iri(base).map_err(|e| e.to_string())?;
    }

    let mut graph = Graph::new();
    for quad in parser.for_reader(data) {
        let quad = quad.map_err(|e| e.to_string())?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

/// Fragment or last path segment of an IRI
fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

/// Everything up to and including the last `#` or `/`
fn namespace(iri: &str) -> &str {
    match iri.rfind(['#', '/']) {
        Some(idx) => &iri[..=idx],
        None => iri,
    }
}
