//! RDF graph to compacted JSON-LD

use crate::context::ContextTerms;
use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{Graph, Literal, Term};
use serde_json::{json, Map, Number, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum NodeKey {
    Named(String),
    Blank(String),
}

type Statements = Vec<(String, Term)>;

/// Compact `graph` into a list of top-level node objects.
///
/// Nodes are grouped by subject and ordered by IRI. Blank nodes referenced
/// exactly once are embedded where they are used; other blank nodes become
/// top-level nodes with stable `_:bN` labels.
pub(crate) fn compact_graph(graph: &Graph, terms: &ContextTerms) -> Vec<Value> {
    let mut nodes: BTreeMap<NodeKey, Statements> = BTreeMap::new();
    let mut blank_refs: HashMap<String, usize> = HashMap::new();

    for triple in graph.iter() {
        let triple = triple.into_owned();
        let subject = match Term::from(triple.subject) {
            Term::NamedNode(node) => NodeKey::Named(node.as_str().to_string()),
            Term::BlankNode(node) => NodeKey::Blank(node.as_str().to_string()),
            _ => continue,
        };
        if let Term::BlankNode(node) = &triple.object {
            *blank_refs.entry(node.as_str().to_string()).or_default() += 1;
        }
        nodes
            .entry(subject)
            .or_default()
            .push((triple.predicate.as_str().to_string(), triple.object));
    }

    let mut compactor = Compactor {
        terms,
        nodes: &nodes,
        blank_refs,
        done: HashSet::new(),
        labels: HashMap::new(),
    };
    compactor.run()
}

struct Compactor<'a> {
    terms: &'a ContextTerms,
    nodes: &'a BTreeMap<NodeKey, Statements>,
    blank_refs: HashMap<String, usize>,
    done: HashSet<NodeKey>,
    labels: HashMap<String, String>,
}

impl<'a> Compactor<'a> {
    fn run(&mut self) -> Vec<Value> {
        let nodes = self.nodes;
        let mut out = Vec::new();

        for key in nodes.keys().filter(|k| matches!(k, NodeKey::Named(_))) {
            out.push(self.node_object(key, true));
        }

        let mut pending: Vec<(String, &NodeKey)> = nodes
            .iter()
            .filter(|(k, _)| matches!(k, NodeKey::Blank(_)))
            .map(|(k, statements)| (signature(statements), k))
            .collect();
        pending.sort();

        // Shared blank nodes first, then whatever a reference cycle left behind
        for (_, key) in &pending {
            if !self.done.contains(*key) && self.refs(key) != 1 {
                out.push(self.node_object(key, true));
            }
        }
        for (_, key) in &pending {
            if !self.done.contains(*key) {
                out.push(self.node_object(key, true));
            }
        }

        out
    }

    fn refs(&self, key: &NodeKey) -> usize {
        match key {
            NodeKey::Blank(id) => self.blank_refs.get(id).copied().unwrap_or(0),
            NodeKey::Named(_) => 0,
        }
    }

    fn label(&mut self, id: &str) -> String {
        let next = self.labels.len();
        self.labels
            .entry(id.to_string())
            .or_insert_with(|| format!("_:b{}", next))
            .clone()
    }

    fn node_object(&mut self, key: &NodeKey, top_level: bool) -> Value {
        self.done.insert(key.clone());

        let mut obj = Map::new();
        match key {
            NodeKey::Named(iri) => {
                obj.insert("@id".to_string(), Value::String(iri.clone()));
            }
            NodeKey::Blank(id) => {
                if top_level && self.refs(key) > 0 {
                    obj.insert("@id".to_string(), Value::String(self.label(id)));
                }
            }
        }

        let nodes = self.nodes;
        let Some(statements) = nodes.get(key) else {
            return Value::Object(obj);
        };

        let mut types: Vec<String> = Vec::new();
        let mut props: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for (predicate, object) in statements {
            if predicate == rdf::TYPE.as_str() {
                if let Term::NamedNode(class) = object {
                    types.push(self.terms.compact_iri(class.as_str()));
                    continue;
                }
            }
            let value = self.object_value(predicate, object);
            props
                .entry(self.terms.compact_iri(predicate))
                .or_default()
                .push(value);
        }

        types.sort();
        types.dedup();
        if !types.is_empty() {
            obj.insert(
                "@type".to_string(),
                one_or_many(types.into_iter().map(Value::String).collect()),
            );
        }
        for (key, mut values) in props {
            values.sort_by_key(|v| v.to_string());
            obj.insert(key, one_or_many(values));
        }

        Value::Object(obj)
    }

    fn object_value(&mut self, predicate: &str, object: &Term) -> Value {
        let id_valued = self.terms.is_id_valued(predicate);
        let reference = |id: String| {
            if id_valued {
                Value::String(id)
            } else {
                json!({ "@id": id })
            }
        };

        match object {
            Term::NamedNode(node) => reference(node.as_str().to_string()),
            Term::BlankNode(node) => {
                let key = NodeKey::Blank(node.as_str().to_string());
                if self.refs(&key) == 1 && self.nodes.contains_key(&key) && !self.done.contains(&key) {
                    self.node_object(&key, false)
                } else {
                    let label = self.label(node.as_str());
                    reference(label)
                }
            }
            Term::Literal(literal) => literal_value(literal),
            #[allow(unreachable_patterns)]
            other => Value::String(other.to_string()),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    let value = literal.value();
    if let Some(language) = literal.language() {
        return json!({ "@value": value, "@language": language });
    }

    let datatype = literal.datatype();
    let datatype = datatype.as_str();
    if datatype == xsd::STRING.as_str() {
        return Value::String(value.to_string());
    }
    if datatype == xsd::INTEGER.as_str() {
        if let Ok(n) = value.parse::<i64>() {
            return Value::from(n);
        }
    }
    if datatype == xsd::BOOLEAN.as_str() {
        match value {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    if datatype == xsd::DOUBLE.as_str() {
        if let Some(n) = value.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    json!({ "@value": value, "@type": datatype })
}

fn one_or_many(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

/// Ordering key for blank nodes that ignores their generated labels
fn signature(statements: &Statements) -> String {
    let mut parts: Vec<String> = statements
        .iter()
        .map(|(predicate, object)| match object {
            Term::BlankNode(_) => format!("{} _", predicate),
            other => format!("{} {}", predicate, other),
        })
        .collect();
    parts.sort();
    parts.join("\n")
}
