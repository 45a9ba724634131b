//! Decode LLM output into structured payloads

use crate::LlmError;
use kgweave_domain::RawTriple;
use serde_json::Value;
use tracing::{debug, warn};

const TRIPLE_FIELDS: [&str; 3] = ["subject", "predicate", "object"];

/// Triple candidates recovered from one LLM reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripleCandidates {
    /// Items that passed the shape check, tagged with their chunk
    pub triples: Vec<RawTriple>,

    /// Items dropped because they were not well-formed triples
    pub discarded: usize,
}

/// Decode a reply as JSON, tolerating markdown code fences
pub fn decode_json(response: &str) -> Result<Value, LlmError> {
    let json_str = strip_code_fence(response)?;
    if json_str.trim().is_empty() {
        return Err(LlmError::InvalidResponse("Empty response from LLM".to_string()));
    }

    serde_json::from_str(&json_str)
        .map_err(|e| LlmError::InvalidResponse(format!("JSON parsing error: {}", e)))
}

/// Parse a triple-extraction reply for `chunk_number`
pub fn parse_triple_response(
    response: &str,
    chunk_number: usize,
) -> Result<TripleCandidates, LlmError> {
    let value = decode_json(response)?;
    coerce_triples(value, chunk_number)
}

/// Coerce decoded JSON into triple candidates.
///
/// Accepts a list of triples, a single triple object, or an object wrapping
/// exactly one list. Anything else is an error. Individual list items that are
/// not objects with non-empty string `subject`, `predicate` and `object` are
/// discarded and counted.
pub fn coerce_triples(value: Value, chunk_number: usize) -> Result<TripleCandidates, LlmError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            if TRIPLE_FIELDS.iter().all(|field| map.contains_key(*field)) {
                vec![Value::Object(map)]
            } else {
                let mut lists: Vec<Vec<Value>> = map
                    .into_iter()
                    .filter_map(|(_, v)| match v {
                        Value::Array(items) => Some(items),
                        _ => None,
                    })
                    .collect();
                if lists.len() != 1 {
                    return Err(LlmError::InvalidResponse(
                        "JSON object received, but doesn't contain a single list of triples"
                            .to_string(),
                    ));
                }
                lists.remove(0)
            }
        }
        _ => {
            return Err(LlmError::InvalidResponse(
                "Parsed JSON is not a list or expected dictionary wrapper".to_string(),
            ))
        }
    };

    let mut candidates = TripleCandidates::default();
    for (idx, item) in items.iter().enumerate() {
        match triple_from_value(item, chunk_number) {
            Some(triple) => candidates.triples.push(triple),
            None => {
                warn!("Discarding malformed triple {} in chunk {}", idx, chunk_number);
                candidates.discarded += 1;
            }
        }
    }

    debug!(
        "Parsed {} triples from chunk {} ({} discarded)",
        candidates.triples.len(),
        chunk_number,
        candidates.discarded
    );
    Ok(candidates)
}

fn triple_from_value(item: &Value, chunk_number: usize) -> Option<RawTriple> {
    let obj = item.as_object()?;
    let field = |name: &str| {
        obj.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(RawTriple::new(
        field("subject")?,
        field("predicate")?,
        field("object")?,
        chunk_number,
    ))
}

/// Extract JSON from a response, handling markdown code blocks
fn strip_code_fence(response: &str) -> Result<String, LlmError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(LlmError::InvalidResponse("Empty code block".to_string()));
        }

        // Skip the opening fence line and a closing fence if present
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_list() {
        let response = r#"[
            {"subject": "marie curie", "predicate": "discovered", "object": "radium"},
            {"subject": "marie curie", "predicate": "won", "object": "nobel prize in physics"}
        ]"#;

        let parsed = parse_triple_response(response, 3).unwrap();
        assert_eq!(parsed.triples.len(), 2);
        assert_eq!(parsed.discarded, 0);
        assert_eq!(parsed.triples[0].chunk, 3);
        assert_eq!(parsed.triples[1].object, "nobel prize in physics");
    }

    #[test]
    fn test_parse_markdown_wrapper() {
        let response = "```json\n[{\"subject\": \"a\", \"predicate\": \"b\", \"object\": \"c\"}]\n```";
        let parsed = parse_triple_response(response, 1).unwrap();
        assert_eq!(parsed.triples.len(), 1);
    }

    #[test]
    fn test_parse_single_triple_object() {
        let response = r#"{"subject": "a", "predicate": "b", "object": "c"}"#;
        let parsed = parse_triple_response(response, 1).unwrap();
        assert_eq!(parsed.triples, vec![RawTriple::new("a", "b", "c", 1)]);
    }

    #[test]
    fn test_parse_singleton_wrapper() {
        let response = r#"{"triples": [{"subject": "a", "predicate": "b", "object": "c"}], "note": "ok"}"#;
        let parsed = parse_triple_response(response, 2).unwrap();
        assert_eq!(parsed.triples.len(), 1);
    }

    #[test]
    fn test_parse_ambiguous_wrapper_fails() {
        let response = r#"{"a": [], "b": []}"#;
        assert!(parse_triple_response(response, 1).is_err());
    }

    #[test]
    fn test_parse_scalar_fails() {
        assert!(parse_triple_response("42", 1).is_err());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_triple_response("This is not JSON", 1);
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_empty_response_fails() {
        assert!(parse_triple_response("   ", 1).is_err());
    }

    #[test]
    fn test_malformed_items_discarded_and_counted() {
        let response = r#"[
            {"subject": "a", "predicate": "b", "object": "c"},
            {"subject": "a", "predicate": "b"},
            {"subject": "a", "predicate": 5, "object": "c"},
            {"subject": "", "predicate": "b", "object": "c"},
            "not an object"
        ]"#;

        let parsed = parse_triple_response(response, 1).unwrap();
        assert_eq!(parsed.triples.len(), 1);
        assert_eq!(parsed.discarded, 4);
    }

    #[test]
    fn test_strip_code_fence_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert!(strip_code_fence(response).unwrap().contains("key"));
    }

    #[test]
    fn test_decode_json_passes_objects_through() {
        let value = decode_json(r#"{"@graph": []}"#).unwrap();
        assert!(value.get("@graph").is_some());
    }
}
